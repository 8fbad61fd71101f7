//! Shared finite-difference helpers: log-spot grids, Dirichlet boundaries,
//! grid interpolation and the Thomas tridiagonal solver.

use crate::core::{OptionType, PricingError};

/// Minimum spatial node count (one interior node plus two boundaries).
pub(super) const MIN_SPACE_NODES: usize = 3;

/// Uniform grid in `x = ln S` mapped back to spot.
///
/// The node count is odd and `spot` sits exactly on the centre node. The grid
/// spans `max(4 sigma sqrt(T), 1.25 |ln(K/S)|)` either side of `ln S`.
#[derive(Debug, Clone)]
pub(super) struct LogSpotGrid {
    pub spots: Vec<f64>,
    pub dx: f64,
    pub centre: usize,
}

impl LogSpotGrid {
    pub fn new(
        nodes: usize,
        spot: f64,
        strike: f64,
        vol: f64,
        expiry: f64,
    ) -> Result<Self, PricingError> {
        let nodes = if nodes % 2 == 0 { nodes + 1 } else { nodes };
        if nodes < MIN_SPACE_NODES {
            return Err(PricingError::invalid_input(format!(
                "log-spot grid needs at least {MIN_SPACE_NODES} nodes"
            )));
        }

        let mut half_width = 4.0 * vol * expiry.sqrt();
        let strike_distance = 1.25 * (strike / spot).ln().abs();
        if strike_distance > half_width {
            half_width = strike_distance;
        }

        let x0 = spot.ln();
        let dx = 2.0 * half_width / (nodes - 1) as f64;
        let centre = nodes / 2;
        let spots: Vec<f64> = (0..nodes)
            .map(|i| (x0 + (i as f64 - centre as f64) * dx).exp())
            .collect();

        if !dx.is_finite()
            || dx <= 0.0
            || spots
                .windows(2)
                .any(|w| !w[0].is_finite() || !w[1].is_finite() || w[1] <= w[0])
        {
            return Err(PricingError::numerical(
                "failed to build a strictly increasing log-spot grid",
            ));
        }

        Ok(Self { spots, dx, centre })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    #[inline]
    pub fn s_min(&self) -> f64 {
        self.spots[0]
    }

    #[inline]
    pub fn s_max(&self) -> f64 {
        self.spots[self.spots.len() - 1]
    }
}

/// Inputs of the far-field Dirichlet conditions at time-to-maturity `tau`.
#[derive(Debug, Clone, Copy)]
pub(super) struct BoundaryInputs {
    pub option_type: OptionType,
    pub is_american: bool,
    pub strike: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub tau: f64,
    /// Value of the cash dividends still to go ex.
    pub pv_dividends: f64,
}

/// Lower and upper boundary values on `[s_min, s_max]`.
pub(super) fn boundary_values(inputs: BoundaryInputs, s_min: f64, s_max: f64) -> (f64, f64) {
    let BoundaryInputs {
        option_type,
        is_american,
        strike,
        rate,
        dividend_yield,
        tau,
        pv_dividends,
    } = inputs;
    let df_r = (-rate * tau).exp();
    let df_q = (-dividend_yield * tau).exp();
    match option_type {
        OptionType::Call => {
            let mut upper = (s_max * df_q - pv_dividends - strike * df_r).max(0.0);
            if is_american {
                upper = upper.max(s_max - strike);
            }
            (0.0, upper)
        }
        OptionType::Put => {
            let mut lower = (strike * df_r - (s_min * df_q - pv_dividends)).max(0.0);
            if is_american {
                lower = lower.max(strike - s_min);
            }
            (lower, 0.0)
        }
    }
}

/// Linear interpolation of `values` at `spot`, flat beyond the grid ends.
pub(super) fn interpolate_on_grid(spot: f64, grid: &[f64], values: &[f64]) -> f64 {
    debug_assert_eq!(grid.len(), values.len());

    if spot <= grid[0] {
        return values[0];
    }
    let n = grid.len() - 1;
    if spot >= grid[n] {
        return values[n];
    }

    let hi = grid.partition_point(|&x| x < spot).clamp(1, n);
    let lo = hi - 1;
    let w = (spot - grid[lo]) / (grid[hi] - grid[lo]);
    (1.0 - w) * values[lo] + w * values[hi]
}

/// Thomas algorithm. `lower[0]` and `upper[n - 1]` are ignored.
pub(super) fn solve_tridiagonal_inplace(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
    c_star: &mut [f64],
    d_star: &mut [f64],
    out: &mut [f64],
) -> Result<(), PricingError> {
    let n = diag.len();
    if n == 0 {
        return Ok(());
    }
    if lower.len() != n
        || upper.len() != n
        || rhs.len() != n
        || c_star.len() != n
        || d_star.len() != n
        || out.len() != n
    {
        return Err(PricingError::invalid_input(
            "tridiagonal input lengths must match",
        ));
    }

    if diag[0].abs() <= 1.0e-14 {
        return Err(PricingError::numerical("tridiagonal solver singular matrix"));
    }

    c_star[0] = if n > 1 { upper[0] / diag[0] } else { 0.0 };
    d_star[0] = rhs[0] / diag[0];

    for i in 1..n {
        let denom = diag[i] - lower[i] * c_star[i - 1];
        if denom.abs() <= 1.0e-14 {
            return Err(PricingError::numerical("tridiagonal solver singular matrix"));
        }
        c_star[i] = if i < n - 1 { upper[i] / denom } else { 0.0 };
        d_star[i] = (rhs[i] - lower[i] * d_star[i - 1]) / denom;
    }

    out[n - 1] = d_star[n - 1];
    for i in (0..n - 1).rev() {
        out[i] = d_star[i] - c_star[i] * out[i + 1];
    }
    Ok(())
}
