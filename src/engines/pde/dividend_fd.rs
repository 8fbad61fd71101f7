//! Module `engines::pde::dividend_fd`.
//!
//! Crank-Nicolson solver on a uniform `ln S` grid with deterministic cash
//! dividend jumps, for European and American vanilla options.
//!
//! The time axis is split at ex-dividend times. Within a segment the PDE is
//! rolled back with constant coefficients; crossing an ex-date backwards imposes
//! continuity of the option value along the spot jump,
//! `V(S, t_d-) = V(S - D, t_d+)`. American values are floored at intrinsic after
//! every time step and after every jump.
//!
//! Greeks are central differences at the centre node, which sits on today's spot.

use tracing::debug;

use crate::core::{ExerciseStyle, OptionType, PriceResult, PricingEngine, PricingError, PricingMethod};
use crate::instruments::OptionSpec;
use crate::market::{Dividends, MarketModel};

use super::fd_common::{
    BoundaryInputs, LogSpotGrid, boundary_values, interpolate_on_grid, solve_tridiagonal_inplace,
};

/// Minimum time steps; the grid uses `steps - 1` spatial nodes.
pub const MIN_FD_STEPS: usize = 4;

/// Finite-difference engine supporting discrete cash dividends.
#[derive(Debug, Clone, Copy)]
pub struct DividendFdEngine {
    /// Total number of time steps, also driving the spatial resolution.
    pub steps: usize,
}

impl Default for DividendFdEngine {
    fn default() -> Self {
        Self { steps: 200 }
    }
}

impl DividendFdEngine {
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }
}

/// Ex-dividend time with the amounts of every dividend going ex at that time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Jump {
    time: f64,
    amount: f64,
}

fn collect_jumps(dividends: &Dividends, expiry: f64) -> Result<Vec<Jump>, PricingError> {
    let mut events = dividends.cash_events().to_vec();
    events.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut jumps: Vec<Jump> = Vec::with_capacity(events.len());
    for event in events {
        if !(event.time > 0.0 && event.time <= expiry) {
            return Err(PricingError::invalid_dividends(format!(
                "ex-dividend time {} lies outside (0, {expiry}]",
                event.time
            )));
        }
        if !event.amount.is_finite() || event.amount < 0.0 {
            return Err(PricingError::invalid_dividends(format!(
                "cash dividend amount {} must be finite and >= 0",
                event.amount
            )));
        }
        match jumps.last_mut() {
            Some(last) if last.time == event.time => last.amount += event.amount,
            _ => jumps.push(Jump {
                time: event.time,
                amount: event.amount,
            }),
        }
    }
    Ok(jumps)
}

/// Per-call solver state; all buffers are sized once from the grid.
struct Solver<'a> {
    grid: &'a LogSpotGrid,
    market: &'a MarketModel,
    option_type: OptionType,
    strike: f64,
    is_american: bool,
    values: Vec<f64>,
    scratch: Vec<f64>,
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    rhs: Vec<f64>,
    c_star: Vec<f64>,
    d_star: Vec<f64>,
    interior: Vec<f64>,
}

impl<'a> Solver<'a> {
    fn new(
        grid: &'a LogSpotGrid,
        market: &'a MarketModel,
        option: &OptionSpec,
        is_american: bool,
    ) -> Self {
        let n = grid.len();
        let m = n - 2;
        let values = grid
            .spots
            .iter()
            .map(|&s| option.option_type.intrinsic(s, option.strike))
            .collect();
        Self {
            grid,
            market,
            option_type: option.option_type,
            strike: option.strike,
            is_american,
            values,
            scratch: vec![0.0; n],
            lower: vec![0.0; m],
            diag: vec![0.0; m],
            upper: vec![0.0; m],
            rhs: vec![0.0; m],
            c_star: vec![0.0; m],
            d_star: vec![0.0; m],
            interior: vec![0.0; m],
        }
    }

    fn apply_exercise_floor(&mut self) {
        if !self.is_american {
            return;
        }
        for (v, &s) in self.values.iter_mut().zip(&self.grid.spots) {
            *v = v.max(self.option_type.intrinsic(s, self.strike));
        }
    }

    /// Rolls the solution back from `t_hi` to `t_lo` in `n_steps` CN steps.
    fn roll_back(&mut self, t_hi: f64, t_lo: f64, n_steps: usize) -> Result<(), PricingError> {
        let rate = self.market.rate();
        let q = self.market.dividend_yield();
        let vol = self.market.vol();
        let expiry = self.market.expiry();
        let dx = self.grid.dx;

        let mu = rate - q - 0.5 * vol * vol;
        let a2 = 0.5 * vol * vol;
        let alpha = a2 / (dx * dx) - mu / (2.0 * dx);
        let beta = -2.0 * a2 / (dx * dx) - rate;
        let gamma = a2 / (dx * dx) + mu / (2.0 * dx);

        let dt = (t_hi - t_lo) / n_steps as f64;
        let (half_a, half_b, half_g) = (0.5 * dt * alpha, 0.5 * dt * beta, 0.5 * dt * gamma);

        let m = self.diag.len();
        self.lower.fill(-half_a);
        self.diag.fill(1.0 - half_b);
        self.upper.fill(-half_g);
        self.lower[0] = 0.0;
        self.upper[m - 1] = 0.0;

        let (s_min, s_max) = (self.grid.s_min(), self.grid.s_max());
        let n = self.values.len();

        for k in 0..n_steps {
            let t_new = t_hi - (k + 1) as f64 * dt;
            let (lo, up) = boundary_values(
                BoundaryInputs {
                    option_type: self.option_type,
                    is_american: self.is_american,
                    strike: self.strike,
                    rate,
                    dividend_yield: q,
                    tau: expiry - t_new,
                    pv_dividends: self.market.dividends().pv_after(t_new, rate),
                },
                s_min,
                s_max,
            );

            for i in 1..n - 1 {
                self.rhs[i - 1] = half_a * self.values[i - 1]
                    + (1.0 + half_b) * self.values[i]
                    + half_g * self.values[i + 1];
            }
            self.rhs[0] += half_a * lo;
            self.rhs[m - 1] += half_g * up;

            solve_tridiagonal_inplace(
                &self.lower,
                &self.diag,
                &self.upper,
                &self.rhs,
                &mut self.c_star,
                &mut self.d_star,
                &mut self.interior,
            )?;

            self.values[0] = lo;
            self.values[1..n - 1].copy_from_slice(&self.interior);
            self.values[n - 1] = up;
            self.apply_exercise_floor();
        }
        Ok(())
    }

    /// Maps values just after the ex-date onto values just before it.
    fn apply_jump(&mut self, jump: Jump) {
        let zero_spot_value = match self.option_type {
            OptionType::Call => 0.0,
            OptionType::Put => {
                self.strike * (-self.market.rate() * (self.market.expiry() - jump.time)).exp()
            }
        };
        for (out, &s) in self.scratch.iter_mut().zip(&self.grid.spots) {
            let shifted = s - jump.amount;
            *out = if shifted <= 0.0 {
                zero_spot_value
            } else {
                interpolate_on_grid(shifted, &self.grid.spots, &self.values)
            };
        }
        std::mem::swap(&mut self.values, &mut self.scratch);
        self.apply_exercise_floor();
    }
}

impl PricingEngine for DividendFdEngine {
    fn method(&self) -> PricingMethod {
        PricingMethod::FiniteDifference
    }

    fn price(
        &self,
        market: &MarketModel,
        option: &OptionSpec,
        exercise: ExerciseStyle,
    ) -> Result<PriceResult, PricingError> {
        if self.steps < MIN_FD_STEPS {
            return Err(PricingError::InvalidResolution {
                steps: self.steps,
                minimum: MIN_FD_STEPS,
            });
        }
        let spot = PricingError::require_positive("spot", market.spot())?;
        let strike = PricingError::require_positive("strike", option.strike)?;
        let vol = PricingError::require_positive("volatility", market.vol())?;
        let expiry = PricingError::require_positive("time_to_maturity", market.expiry())?;

        let jumps = collect_jumps(market.dividends(), expiry)?;
        let grid = LogSpotGrid::new(self.steps - 1, spot, strike, vol, expiry)?;
        debug!(
            nodes = grid.len(),
            steps = self.steps,
            dividends = jumps.len(),
            "finite-difference grid built"
        );

        // segment boundaries: 0, interior ex-times, expiry
        let mut bounds = vec![0.0];
        bounds.extend(jumps.iter().map(|j| j.time).filter(|&t| t < expiry));
        bounds.push(expiry);

        let mut solver = Solver::new(&grid, market, option, exercise.is_american());
        if let Some(at_expiry) = jumps.iter().find(|j| j.time == expiry) {
            solver.apply_jump(*at_expiry);
        }

        for seg in (0..bounds.len() - 1).rev() {
            let (t_lo, t_hi) = (bounds[seg], bounds[seg + 1]);
            let n_steps = ((self.steps as f64 * (t_hi - t_lo) / expiry).round() as usize).max(1);
            solver.roll_back(t_hi, t_lo, n_steps)?;
            if seg > 0 {
                if let Some(jump) = jumps.iter().find(|j| j.time == t_lo) {
                    solver.apply_jump(*jump);
                }
            }
        }

        let s = &grid.spots;
        let v = &solver.values;
        let j = grid.centre;
        let delta = (v[j + 1] - v[j - 1]) / (s[j + 1] - s[j - 1]);
        let gamma = ((v[j + 1] - v[j]) / (s[j + 1] - s[j]) - (v[j] - v[j - 1]) / (s[j] - s[j - 1]))
            / (0.5 * (s[j + 1] - s[j - 1]));

        PriceResult {
            exercise,
            method: self.method(),
            npv: v[j],
            delta,
            gamma,
        }
        .checked()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::engines::analytic::{BlackScholesEngine, bs_price};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ibm_dividend_call(vol: f64) -> (MarketModel, OptionSpec) {
        let spec = OptionSpec::builder("IBM", OptionType::Call)
            .strike(140.0)
            .maturity(date(2018, 7, 20))
            .spot(145.2)
            .risk_free_rate(0.001)
            .cash_dividend(date(2018, 6, 15), 0.12)
            .build()
            .unwrap();
        let market = MarketModel::new(&spec, date(2018, 6, 14), vol).unwrap();
        (market, spec)
    }

    // Volatility and Greeks were taken from this grid at 200 steps: a regression
    // pin, not an accuracy check.
    #[test]
    fn reproduces_reference_dividend_call() {
        let (market, spec) = ibm_dividend_call(0.271_623_342_516_108);
        let engine = DividendFdEngine::new(200);
        let eu = engine.price(&market, &spec, ExerciseStyle::European).unwrap();
        let am = engine.price(&market, &spec, ExerciseStyle::American).unwrap();
        assert_relative_eq!(eu.npv, 7.816_059_175_341_424, epsilon = 1e-6);
        assert!((am.npv - eu.npv).abs() < 1e-8);
        assert_relative_eq!(eu.delta, 0.6778, epsilon = 1e-3);
        assert_relative_eq!(eu.gamma, 0.02897, epsilon = 1e-4);
        assert_eq!(eu.method, PricingMethod::FiniteDifference);
    }

    #[test]
    fn european_dividend_call_is_close_to_escrowed_spot_bs() {
        let (market, spec) = ibm_dividend_call(0.25);
        let t_d: f64 = 1.0 / 365.0;
        let escrowed = bs_price(
            OptionType::Call,
            145.2 - 0.12 * (-0.001 * t_d).exp(),
            140.0,
            0.001,
            0.0,
            0.25,
            market.expiry(),
        )
        .unwrap();
        let fd = DividendFdEngine::new(200)
            .price(&market, &spec, ExerciseStyle::European)
            .unwrap();
        assert_relative_eq!(fd.npv, escrowed, max_relative = 2e-3);
    }

    #[test]
    fn without_dividends_matches_analytic() {
        let spec = OptionSpec::builder("DUMMY", OptionType::Call)
            .strike(130.0)
            .maturity(date(2016, 1, 15))
            .spot(127.62)
            .risk_free_rate(0.001)
            .build()
            .unwrap();
        let market = MarketModel::new(&spec, date(2015, 5, 8), 0.2).unwrap();
        let fd = DividendFdEngine::new(200)
            .price(&market, &spec, ExerciseStyle::European)
            .unwrap();
        let bs = BlackScholesEngine::new()
            .price(&market, &spec, ExerciseStyle::European)
            .unwrap();
        assert_relative_eq!(fd.npv, bs.npv, max_relative = 1e-3);
        assert_relative_eq!(fd.delta, bs.delta, epsilon = 1e-3);
    }

    #[test]
    fn american_put_with_dividend_dominates_european_and_intrinsic() {
        let spec = OptionSpec::builder("X", OptionType::Put)
            .strike(100.0)
            .maturity(date(2021, 1, 1))
            .spot(100.0)
            .risk_free_rate(0.05)
            .cash_dividend(date(2020, 7, 1), 2.0)
            .build()
            .unwrap();
        let market = MarketModel::new(&spec, date(2020, 1, 1), 0.25).unwrap();
        let engine = DividendFdEngine::new(200);
        let eu = engine.price(&market, &spec, ExerciseStyle::European).unwrap();
        let am = engine.price(&market, &spec, ExerciseStyle::American).unwrap();
        assert!(am.npv >= eu.npv);
        assert!(am.npv > eu.npv + 0.05);
        assert!(eu.delta < 0.0 && eu.gamma > 0.0);
    }

    #[test]
    fn dividend_on_maturity_date_is_applied() {
        let with_div = OptionSpec::builder("X", OptionType::Call)
            .strike(100.0)
            .maturity(date(2021, 1, 1))
            .spot(100.0)
            .risk_free_rate(0.02)
            .cash_dividend(date(2021, 1, 1), 5.0)
            .build()
            .unwrap();
        let no_div = OptionSpec {
            dividends: crate::market::DividendSpec::None,
            ..with_div.clone()
        };
        let calc = date(2020, 1, 1);
        let engine = DividendFdEngine::new(100);
        let a = engine
            .price(&MarketModel::new(&with_div, calc, 0.2).unwrap(), &with_div, ExerciseStyle::European)
            .unwrap();
        let b = engine
            .price(&MarketModel::new(&no_div, calc, 0.2).unwrap(), &no_div, ExerciseStyle::European)
            .unwrap();
        assert!(a.npv < b.npv - 1.0);
    }

    #[test]
    fn too_few_steps_is_invalid_resolution() {
        let (market, spec) = ibm_dividend_call(0.25);
        assert_eq!(
            DividendFdEngine::new(3)
                .price(&market, &spec, ExerciseStyle::European)
                .unwrap_err(),
            PricingError::InvalidResolution {
                steps: 3,
                minimum: MIN_FD_STEPS
            }
        );
        assert!(
            DividendFdEngine::new(MIN_FD_STEPS)
                .price(&market, &spec, ExerciseStyle::European)
                .is_ok()
        );
    }

    #[test]
    fn same_day_dividends_are_merged() {
        let jumps = collect_jumps(
            &Dividends::Cash(vec![
                crate::market::DividendEvent { time: 0.5, amount: 1.0 },
                crate::market::DividendEvent { time: 0.5, amount: 0.5 },
            ]),
            1.0,
        )
        .unwrap();
        assert_eq!(jumps, vec![Jump { time: 0.5, amount: 1.5 }]);
        assert!(collect_jumps(
            &Dividends::Cash(vec![crate::market::DividendEvent { time: 1.5, amount: 1.0 }]),
            1.0
        )
        .is_err());
    }
}
