use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use equity_pricer::core::{ExerciseStyle, OptionType, PricingEngine};
use equity_pricer::engines::{BinomialTreeEngine, BlackScholesEngine, DividendFdEngine};
use equity_pricer::instruments::OptionSpec;
use equity_pricer::market::MarketModel;
use proptest::prelude::*;

fn calc_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn request(
    option_type: OptionType,
    spot: f64,
    moneyness: f64,
    rate: f64,
    dividend_yield: f64,
    days: i64,
) -> OptionSpec {
    OptionSpec::builder("X", option_type)
        .strike(spot * moneyness)
        .maturity(calc_date() + Duration::days(days))
        .spot(spot)
        .risk_free_rate(rate)
        .dividend_yield(dividend_yield)
        .build()
        .unwrap()
}

fn dividend_request(
    option_type: OptionType,
    spot: f64,
    moneyness: f64,
    rate: f64,
    days: i64,
    ex_day: i64,
    amount: f64,
) -> OptionSpec {
    OptionSpec::builder("X", option_type)
        .strike(spot * moneyness)
        .maturity(calc_date() + Duration::days(days))
        .spot(spot)
        .risk_free_rate(rate)
        .cash_dividend(calc_date() + Duration::days(ex_day), amount)
        .build()
        .unwrap()
}

fn any_option_type() -> impl Strategy<Value = OptionType> {
    prop_oneof![Just(OptionType::Call), Just(OptionType::Put)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn put_call_parity_holds_for_analytic_engine(
        spot in 20.0f64..300.0,
        moneyness in 0.6f64..1.4,
        rate in -0.01f64..0.08,
        q in 0.0f64..0.05,
        vol in 0.05f64..0.8,
        days in 7i64..1100,
    ) {
        let call = request(OptionType::Call, spot, moneyness, rate, q, days);
        let put = OptionSpec { option_type: OptionType::Put, ..call.clone() };
        let market = MarketModel::new(&call, calc_date(), vol).unwrap();
        let engine = BlackScholesEngine::new();
        let c = engine.price(&market, &call, ExerciseStyle::European).unwrap();
        let p = engine.price(&market, &put, ExerciseStyle::European).unwrap();
        let t = market.expiry();
        let forward_parity = spot * (-q * t).exp() - call.strike * (-rate * t).exp();
        prop_assert!((c.npv - p.npv - forward_parity).abs() < 1e-6);
        prop_assert!((c.delta - p.delta - (-q * t).exp()).abs() < 1e-9);
        prop_assert!((c.gamma - p.gamma).abs() < 1e-12);
    }

    #[test]
    fn value_is_non_decreasing_in_volatility(
        option_type in any_option_type(),
        spot in 50.0f64..150.0,
        moneyness in 0.8f64..1.2,
        rate in 0.0f64..0.06,
        q in 0.0f64..0.04,
        vol in 0.1f64..0.5,
        bump in 0.02f64..0.2,
        days in 90i64..730,
    ) {
        let spec = request(option_type, spot, moneyness, rate, q, days);
        let lo = MarketModel::new(&spec, calc_date(), vol).unwrap();
        let hi = MarketModel::new(&spec, calc_date(), vol + bump).unwrap();

        let bs = BlackScholesEngine::new();
        let eu_lo = bs.price(&lo, &spec, ExerciseStyle::European).unwrap().npv;
        let eu_hi = bs.price(&hi, &spec, ExerciseStyle::European).unwrap().npv;
        prop_assert!(eu_hi >= eu_lo);

        let tree = BinomialTreeEngine::new(200);
        let am_lo = tree.price(&lo, &spec, ExerciseStyle::American).unwrap().npv;
        let am_hi = tree.price(&hi, &spec, ExerciseStyle::American).unwrap().npv;
        prop_assert!(am_hi + 1e-6 >= am_lo);
    }

    #[test]
    fn american_lattice_value_dominates_european(
        option_type in any_option_type(),
        spot in 50.0f64..150.0,
        moneyness in 0.7f64..1.3,
        rate in 0.0f64..0.1,
        q in 0.0f64..0.06,
        vol in 0.1f64..0.6,
        days in 30i64..1100,
    ) {
        let spec = request(option_type, spot, moneyness, rate, q, days);
        let market = MarketModel::new(&spec, calc_date(), vol).unwrap();
        let tree = BinomialTreeEngine::new(150);
        let eu = tree.price(&market, &spec, ExerciseStyle::European).unwrap();
        let am = tree.price(&market, &spec, ExerciseStyle::American).unwrap();
        prop_assert!(am.npv >= eu.npv);
        prop_assert!(am.npv >= option_type.intrinsic(spot, spec.strike));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn american_grid_value_dominates_european(
        option_type in any_option_type(),
        spot in 50.0f64..150.0,
        moneyness in 0.8f64..1.2,
        rate in 0.0f64..0.08,
        vol in 0.1f64..0.5,
        days in 60i64..730,
        ex_fraction in 0.01f64..1.0,
        yield_fraction in 0.0f64..0.05,
    ) {
        let ex_day = ((days as f64 * ex_fraction).ceil() as i64).clamp(1, days);
        let spec = dividend_request(option_type, spot, moneyness, rate, days, ex_day, spot * yield_fraction);
        let market = MarketModel::new(&spec, calc_date(), vol).unwrap();
        let fd = DividendFdEngine::new(60);
        let eu = fd.price(&market, &spec, ExerciseStyle::European).unwrap();
        let am = fd.price(&market, &spec, ExerciseStyle::American).unwrap();
        prop_assert!(am.npv + 1e-9 >= eu.npv);
    }

    #[test]
    fn grid_value_is_non_decreasing_in_volatility(
        option_type in any_option_type(),
        spot in 50.0f64..150.0,
        moneyness in 0.8f64..1.2,
        rate in 0.0f64..0.06,
        vol in 0.1f64..0.5,
        bump in 0.02f64..0.2,
        days in 90i64..730,
        ex_fraction in 0.01f64..1.0,
        yield_fraction in 0.0f64..0.03,
    ) {
        let ex_day = ((days as f64 * ex_fraction).ceil() as i64).clamp(1, days);
        let spec = dividend_request(option_type, spot, moneyness, rate, days, ex_day, spot * yield_fraction);
        let lo = MarketModel::new(&spec, calc_date(), vol).unwrap();
        let hi = MarketModel::new(&spec, calc_date(), vol + bump).unwrap();

        let fd = DividendFdEngine::new(100);
        for exercise in [ExerciseStyle::European, ExerciseStyle::American] {
            let npv_lo = fd.price(&lo, &spec, exercise).unwrap().npv;
            let npv_hi = fd.price(&hi, &spec, exercise).unwrap().npv;
            prop_assert!(npv_hi + 1e-6 >= npv_lo, "{exercise:?}: {npv_hi} < {npv_lo}");
        }
    }
}

#[test]
fn crr_european_converges_to_analytic_at_2000_steps() {
    for option_type in [OptionType::Call, OptionType::Put] {
        for (moneyness, vol) in [(0.9, 0.15), (1.0, 0.25), (1.15, 0.4)] {
            let spec = request(option_type, 100.0, moneyness, 0.03, 0.01, 365);
            let market = MarketModel::new(&spec, calc_date(), vol).unwrap();
            let tree = BinomialTreeEngine::new(2000)
                .price(&market, &spec, ExerciseStyle::European)
                .unwrap();
            let bs = BlackScholesEngine::new()
                .price(&market, &spec, ExerciseStyle::European)
                .unwrap();
            assert_relative_eq!(tree.npv, bs.npv, epsilon = 1e-3, max_relative = 1e-3);
        }
    }
}
