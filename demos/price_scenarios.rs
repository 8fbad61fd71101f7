//! Prices the two reference requests: an IBM call with a continuous dividend
//! yield and an IBM call one day before a cash dividend.
//!
//! Pass a `ticker,date,adj_close` CSV path to estimate the yield-call volatility
//! from history instead of using 20%:
//!
//! ```text
//! RUST_LOG=equity_pricer=debug cargo run --example price_scenarios -- tests/fixtures/synthetic_prices_2015.csv
//! ```

use std::error::Error;
use std::sync::Arc;

use chrono::NaiveDate;
use equity_pricer::prelude::*;
use tracing_subscriber::EnvFilter;

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("invalid date {y}-{m}-{d}").into())
}

fn report(label: &str, valuation: &Valuation) {
    println!(
        "{label}: vol = {:.6} ({:?})",
        valuation.volatility, valuation.volatility_source
    );
    for result in [valuation.european, valuation.american] {
        println!(
            "  {:<9} {:<18} NPV = {:.12}  delta = {:.6}  gamma = {:.6}",
            result.exercise.to_string(),
            result.method.to_string(),
            result.npv,
            result.delta,
            result.gamma
        );
    }
    println!("  early-exercise premium = {:.12}", valuation.early_exercise_premium());
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let history = std::env::args().nth(1);
    let mut pricer = Pricer::new();
    let mut yield_call = OptionSpec::builder("IBM", "call".parse()?)
        .strike(130.0)
        .maturity(date(2016, 1, 15)?)
        .spot(127.62)
        .risk_free_rate(0.001)
        .dividend_yield(0.0163);
    match history {
        Some(path) => pricer = pricer.with_source(Arc::new(CsvPriceSource::from_path(path)?)),
        None => yield_call = yield_call.volatility(0.20),
    }
    let valuation = pricer.calculate(&yield_call.build()?, date(2015, 5, 8)?)?;
    report("IBM 130 call, 1.63% yield", &valuation);

    let dividend_call = OptionSpec::builder("IBM", OptionType::Call)
        .strike(140.0)
        .maturity(date(2018, 7, 20)?)
        .spot(145.2)
        .risk_free_rate(0.001)
        .volatility(0.271_623_342_516_108)
        .dividend_schedule(vec![date(2018, 6, 15)?], vec![0.12])
        .build()?;
    let valuation = pricer.calculate(&dividend_call, date(2018, 6, 14)?)?;
    report("IBM 140 call, 0.12 cash dividend", &valuation);

    Ok(())
}
