//! Price Prediction Example
//!
//! Predicts a product's shelf price on a date using the fixture model and
//! history, then prints the historical statistics behind the estimate.
//!
//! Use `-f` to load a fixture set by name
//! Use `-s`, `-c` and `-p` to pick the supermarket, category and product
//! Use `-d` to set the prediction date (DD/MM/YYYY, defaults to today)

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rusty_money::iso;

use trolley::{fixtures::Fixture, predict::predict_price, utils::ExamplePredictArgs};

/// Price Prediction Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExamplePredictArgs::parse();

    let mut fixture = Fixture::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"));
    fixture
        .load_history(&args.fixture)?
        .load_model(&args.fixture)?;

    let date = match args.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%d/%m/%Y")
            .with_context(|| format!("expected a DD/MM/YYYY date, got {raw}"))?,
        None => Local::now().date_naive(),
    };

    let prediction = predict_price(
        fixture.model()?,
        fixture.history()?,
        &args.supermarket,
        &args.category,
        &args.product,
        date,
        iso::GBP,
    )?;

    println!(
        "{} at {} on {}: {}",
        args.product,
        args.supermarket,
        date.format("%-d %B %Y"),
        prediction.price
    );

    let stats = prediction.stats;
    println!(
        "from {} observations: mean £{:.2}, min £{:.2}, max £{:.2}, deviation £{:.2}",
        stats.count, stats.mean, stats.min, stats.max, stats.std
    );

    Ok(())
}
