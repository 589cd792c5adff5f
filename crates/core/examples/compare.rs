//! Price Comparison Example
//!
//! Ranks the fixture supermarkets for a basket drawn from the price matrix.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to limit how many products go in the basket
//! Use `-m` to choose the missing-product policy (exclude, average or highest)
//! Use `--only-complete` to drop supermarkets that lack part of the basket

use std::io;

use anyhow::Result;
use clap::Parser;

use trolley::{fixtures::Fixture, optimize::optimize, utils::ExampleCompareArgs};

/// Price Comparison Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExampleCompareArgs::parse();

    let mut fixture = Fixture::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"));
    fixture.load_prices(&args.fixture)?;

    let matrix = fixture.matrix()?;
    let basket = fixture.basket(args.n)?;

    let comparison = optimize(&basket, matrix, args.only_complete, args.missing)?;

    if comparison.is_empty() {
        println!("No supermarket qualifies for this basket.");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    comparison.write_to(&mut handle, matrix)?;
    comparison.write_price_breakdown(&mut handle, &basket, matrix)?;

    Ok(())
}
