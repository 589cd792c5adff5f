use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use trolley::{loader::load_price_matrix, prices::currency_from_code};

#[derive(Debug, Args)]
pub(crate) struct MarketsArgs {
    /// Price matrix CSV: a header row of supermarkets, one row per product
    #[arg(long, env = "TROLLEY_PRICES")]
    prices: PathBuf,

    /// ISO currency code attached to every price
    #[arg(long, default_value = "GBP")]
    currency: String,
}

pub(crate) fn run(args: MarketsArgs) -> anyhow::Result<()> {
    let currency = currency_from_code(&args.currency)?;

    let matrix = load_price_matrix(&args.prices, currency)
        .with_context(|| format!("failed to load prices from {}", args.prices.display()))?;

    let products = matrix.product_count();

    println!();
    println!(
        "{} supermarkets, {} products, {} prices",
        matrix.market_count(),
        products,
        matrix.price_count()
    );
    println!();

    for (key, market) in matrix.markets() {
        println!(
            "  {}: {} of {} products priced",
            market.name,
            matrix.priced_product_count(key),
            products
        );
    }

    Ok(())
}
