use std::{io, path::PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use trolley::{
    basket::Basket,
    loader::load_price_matrix,
    optimize::{PenaltyMethod, optimize},
    prices::currency_from_code,
};

#[derive(Debug, Args)]
pub(crate) struct OptimizeArgs {
    /// Price matrix CSV: a header row of supermarkets, one row per product
    #[arg(long, env = "TROLLEY_PRICES")]
    prices: PathBuf,

    /// ISO currency code attached to every price
    #[arg(long, default_value = "GBP")]
    currency: String,

    /// Product to put in the basket; repeat for more
    #[arg(short, long = "product", required = true)]
    products: Vec<String>,

    /// Only rank supermarkets stocking the whole basket
    #[arg(long)]
    only_complete: bool,

    /// How to score supermarkets that lack basket products
    #[arg(long, value_enum, default_value_t = MissingPolicy::Exclude)]
    missing: MissingPolicy,

    /// Show the per-product price breakdown under the ranking
    #[arg(long)]
    detail: bool,
}

/// How a missing product affects a supermarket's total
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MissingPolicy {
    /// Total only the products on the shelf
    Exclude,

    /// Charge the selection's average price per missing product
    Average,

    /// Charge the selection's dearest price per missing product
    Highest,
}

impl From<MissingPolicy> for PenaltyMethod {
    fn from(policy: MissingPolicy) -> Self {
        match policy {
            MissingPolicy::Exclude => Self::Exclude,
            MissingPolicy::Average => Self::Average,
            MissingPolicy::Highest => Self::Highest,
        }
    }
}

pub(crate) fn run(args: OptimizeArgs) -> anyhow::Result<()> {
    let currency = currency_from_code(&args.currency)?;
    let matrix = load_price_matrix(&args.prices, currency)
        .with_context(|| format!("failed to load prices from {}", args.prices.display()))?;

    let basket = Basket::from_names(args.products);
    let comparison = optimize(&basket, &matrix, args.only_complete, args.missing.into())?;

    if comparison.is_empty() {
        if args.only_complete {
            println!("No supermarket stocks the whole basket.");
        } else {
            println!("No supermarket prices any of the selected products.");
        }

        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    comparison.write_to(&mut handle, &matrix)?;

    if args.detail {
        comparison.write_price_breakdown(&mut handle, &basket, &matrix)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_the_missing_flag_onto_the_penalty_method() {
        assert_eq!(
            PenaltyMethod::from(MissingPolicy::Exclude),
            PenaltyMethod::Exclude
        );
        assert_eq!(
            PenaltyMethod::from(MissingPolicy::Average),
            PenaltyMethod::Average
        );
        assert_eq!(
            PenaltyMethod::from(MissingPolicy::Highest),
            PenaltyMethod::Highest
        );
    }
}
