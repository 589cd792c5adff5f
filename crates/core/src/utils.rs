//! Utils

use clap::Parser;

use crate::optimize::PenaltyMethod;

/// Arguments for the basket comparison examples
#[derive(Debug, Parser)]
pub struct ExampleCompareArgs {
    /// Number of products to put in the basket
    #[clap(short, long)]
    pub n: Option<usize>,

    /// Fixture set to use for the price matrix
    #[clap(short, long, default_value = "uk")]
    pub fixture: String,

    /// How to score supermarkets that lack basket products
    #[clap(short, long, default_value_t = PenaltyMethod::Exclude)]
    pub missing: PenaltyMethod,

    /// Only rank supermarkets stocking the whole basket
    #[clap(long)]
    pub only_complete: bool,
}

/// Arguments for the price prediction examples
#[derive(Debug, Parser)]
pub struct ExamplePredictArgs {
    /// Fixture set to use for the history and model
    #[clap(short, long, default_value = "uk")]
    pub fixture: String,

    /// Supermarket to predict for
    #[clap(short, long, default_value = "Sainsbury's")]
    pub supermarket: String,

    /// Category the product is filed under
    #[clap(short, long, default_value = "dairy")]
    pub category: String,

    /// Product to predict the price of
    #[clap(short, long, default_value = "Semi Skimmed Milk 2L")]
    pub product: String,

    /// Date to predict for, DD/MM/YYYY
    #[clap(short, long)]
    pub date: Option<String>,
}
