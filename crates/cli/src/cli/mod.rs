use clap::{Parser, Subcommand};

mod markets;
mod optimize;
mod predict;
mod products;

#[derive(Debug, Parser)]
#[command(
    name = "trolley",
    about = "Supermarket basket comparison and price prediction",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank supermarkets by what a basket of products costs
    Optimize(optimize::OptimizeArgs),

    /// Predict what a product will cost on a date
    Predict(predict::PredictArgs),

    /// List the products captured in the price history
    Products(products::ProductsArgs),

    /// Summarise the supermarkets in a price matrix
    Markets(markets::MarketsArgs),
}

impl Cli {
    pub(crate) fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Optimize(args) => optimize::run(args),
            Commands::Predict(args) => predict::run(args),
            Commands::Products(args) => products::run(args),
            Commands::Markets(args) => markets::run(args),
        }
    }
}
