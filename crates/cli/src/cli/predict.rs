use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use rusty_money::iso;
use trolley::{
    history::load_history,
    predict::{load_model, predict_price},
};

#[derive(Debug, Args)]
pub(crate) struct PredictArgs {
    /// Price history CSV of captured observations
    #[arg(long, env = "TROLLEY_HISTORY")]
    history: PathBuf,

    /// Trained model weights YAML
    #[arg(long, env = "TROLLEY_MODEL")]
    model: PathBuf,

    /// Supermarket to predict for
    #[arg(short, long)]
    supermarket: String,

    /// Category the product is filed under
    #[arg(short, long)]
    category: String,

    /// Product to predict the price of
    #[arg(short, long)]
    product: String,

    /// Date to predict for, DD/MM/YYYY
    #[arg(short, long)]
    date: String,
}

pub(crate) fn run(args: PredictArgs) -> anyhow::Result<()> {
    let date = NaiveDate::parse_from_str(&args.date, "%d/%m/%Y")
        .with_context(|| format!("expected a DD/MM/YYYY date, got {}", args.date))?;

    let history = load_history(&args.history)
        .with_context(|| format!("failed to load history from {}", args.history.display()))?;

    let model = load_model(&args.model)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;

    let prediction = predict_price(
        &model,
        &history,
        &args.supermarket,
        &args.category,
        &args.product,
        date,
        iso::GBP,
    )?;

    let stats = prediction.stats;

    println!();
    println!("  Product:      {}", args.product);
    println!("  Supermarket:  {}", args.supermarket);
    println!("  Category:     {}", args.category);
    println!("  Date:         {}", date.format("%-d %B %Y"));
    println!();
    println!("  Predicted price:  {}", prediction.price);
    println!();
    println!("  Historical mean:  £{:.2}", stats.mean);
    println!("  Lowest price:     £{:.2}", stats.min);
    println!("  Highest price:    £{:.2}", stats.max);
    println!("  Deviation:        £{:.2}", stats.std);
    println!("  Observations:     {}", stats.count);

    Ok(())
}
