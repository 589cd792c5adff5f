use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use trolley::history::{ProductSeries, SeriesKey, load_history};

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Price history CSV of captured observations
    #[arg(long, env = "TROLLEY_HISTORY")]
    history: PathBuf,

    /// Only list products at this supermarket
    #[arg(short, long)]
    supermarket: Option<String>,

    /// Only list products in this category
    #[arg(short, long)]
    category: Option<String>,

    /// Only list products whose name contains this term
    #[arg(long)]
    search: Option<String>,

    /// Page of results to show
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Results per page
    #[arg(long, default_value_t = 20)]
    page_size: usize,
}

pub(crate) fn run(args: ProductsArgs) -> anyhow::Result<()> {
    let history = load_history(&args.history)
        .with_context(|| format!("failed to load history from {}", args.history.display()))?;

    let search = args.search.as_deref().map(str::to_lowercase);

    let mut listed: Vec<&SeriesKey> = history
        .keys()
        .filter(|key| {
            args.supermarket
                .as_deref()
                .is_none_or(|name| key.supermarket == name)
        })
        .filter(|key| {
            args.category
                .as_deref()
                .is_none_or(|name| key.category == name)
        })
        .filter(|key| {
            search
                .as_deref()
                .is_none_or(|term| key.product.to_lowercase().contains(term))
        })
        .collect();

    listed.sort_by_key(|key| (&key.supermarket, &key.category, &key.product));

    let total = listed.len();

    if total == 0 {
        println!("No products match.");
        return Ok(());
    }

    let (page, pages, start, page_size) = page_window(total, args.page, args.page_size);

    println!();

    if let Some((oldest, newest)) = history.date_range() {
        println!(
            "Prices captured {} to {}",
            oldest.format("%-d %B %Y"),
            newest.format("%-d %B %Y")
        );
        println!();
    }

    for (index, key) in listed.iter().enumerate().skip(start).take(page_size) {
        let observations = history
            .series(&key.product, &key.supermarket, &key.category)
            .map_or(0, ProductSeries::len);

        println!(
            "{:>4}. {}  ({} at {}, {} observations)",
            index + 1,
            key.product,
            key.category,
            key.supermarket,
            observations
        );
    }

    println!();
    println!("Page {page} of {pages}, {total} products");

    Ok(())
}

/// Clamps a page request into range: (page, pages, start index, page size).
fn page_window(total: usize, requested: usize, size: usize) -> (usize, usize, usize, usize) {
    let size = size.max(1);
    let pages = total.div_ceil(size).max(1);
    let page = requested.clamp(1, pages);

    (page, pages, (page - 1) * size, size)
}
