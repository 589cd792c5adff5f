//! Price Matrix Loading
//!
//! Loads a [`PriceMatrix`] from a CSV file (rows are products, columns are
//! supermarkets, an empty cell means not stocked) and caches the result
//! against the file's modification time so long-lived processes pick up
//! price updates without restarting.

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
    time::SystemTime,
};

use csv::{ReaderBuilder, Trim};
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    matrix::{MatrixError, PriceMatrix},
    prices::{self, PriceError},
};

/// Load Error
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading the file
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Malformed CSV
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The rows and columns do not form a valid matrix
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// The header row has a supermarket column with no name
    #[error("unnamed supermarket in column {0}")]
    UnnamedMarket(usize),

    /// A data row has no product name
    #[error("unnamed product on line {0}")]
    UnnamedProduct(usize),

    /// A cell failed to parse as a price
    #[error("bad price for {product} at {market}: {source}")]
    Price {
        /// Product name of the cell's row
        product: String,

        /// Supermarket name of the cell's column
        market: String,

        /// What was wrong with the cell
        source: PriceError,
    },
}

/// Loads a price matrix from a CSV file.
///
/// The header row names the supermarkets; its first cell is a label for the
/// product column and is ignored. Each following row is one product. An
/// empty cell means the supermarket does not stock the product. Cells are
/// trimmed before parsing.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read, the CSV is malformed,
/// a product or supermarket name is blank or duplicated, or a price fails to
/// parse.
pub fn load_price_matrix(
    path: impl AsRef<Path>,
    currency: &'static Currency,
) -> Result<PriceMatrix, LoadError> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let mut matrix = PriceMatrix::new(currency);
    let mut markets = Vec::new();

    let headers = reader.headers()?.clone();

    for (idx, name) in headers.iter().enumerate().skip(1) {
        if name.is_empty() {
            return Err(LoadError::UnnamedMarket(idx + 1));
        }

        markets.push((matrix.add_market(name)?, name.to_string()));
    }

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;

        // Line 1 is the header row.
        let line = row_idx + 2;

        let product_name = record
            .get(0)
            .filter(|name| !name.is_empty())
            .ok_or(LoadError::UnnamedProduct(line))?
            .to_string();

        let product = matrix.add_product(&product_name)?;

        for (market_idx, (market, market_name)) in markets.iter().enumerate() {
            let Some(cell) = record.get(market_idx + 1) else {
                continue;
            };

            if cell.is_empty() {
                continue;
            }

            let price = prices::parse_price(cell, currency).map_err(|source| LoadError::Price {
                product: product_name.clone(),
                market: market_name.clone(),
                source,
            })?;

            matrix.set_price(product, *market, price)?;
        }
    }

    info!(
        "loaded price matrix: {} products x {} supermarkets, {} prices",
        matrix.product_count(),
        matrix.market_count(),
        matrix.price_count()
    );

    Ok(matrix)
}

/// A price matrix cached against its file's modification time.
///
/// Owned by the composition root; the optimizer itself only ever sees an
/// immutable [`PriceMatrix`].
#[derive(Debug)]
pub struct MatrixCache {
    path: PathBuf,
    currency: &'static Currency,
    cached: Option<CachedMatrix>,
}

#[derive(Debug)]
struct CachedMatrix {
    loaded_at: SystemTime,
    matrix: PriceMatrix,
}

impl MatrixCache {
    /// Creates a cache for the matrix at `path`.
    ///
    /// Nothing is loaded until the first call to [`MatrixCache::matrix`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, currency: &'static Currency) -> Self {
        Self {
            path: path.into(),
            currency,
            cached: None,
        }
    }

    /// The path the matrix is loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached matrix, reloading it first if the file on disk has
    /// a different modification time than the copy in memory.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be inspected or loaded.
    pub fn matrix(&mut self) -> Result<&PriceMatrix, LoadError> {
        let modified = fs::metadata(&self.path)?.modified()?;

        // Probe freshness before borrowing the entry: the borrow checker
        // cannot track a borrow returned from one match arm alongside a
        // mutation in the other.
        let is_fresh = matches!(&self.cached, Some(cached) if cached.loaded_at == modified);

        if !is_fresh {
            debug!("loading price matrix from {}", self.path.display());

            let matrix = load_price_matrix(&self.path, self.currency)?;
            self.cached = Some(CachedMatrix {
                loaded_at: modified,
                matrix,
            });
        }

        match &self.cached {
            Some(cached) => Ok(&cached.matrix),
            None => unreachable!("the cache was populated above"),
        }
    }

    /// Drops the in-memory copy so the next call to [`MatrixCache::matrix`]
    /// reloads from disk.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
