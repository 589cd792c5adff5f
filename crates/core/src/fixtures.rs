//! Fixtures

use std::path::PathBuf;

use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::{
    basket::Basket,
    history::{self, HistoryError, PriceHistory},
    loader::{LoadError, load_price_matrix},
    matrix::PriceMatrix,
    predict::{ModelError, PriceModel, load_model},
};

/// Fixture Loading Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Price matrix fixture failed to load
    #[error("Failed to load price fixture: {0}")]
    Prices(#[from] LoadError),

    /// Price history fixture failed to load
    #[error("Failed to load history fixture: {0}")]
    History(#[from] HistoryError),

    /// Model fixture failed to load
    #[error("Failed to load model fixture: {0}")]
    Model(#[from] ModelError),

    /// No price matrix loaded yet
    #[error("No price matrix loaded")]
    NoMatrix,

    /// No price history loaded yet
    #[error("No price history loaded")]
    NoHistory,

    /// No price model loaded yet
    #[error("No price model loaded")]
    NoModel,

    /// Not enough products in the loaded matrix
    #[error("Not enough products in fixture, available: {available}, requested: {requested}")]
    NotEnoughProducts {
        /// Number of products in the loaded matrix
        available: usize,

        /// Number of products requested
        requested: usize,
    },
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Currency attached to loaded price matrices
    currency: &'static Currency,

    matrix: Option<PriceMatrix>,
    history: Option<PriceHistory>,
    model: Option<PriceModel>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            currency: iso::GBP,
            matrix: None,
            history: None,
            model: None,
        }
    }

    /// Set the currency attached to subsequently loaded price matrices
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Load a price matrix from a CSV fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_prices(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("prices").join(format!("{name}.csv"));
        self.matrix = Some(load_price_matrix(file_path, self.currency)?);

        Ok(self)
    }

    /// Load a price history from a CSV fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_history(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("history").join(format!("{name}.csv"));
        self.history = Some(history::load_history(file_path)?);

        Ok(self)
    }

    /// Load a price model from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_model(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("models").join(format!("{name}.yml"));
        self.model = Some(load_model(file_path)?);

        Ok(self)
    }

    /// Load a complete fixture set (prices, history and model with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_prices(name)?
            .load_history(name)?
            .load_model(name)?;

        Ok(fixture)
    }

    /// Get the loaded price matrix
    ///
    /// # Errors
    ///
    /// Returns an error if no price matrix has been loaded.
    pub fn matrix(&self) -> Result<&PriceMatrix, FixtureError> {
        self.matrix.as_ref().ok_or(FixtureError::NoMatrix)
    }

    /// Get the loaded price history
    ///
    /// # Errors
    ///
    /// Returns an error if no price history has been loaded.
    pub fn history(&self) -> Result<&PriceHistory, FixtureError> {
        self.history.as_ref().ok_or(FixtureError::NoHistory)
    }

    /// Get the loaded price model
    ///
    /// # Errors
    ///
    /// Returns an error if no price model has been loaded.
    pub fn model(&self) -> Result<&PriceModel, FixtureError> {
        self.model.as_ref().ok_or(FixtureError::NoModel)
    }

    /// Create a basket from the loaded matrix's products, in row order
    ///
    /// # Errors
    ///
    /// Returns an error if no matrix is loaded or it has fewer products
    /// than requested.
    pub fn basket(&self, n: Option<usize>) -> Result<Basket, FixtureError> {
        let matrix = self.matrix()?;
        let available = matrix.product_count();

        if let Some(requested) = n
            && requested > available
        {
            return Err(FixtureError::NotEnoughProducts {
                available,
                requested,
            });
        }

        Ok(matrix
            .products()
            .take(n.unwrap_or(available))
            .map(|(_, product)| product.name.clone())
            .collect())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
