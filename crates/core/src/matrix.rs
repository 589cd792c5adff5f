//! Price Matrix
//!
//! A sparse products-by-supermarkets table of shelf prices. Rows are
//! products, columns are supermarkets, and a missing cell means the
//! supermarket does not stock that product. All prices in a matrix share one
//! currency.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    markets::{Market, MarketKey},
    prices::Price,
    products::{Product, ProductKey},
};

/// Price Matrix Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// A product with this name is already in the matrix
    #[error("duplicate product: {0}")]
    DuplicateProduct(String),

    /// A supermarket with this name is already in the matrix
    #[error("duplicate supermarket: {0}")]
    DuplicateMarket(String),

    /// The product key does not belong to this matrix
    #[error("missing product: {0:?}")]
    MissingProduct(ProductKey),

    /// The supermarket key does not belong to this matrix
    #[error("missing supermarket: {0:?}")]
    MissingMarket(MarketKey),

    /// The price currency does not match the matrix currency
    #[error("currency mismatch: expected {0}, got {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Shelf prices cannot be negative
    #[error("negative price for {product} at {market}")]
    NegativePrice {
        /// Product name
        product: String,
        /// Supermarket name
        market: String,
    },
}

/// A sparse matrix of shelf prices, indexed by product and supermarket.
#[derive(Debug, Clone)]
pub struct PriceMatrix {
    products: SlotMap<ProductKey, Product>,
    markets: SlotMap<MarketKey, Market>,
    product_keys: FxHashMap<String, ProductKey>,
    market_keys: FxHashMap<String, MarketKey>,
    market_order: Vec<MarketKey>,
    cells: FxHashMap<(ProductKey, MarketKey), Price>,
    currency: &'static Currency,
}

impl PriceMatrix {
    /// Creates an empty matrix holding prices in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            markets: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            market_keys: FxHashMap::default(),
            market_order: Vec::new(),
            cells: FxHashMap::default(),
            currency,
        }
    }

    /// Returns the currency shared by every price in the matrix.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Adds a product row and returns its key.
    ///
    /// # Errors
    ///
    /// Returns a [`MatrixError::DuplicateProduct`] error if a product with
    /// this name already exists.
    pub fn add_product(&mut self, name: impl Into<String>) -> Result<ProductKey, MatrixError> {
        let name = name.into();

        if self.product_keys.contains_key(&name) {
            return Err(MatrixError::DuplicateProduct(name));
        }

        let key = self.products.insert(Product::new(name.clone()));
        self.product_keys.insert(name, key);

        Ok(key)
    }

    /// Adds a supermarket column and returns its key.
    ///
    /// Column order is preserved and decides ties when supermarkets rank with
    /// equal basket totals.
    ///
    /// # Errors
    ///
    /// Returns a [`MatrixError::DuplicateMarket`] error if a supermarket with
    /// this name already exists.
    pub fn add_market(&mut self, name: impl Into<String>) -> Result<MarketKey, MatrixError> {
        let name = name.into();

        if self.market_keys.contains_key(&name) {
            return Err(MatrixError::DuplicateMarket(name));
        }

        let key = self.markets.insert(Market::new(name.clone()));
        self.market_keys.insert(name, key);
        self.market_order.push(key);

        Ok(key)
    }

    /// Sets the shelf price of a product at a supermarket, replacing any
    /// previous price in that cell.
    ///
    /// # Errors
    ///
    /// Returns a [`MatrixError`] error if either key is foreign to this
    /// matrix, the price is negative, or its currency does not match the
    /// matrix currency.
    pub fn set_price(
        &mut self,
        product: ProductKey,
        market: MarketKey,
        price: Price,
    ) -> Result<(), MatrixError> {
        let product_name = self
            .products
            .get(product)
            .map(|entry| entry.name.clone())
            .ok_or(MatrixError::MissingProduct(product))?;

        let market_name = self
            .markets
            .get(market)
            .map(|entry| entry.name.clone())
            .ok_or(MatrixError::MissingMarket(market))?;

        if price.currency() != self.currency {
            return Err(MatrixError::CurrencyMismatch(
                self.currency.iso_alpha_code,
                price.currency().iso_alpha_code,
            ));
        }

        if *price.amount() < Decimal::ZERO {
            return Err(MatrixError::NegativePrice {
                product: product_name,
                market: market_name,
            });
        }

        self.cells.insert((product, market), price);

        Ok(())
    }

    /// Returns the shelf price of a product at a supermarket, if the
    /// supermarket stocks it.
    #[must_use]
    pub fn price(&self, product: ProductKey, market: MarketKey) -> Option<&Price> {
        self.cells.get(&(product, market))
    }

    /// Looks up a product key by name.
    #[must_use]
    pub fn product_key(&self, name: &str) -> Option<ProductKey> {
        self.product_keys.get(name).copied()
    }

    /// Looks up a supermarket key by name.
    #[must_use]
    pub fn market_key(&self, name: &str) -> Option<MarketKey> {
        self.market_keys.get(name).copied()
    }

    /// Returns the product behind a key.
    #[must_use]
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Returns the supermarket behind a key.
    #[must_use]
    pub fn market(&self, key: MarketKey) -> Option<&Market> {
        self.markets.get(key)
    }

    /// Iterates over the product rows.
    pub fn products(&self) -> impl Iterator<Item = (ProductKey, &Product)> {
        self.products.iter()
    }

    /// Iterates over the supermarket columns in insertion order.
    pub fn markets(&self) -> impl Iterator<Item = (MarketKey, &Market)> {
        self.market_order
            .iter()
            .filter_map(|&key| self.markets.get(key).map(|market| (key, market)))
    }

    /// Returns the number of product rows.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Returns the number of supermarket columns.
    #[must_use]
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Returns the number of populated cells.
    #[must_use]
    pub fn price_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of products a supermarket has a price for.
    #[must_use]
    pub fn priced_product_count(&self, market: MarketKey) -> usize {
        self.cells.keys().filter(|(_, key)| *key == market).count()
    }

    /// Returns `true` if the matrix has no products and no supermarkets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.markets.is_empty()
    }
}
