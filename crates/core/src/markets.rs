//! Supermarkets

use slotmap::new_key_type;

new_key_type! {
    /// Market Key
    pub struct MarketKey;
}

/// A supermarket column in the price matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    /// Supermarket name, unique within a matrix
    pub name: String,
}

impl Market {
    /// Creates a new supermarket with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
