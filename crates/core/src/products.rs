//! Products

use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// A product row in the price matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product name, unique within a matrix
    pub name: String,
}

impl Product {
    /// Creates a new product with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
