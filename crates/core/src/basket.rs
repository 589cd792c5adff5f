//! Baskets

use smallvec::SmallVec;

/// A shopping basket: the set of product names to price.
///
/// Products are kept in the order they were added, and adding a product a
/// second time has no effect. A basket is independent of any price matrix, so
/// it may name products no matrix knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket {
    products: SmallVec<[String; 8]>,
}

impl Basket {
    /// Creates an empty basket.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a basket from product names, dropping duplicates.
    #[must_use]
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut basket = Self::new();

        for name in names {
            basket.add(name);
        }

        basket
    }

    /// Adds a product to the basket.
    ///
    /// Returns `false` if the product was already in the basket.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();

        if self.contains(&name) {
            return false;
        }

        self.products.push(name);

        true
    }

    /// Returns `true` if the basket contains the product.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.products.iter().any(|product| product == name)
    }

    /// Iterates over the product names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(String::as_str)
    }

    /// Returns the number of distinct products in the basket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns `true` if the basket holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Basket {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}
