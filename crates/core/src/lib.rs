//! Trolley
//!
//! Trolley is a supermarket basket comparison and price prediction engine written in Rust.

pub mod basket;
pub mod comparison;
pub mod fixtures;
pub mod history;
pub mod loader;
pub mod markets;
pub mod matrix;
pub mod optimize;
pub mod predict;
pub mod prelude;
pub mod prices;
pub mod products;
pub mod utils;
