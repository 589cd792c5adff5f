//! Prices

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// A single shelf price, always carrying its currency.
pub type Price = Money<'static, Currency>;

/// Price Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount could not be parsed as a decimal number
    #[error("invalid price amount: {0}")]
    InvalidAmount(String),

    /// Shelf prices cannot be negative
    #[error("negative price: {0}")]
    NegativeAmount(String),

    /// The currency code is not supported
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Resolves an ISO alpha code to one of the supported currencies.
///
/// # Errors
///
/// Returns a [`PriceError::UnknownCurrency`] error if the code is not one of
/// `GBP`, `USD` or `EUR`.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PriceError> {
    match code {
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        _ => Err(PriceError::UnknownCurrency(code.to_string())),
    }
}

/// Parses a decimal amount such as `"2.99"` into a [`Price`] in the given
/// currency.
///
/// Amounts are converted to minor units, rounding sub-penny digits half to
/// even. All supported currencies have two decimal places.
///
/// # Errors
///
/// Returns a [`PriceError`] error if the amount is not a decimal number or is
/// negative.
pub fn parse_price(raw: &str, currency: &'static Currency) -> Result<Price, PriceError> {
    let amount = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|_| PriceError::InvalidAmount(raw.to_string()))?;

    if amount < Decimal::ZERO {
        return Err(PriceError::NegativeAmount(raw.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| PriceError::InvalidAmount(raw.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}
