//! Basket Optimization
//!
//! Ranks supermarkets by the total cost of a shopping basket. A supermarket
//! that does not stock every basket product is handled by the chosen
//! [`PenaltyMethod`]: its missing products are either left out of the total or
//! priced at a penalty derived from the prices the selection does have.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::Money;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    basket::Basket,
    comparison::Comparison,
    markets::MarketKey,
    matrix::PriceMatrix,
    prices::Price,
    products::ProductKey,
};

/// Optimization Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptimizeError {
    /// A missing-product penalty was requested, but the basket selection has
    /// no prices anywhere in the matrix to base one on
    #[error("no price data for the selected products to base a missing-product penalty on")]
    NoPriceData,
}

/// How a supermarket's total is scored when it is missing basket products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PenaltyMethod {
    /// Missing products contribute nothing to the total
    #[default]
    Exclude,

    /// Each missing product is priced at the mean of every available price
    /// across the basket selection
    Average,

    /// Each missing product is priced at the highest available price across
    /// the basket selection
    Highest,
}

impl fmt::Display for PenaltyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::Average => write!(f, "average"),
            Self::Highest => write!(f, "highest"),
        }
    }
}

/// Penalty Method Parse Error
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown penalty method: {0} (expected exclude, average or highest)")]
pub struct ParsePenaltyMethodError(String);

impl FromStr for PenaltyMethod {
    type Err = ParsePenaltyMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exclude" => Ok(Self::Exclude),
            "average" => Ok(Self::Average),
            "highest" => Ok(Self::Highest),
            other => Err(ParsePenaltyMethodError(other.to_string())),
        }
    }
}

/// The outcome for a single supermarket: its basket total and how it was
/// reached.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTotal {
    /// The supermarket this total belongs to
    pub market: MarketKey,

    /// Basket total, including any missing-product penalty
    pub total: Price,

    /// Number of basket products this supermarket has a price for
    pub available: usize,

    /// Number of basket products this supermarket has no price for
    pub missing: usize,

    /// Shelf price of each available product
    pub prices: FxHashMap<ProductKey, Price>,

    /// Whether the total includes a missing-product penalty
    pub has_penalty: bool,
}

/// The penalty base over a basket selection: the mean and the maximum of
/// every price the selected products have, at any supermarket.
///
/// Both are undefined when the selection has no prices at all, and asking for
/// either in that state is an error rather than a zero smuggled into a total.
#[derive(Debug, Clone, Copy)]
struct PenaltyBase {
    average: Option<Decimal>,
    highest: Option<Decimal>,
}

impl PenaltyBase {
    fn over_selection(matrix: &PriceMatrix, selected: &[ProductKey]) -> Self {
        let mut sum = Decimal::ZERO;
        let mut count = 0_u32;
        let mut highest: Option<Decimal> = None;

        for &product in selected {
            for (market, _) in matrix.markets() {
                if let Some(price) = matrix.price(product, market) {
                    let amount = *price.amount();

                    sum += amount;
                    count += 1;
                    highest = Some(highest.map_or(amount, |current| current.max(amount)));
                }
            }
        }

        let average = (count > 0).then(|| sum / Decimal::from(count));

        Self { average, highest }
    }

    fn average(&self) -> Result<Decimal, OptimizeError> {
        self.average.ok_or(OptimizeError::NoPriceData)
    }

    fn highest(&self) -> Result<Decimal, OptimizeError> {
        self.highest.ok_or(OptimizeError::NoPriceData)
    }
}

/// Ranks the supermarkets in `matrix` by the total cost of `basket`, cheapest
/// first.
///
/// A basket product the matrix has no row for counts as missing at every
/// supermarket. With `only_complete` set, supermarkets missing any basket
/// product are left out entirely; otherwise `method` decides how their totals
/// account for the gaps. Supermarkets with no price for any basket product
/// are never ranked. Ties keep the matrix column order.
///
/// An empty basket produces an empty comparison, as does a basket the matrix
/// holds no prices for.
///
/// # Errors
///
/// Returns an [`OptimizeError::NoPriceData`] error if a penalty is needed but
/// the selection has no prices to derive one from.
pub fn optimize(
    basket: &Basket,
    matrix: &PriceMatrix,
    only_complete: bool,
    method: PenaltyMethod,
) -> Result<Comparison, OptimizeError> {
    if basket.is_empty() {
        return Ok(Comparison::new(Vec::new(), matrix.currency()));
    }

    let selected: SmallVec<[ProductKey; 8]> = basket
        .iter()
        .filter_map(|name| matrix.product_key(name))
        .collect();

    let base = PenaltyBase::over_selection(matrix, &selected);
    let wanted = basket.len();

    let mut entries: Vec<MarketTotal> = Vec::with_capacity(matrix.market_count());

    for (market, _) in matrix.markets() {
        let mut prices = FxHashMap::default();
        let mut total = Decimal::ZERO;

        for &product in &selected {
            if let Some(price) = matrix.price(product, market) {
                total += *price.amount();
                prices.insert(product, *price);
            }
        }

        let available = prices.len();
        let missing = wanted - available;

        if only_complete && missing > 0 {
            continue;
        }

        if available == 0 {
            continue;
        }

        let has_penalty = missing > 0 && method != PenaltyMethod::Exclude;

        if missing > 0 {
            match method {
                PenaltyMethod::Exclude => {}
                PenaltyMethod::Average => total += Decimal::from(missing) * base.average()?,
                PenaltyMethod::Highest => total += Decimal::from(missing) * base.highest()?,
            }
        }

        entries.push(MarketTotal {
            market,
            total: Money::from_decimal(total, matrix.currency()),
            available,
            missing,
            prices,
            has_penalty,
        });
    }

    entries.sort_by(|a, b| a.total.amount().cmp(b.total.amount()));

    Ok(Comparison::new(entries, matrix.currency()))
}
