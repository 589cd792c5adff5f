//! Feature Encoding
//!
//! Turns a prediction request into the named feature vector the trained
//! model scores. Feature names and encodings follow the columns the model
//! was trained on, so they cannot be renamed without retraining.

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use crate::{history::ProductSeries, predict::PredictError};

/// Supermarkets the trained model treats as discounters.
pub const DISCOUNT_SUPERMARKETS: [&str; 2] = ["Aldi", "ASDA"];

/// Categories the trained model treats as premium.
pub const PREMIUM_CATEGORIES: [&str; 3] = ["health_products", "baby_products", "home"];

/// One-hot column prefixes; absent columns under these score zero.
const ONE_HOT_PREFIXES: [&str; 2] = ["supermarket_", "category_"];

/// A named feature vector ready to be scored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    values: FxHashMap<String, f64>,
}

impl FeatureVector {
    /// Sets a feature, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// The value of a feature, if one was encoded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// The value the model should score for a feature.
    ///
    /// One-hot columns (`supermarket_*`, `category_*`) that were not encoded
    /// score zero; any other absent feature is an encoding mismatch.
    ///
    /// # Errors
    ///
    /// Returns a [`PredictError::MissingFeature`] error if the feature is
    /// neither encoded nor a one-hot column.
    pub fn lookup(&self, name: &str) -> Result<f64, PredictError> {
        if let Some(value) = self.values.get(name) {
            return Ok(*value);
        }

        if ONE_HOT_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            return Ok(0.0);
        }

        Err(PredictError::MissingFeature {
            name: name.to_string(),
        })
    }

    /// Returns the number of encoded features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Calendar features derived from the prediction date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFeatures {
    /// Month number, 1 to 12
    pub month: u32,

    /// Day of the month, 1 to 31
    pub day: u32,

    /// Day of the week, Monday is 0
    pub day_of_week: u32,

    /// ISO week number
    pub week: u32,

    /// Saturday or Sunday
    pub is_weekend: bool,

    /// Within the first week of the month
    pub is_month_start: bool,

    /// On or after the 25th
    pub is_month_end: bool,

    /// Meteorological season: winter 0, spring 1, summer 2, autumn 3
    pub season: u32,
}

impl DateFeatures {
    /// Derives the calendar features for a date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        let day = date.day();
        let day_of_week = date.weekday().num_days_from_monday();

        Self {
            month,
            day,
            day_of_week,
            week: date.iso_week().week(),
            is_weekend: day_of_week >= 5,
            is_month_start: day <= 7,
            is_month_end: day >= 25,
            season: match month {
                12 | 1 | 2 => 0,
                3..=5 => 1,
                6..=8 => 2,
                _ => 3,
            },
        }
    }

    fn write_into(self, features: &mut FeatureVector) {
        features.set("month", f64::from(self.month));
        features.set("day", f64::from(self.day));
        features.set("day_of_week", f64::from(self.day_of_week));
        features.set("week", f64::from(self.week));
        features.set("is_weekend", flag(self.is_weekend));
        features.set("is_month_start", flag(self.is_month_start));
        features.set("is_month_end", flag(self.is_month_end));
        features.set("season_encoded", f64::from(self.season));
    }
}

/// The supermarket name as the trained model's one-hot columns spell it.
#[must_use]
pub fn supermarket_token(name: &str) -> &str {
    if name == "Sainsbury's" { "Sains" } else { name }
}

/// Encodes the feature vector for one prediction request, or `None` when
/// the series has no observations to draw reference features from.
#[must_use]
pub fn encode_features(
    supermarket: &str,
    category: &str,
    date: NaiveDate,
    series: &ProductSeries,
) -> Option<FeatureVector> {
    let latest = series.latest()?;
    let stats = series.stats()?;
    let mean_unit_price = series.mean_unit_price()?;

    let mut features = FeatureVector::default();

    DateFeatures::from_date(date).write_into(&mut features);

    features.set("price_unit_gbp", latest.unit_price);
    features.set("unit_encoded", latest.unit.encoded());
    features.set("price_category_encoded", latest.band.encoded());
    features.set("is_own_brand", flag(latest.own_brand));

    // The offset is part of the trained feature definition.
    features.set("price_to_unit_ratio", stats.mean / (mean_unit_price + 0.001));
    features.set("price_vs_category_avg", 0.0);
    features.set("price_vs_supermarket_avg", 0.0);

    let premium = PREMIUM_CATEGORIES.contains(&category);
    let discount = DISCOUNT_SUPERMARKETS.contains(&supermarket);

    features.set("is_premium_category", flag(premium));
    features.set("is_discount_supermarket", flag(discount));
    features.set(
        "premium_category_x_premium_supermarket",
        flag(premium) * (1.0 - flag(discount)),
    );

    features.set(format!("supermarket_{}", supermarket_token(supermarket)), 1.0);
    features.set(format!("category_{category}"), 1.0);

    Some(features)
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
