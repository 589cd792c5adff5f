//! Price Prediction
//!
//! Estimates a product's shelf price on an arbitrary date by scoring a
//! feature vector with an externally trained linear model, then de-scaling
//! the raw output against the product's own price history.

use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    history::{PriceHistory, PriceStats},
    prices::Price,
};

pub mod features;
pub mod model;

pub use features::{DateFeatures, FeatureVector, encode_features, supermarket_token};
pub use model::{FeatureWeight, ModelError, PriceModel, load_model};

/// Prediction Errors
#[derive(Debug, Error)]
pub enum PredictError {
    /// Nothing has been captured for the requested product
    #[error("no price history for {product} at {supermarket} in {category}")]
    NoHistory {
        /// Product name
        product: String,

        /// Supermarket name
        supermarket: String,

        /// Category name
        category: String,
    },

    /// The model weights a feature the encoder does not produce
    #[error("the model expects a feature named {name} that was not encoded")]
    MissingFeature {
        /// Feature name as the model file spells it
        name: String,
    },

    /// The de-scaled output cannot be represented as a decimal amount
    #[error("the predicted price is not representable as a decimal amount")]
    UnrepresentablePrice,
}

/// A scored and de-scaled price prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted shelf price, floored at one minor unit
    pub price: Price,

    /// Raw model output, in standard deviations from the historical mean
    pub raw_score: f64,

    /// Date the prediction is for
    pub date: NaiveDate,

    /// Historical statistics the output was de-scaled against
    pub stats: PriceStats,
}

/// Predicts the shelf price of a product at a supermarket on a date.
///
/// The raw model output is standardised; it is scaled back up by the
/// product's historical standard deviation around its historical mean, so a
/// product with a single observation predicts its only known price.
///
/// # Errors
///
/// Returns a [`PredictError`] if the history has no series for the request,
/// the model weights a feature that was not encoded, or the de-scaled
/// output is not representable as a decimal price.
pub fn predict_price(
    model: &PriceModel,
    history: &PriceHistory,
    supermarket: &str,
    category: &str,
    product: &str,
    date: NaiveDate,
    currency: &'static Currency,
) -> Result<Prediction, PredictError> {
    let no_history = || PredictError::NoHistory {
        product: product.to_string(),
        supermarket: supermarket.to_string(),
        category: category.to_string(),
    };

    let series = history
        .series(product, supermarket, category)
        .ok_or_else(no_history)?;

    let features = encode_features(supermarket, category, date, series).ok_or_else(no_history)?;
    let stats = series.stats().ok_or_else(no_history)?;

    let raw_score = model.score(&features)?;
    let estimate = (raw_score * stats.std + stats.mean).max(0.01);

    let amount = Decimal::from_f64(estimate).ok_or(PredictError::UnrepresentablePrice)?;
    let price = Money::from_decimal(amount.round_dp(currency.exponent), currency);

    debug!("predicted {product} at {supermarket} on {date}: raw score {raw_score:.4}, {price}");

    Ok(Prediction {
        price,
        raw_score,
        date,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;
    use crate::history::{Observation, PriceBand, SeriesKey, Unit};

    fn date(year: i32, month: u32, day: u32) -> TestResult<NaiveDate> {
        Ok(NaiveDate::from_ymd_opt(year, month, day).ok_or("invalid date")?)
    }

    /// Three weekly milk prices: mean 2.00, sample deviation exactly 1.00.
    fn milk_history() -> TestResult<PriceHistory> {
        let mut history = PriceHistory::new();
        let key = SeriesKey::new("Milk", "Tesco", "dairy");

        for (day, price) in [(1, 1.0), (8, 2.0), (15, 3.0)] {
            history.insert(
                key.clone(),
                Observation {
                    date: date(2024, 1, day)?,
                    price,
                    unit_price: price,
                    unit: Unit::Litre,
                    own_brand: false,
                    band: PriceBand::Mid,
                },
            );
        }

        Ok(history)
    }

    fn weekend_model() -> TestResult<PriceModel> {
        let yaml = "\
intercept: 0.25
weights:
  - feature: is_weekend
    coefficient: 0.5
  - feature: supermarket_Tesco
    coefficient: 0.25
";

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.yml");
        std::fs::write(&path, yaml)?;

        Ok(load_model(&path)?)
    }

    #[test]
    fn de_scales_the_raw_score_against_the_series() -> TestResult {
        let history = milk_history()?;
        let model = weekend_model()?;

        // Saturday: raw = 0.25 + 0.5 + 0.25 = 1.0; price = 1.0 * 1.0 + 2.0.
        let prediction = predict_price(
            &model,
            &history,
            "Tesco",
            "dairy",
            "Milk",
            date(2024, 6, 15)?,
            iso::GBP,
        )?;

        assert_eq!(prediction.price, Money::from_minor(300, iso::GBP));
        assert!((prediction.raw_score - 1.0).abs() < 1e-12);
        assert_eq!(prediction.stats.count, 3);

        Ok(())
    }

    #[test]
    fn a_weekday_scores_lower_than_a_weekend() -> TestResult {
        let history = milk_history()?;
        let model = weekend_model()?;

        // Monday: raw = 0.25 + 0.25 = 0.5; price = 0.5 * 1.0 + 2.0.
        let prediction = predict_price(
            &model,
            &history,
            "Tesco",
            "dairy",
            "Milk",
            date(2024, 6, 17)?,
            iso::GBP,
        )?;

        assert_eq!(prediction.price, Money::from_minor(250, iso::GBP));

        Ok(())
    }

    #[test]
    fn predictions_never_fall_below_one_penny() -> TestResult {
        let history = milk_history()?;

        let yaml = "\
intercept: -10.0
weights:
  - feature: is_weekend
    coefficient: 0.0
";

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.yml");
        std::fs::write(&path, yaml)?;
        let model = load_model(&path)?;

        // raw = -10; de-scaled = -10 * 1.0 + 2.0 = -8, floored to 0.01.
        let prediction = predict_price(
            &model,
            &history,
            "Tesco",
            "dairy",
            "Milk",
            date(2024, 6, 15)?,
            iso::GBP,
        )?;

        assert_eq!(prediction.price, Money::from_minor(1, iso::GBP));

        Ok(())
    }

    #[test]
    fn a_single_observation_predicts_its_own_price() -> TestResult {
        let mut history = PriceHistory::new();

        history.insert(
            SeriesKey::new("Saffron", "Tesco", "pantry"),
            Observation {
                date: date(2024, 1, 1)?,
                price: 4.5,
                unit_price: 4.5,
                unit: Unit::Each,
                own_brand: false,
                band: PriceBand::High,
            },
        );

        let model = weekend_model()?;

        // Deviation is zero, so any raw score collapses to the mean.
        let prediction = predict_price(
            &model,
            &history,
            "Tesco",
            "pantry",
            "Saffron",
            date(2024, 6, 15)?,
            iso::GBP,
        )?;

        assert_eq!(prediction.price, Money::from_minor(450, iso::GBP));

        Ok(())
    }

    #[test]
    fn an_unknown_product_is_an_error() -> TestResult {
        let history = milk_history()?;
        let model = weekend_model()?;

        match predict_price(
            &model,
            &history,
            "Tesco",
            "dairy",
            "Caviar",
            date(2024, 6, 15)?,
            iso::GBP,
        ) {
            Err(PredictError::NoHistory { product, .. }) => assert_eq!(product, "Caviar"),
            other => panic!("expected a missing history error, got {other:?}"),
        }

        Ok(())
    }
}
