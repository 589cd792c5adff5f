//! Integration test for price prediction over the UK fixture set.
//!
//! The Sainsbury's milk series (`fixtures/history/uk.csv`) holds three
//! observations, £1.50, £1.55 and £1.60, so its mean is £1.55 and its
//! sample deviation is exactly 0.05. Unit prices 0.77, 0.772 and 0.78
//! average 0.774, making `price_to_unit_ratio` = 1.55 / 0.775 = 2.0.
//!
//! Scoring 15 June 2024 (a Saturday, ISO week 24, summer) against
//! `fixtures/models/uk.yml`, the non-zero terms are:
//!
//! | feature                | value | coefficient | term   |
//! |------------------------|-------|-------------|--------|
//! | intercept              |       |             | -0.2   |
//! | month                  | 6     |  0.01       |  0.06  |
//! | day                    | 15    |  0.001      |  0.015 |
//! | day_of_week            | 5     |  0.01       |  0.05  |
//! | week                   | 24    |  0.005      |  0.12  |
//! | is_weekend             | 1     |  0.15       |  0.15  |
//! | season_encoded         | 2     |  0.025      |  0.05  |
//! | price_unit_gbp         | 0.78  |  0.5        |  0.39  |
//! | unit_encoded           | 1     | -0.1        | -0.1   |
//! | price_category_encoded | 2     | -0.15       | -0.3   |
//! | is_own_brand           | 1     | -0.2        | -0.2   |
//! | price_to_unit_ratio    | 2.0   |  0.1        |  0.2   |
//! | supermarket_Sains      | 1     |  0.05       |  0.05  |
//! | category_dairy         | 1     | -0.02       | -0.02  |
//!
//! Raw score 0.265; de-scaled price 0.265 × 0.05 + 1.55 = £1.56325,
//! which rounds to £1.56.

use chrono::NaiveDate;
use rusty_money::{Money, iso};
use testresult::TestResult;

use trolley::{
    fixtures::Fixture,
    predict::{PredictError, predict_price},
};

fn date(year: i32, month: u32, day: u32) -> TestResult<NaiveDate> {
    Ok(NaiveDate::from_ymd_opt(year, month, day).ok_or("invalid date")?)
}

#[test]
fn test_predicts_sainsburys_milk_for_a_summer_saturday() -> TestResult {
    let fixture = Fixture::from_set("uk")?;

    let prediction = predict_price(
        fixture.model()?,
        fixture.history()?,
        "Sainsbury's",
        "dairy",
        "Semi Skimmed Milk 2L",
        date(2024, 6, 15)?,
        iso::GBP,
    )?;

    assert_eq!(prediction.price, Money::from_minor(156, iso::GBP));
    assert!(
        (prediction.raw_score - 0.265).abs() < 1e-9,
        "raw score was {}",
        prediction.raw_score
    );

    assert_eq!(prediction.stats.count, 3);
    assert!((prediction.stats.mean - 1.55).abs() < 1e-9);
    assert!((prediction.stats.std - 0.05).abs() < 1e-9);
    assert!((prediction.stats.min - 1.50).abs() < 1e-9);
    assert!((prediction.stats.max - 1.60).abs() < 1e-9);

    Ok(())
}

/// A single-observation series has zero deviation, so whatever the model
/// scores, the prediction collapses to the one captured price.
#[test]
fn test_single_observation_predicts_the_known_price() -> TestResult {
    let fixture = Fixture::from_set("uk")?;

    let prediction = predict_price(
        fixture.model()?,
        fixture.history()?,
        "Tesco",
        "health_products",
        "Vitamin C 200mg",
        date(2024, 7, 1)?,
        iso::GBP,
    )?;

    assert_eq!(prediction.price, Money::from_minor(450, iso::GBP));
    assert_eq!(prediction.stats.count, 1);

    Ok(())
}

/// The model weights `is_weekend` at 0.15 and `day_of_week` at 0.01, so
/// moving the same request from Saturday the 15th back to Friday the 14th
/// drops the raw score by 0.15 + 0.01 + 0.001 (one day less) = 0.161.
#[test]
fn test_weekend_scores_above_the_preceding_friday() -> TestResult {
    let fixture = Fixture::from_set("uk")?;

    let saturday = predict_price(
        fixture.model()?,
        fixture.history()?,
        "Sainsbury's",
        "dairy",
        "Semi Skimmed Milk 2L",
        date(2024, 6, 15)?,
        iso::GBP,
    )?;

    let friday = predict_price(
        fixture.model()?,
        fixture.history()?,
        "Sainsbury's",
        "dairy",
        "Semi Skimmed Milk 2L",
        date(2024, 6, 14)?,
        iso::GBP,
    )?;

    let gap = saturday.raw_score - friday.raw_score;
    assert!((gap - 0.161).abs() < 1e-9, "gap was {gap}");

    Ok(())
}

#[test]
fn test_an_uncaptured_product_is_an_error() -> TestResult {
    let fixture = Fixture::from_set("uk")?;

    let result = predict_price(
        fixture.model()?,
        fixture.history()?,
        "Tesco",
        "dairy",
        "Oat Milk 1L",
        date(2024, 6, 15)?,
        iso::GBP,
    );

    assert!(matches!(result, Err(PredictError::NoHistory { .. })));

    Ok(())
}

#[test]
fn test_catalog_queries_over_the_history() -> TestResult {
    let fixture = Fixture::from_set("uk")?;
    let history = fixture.history()?;

    assert_eq!(history.supermarkets(), ["Aldi", "Sainsbury's", "Tesco"]);
    assert_eq!(
        history.categories("Tesco"),
        ["bakery", "dairy", "health_products"]
    );
    assert_eq!(history.products("Aldi", "bakery"), ["White Bread 800g"]);

    assert_eq!(
        history.date_range(),
        Some((date(2024, 1, 5)?, date(2024, 3, 12)?))
    );

    Ok(())
}
