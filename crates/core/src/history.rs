//! Price History
//!
//! Captured shelf-price observations, one series per product, supermarket
//! and category, loaded from CSV and kept in date order. The price
//! predictor draws its reference features and scaling statistics from here.

use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// History Error
#[derive(Debug, Error)]
pub enum HistoryError {
    /// IO error reading the file
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Malformed CSV
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A record's price is negative or not a finite number
    #[error("invalid price for {product} on {date}")]
    InvalidPrice {
        /// Product the record belongs to
        product: String,

        /// Capture date of the record
        date: NaiveDate,
    },
}

/// The unit a product is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Kilograms
    Kg,

    /// Litres
    Litre,

    /// Sold per item
    Each,
}

impl Unit {
    /// Resolves a unit label as it appears in the captured data. Anything
    /// unrecognised counts as sold per item.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "kg" => Self::Kg,
            "l" => Self::Litre,
            _ => Self::Each,
        }
    }

    /// The label used in the captured data.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Litre => "l",
            Self::Each => "unit",
        }
    }

    /// The numeric code the regression model was trained with.
    #[must_use]
    pub fn encoded(self) -> f64 {
        match self {
            Self::Kg => 0.0,
            Self::Litre => 1.0,
            Self::Each => 2.0,
        }
    }
}

/// How the captured data bucketed a product's price level.
///
/// The source data labels the buckets in Turkish: `Ucuz` (cheap), `Orta`
/// (mid) and `Pahalı` (dear).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
    /// Cheap
    Low,

    /// Mid-range
    Mid,

    /// Dear
    High,
}

impl PriceBand {
    /// Resolves a price band label as it appears in the captured data.
    /// Anything unrecognised counts as mid-range.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Ucuz" => Self::Low,
            "Pahalı" => Self::High,
            _ => Self::Mid,
        }
    }

    /// The numeric code the regression model was trained with.
    #[must_use]
    pub fn encoded(self) -> f64 {
        match self {
            Self::Low => 2.0,
            Self::Mid => 0.0,
            Self::High => 1.0,
        }
    }
}

/// One captured shelf-price observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Date the price was captured
    pub date: NaiveDate,

    /// Shelf price in pounds
    pub price: f64,

    /// Price per unit of measure in pounds
    pub unit_price: f64,

    /// Unit the product is measured in
    pub unit: Unit,

    /// Whether the product is the supermarket's own brand
    pub own_brand: bool,

    /// Price band the captured data put the product in
    pub band: PriceBand,
}

/// Summary statistics over a series' prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    /// Number of observations
    pub count: usize,

    /// Mean price
    pub mean: f64,

    /// Sample standard deviation, zero for a single observation
    pub std: f64,

    /// Lowest price
    pub min: f64,

    /// Highest price
    pub max: f64,
}

/// Identifies one price series: a product at a supermarket within a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Product name
    pub product: String,

    /// Supermarket name
    pub supermarket: String,

    /// Category name
    pub category: String,
}

impl SeriesKey {
    /// Creates a series key.
    pub fn new(
        product: impl Into<String>,
        supermarket: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            supermarket: supermarket.into(),
            category: category.into(),
        }
    }
}

/// The price history of one series, kept in capture-date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSeries {
    observations: Vec<Observation>,
}

impl ProductSeries {
    fn insert(&mut self, observation: Observation) {
        let at = self
            .observations
            .partition_point(|existing| existing.date <= observation.date);

        self.observations.insert(at, observation);
    }

    /// The observations, oldest first.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// The most recent observation.
    #[must_use]
    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Summary statistics over the series' prices, or `None` for an empty
    /// series.
    #[must_use]
    pub fn stats(&self) -> Option<PriceStats> {
        let first = self.observations.first()?;

        let count = self.observations.len();
        let mut sum = 0.0;
        let mut min = first.price;
        let mut max = first.price;

        for observation in &self.observations {
            sum += observation.price;
            min = min.min(observation.price);
            max = max.max(observation.price);
        }

        let mean = sum / as_f64(count);

        let std = if count < 2 {
            0.0
        } else {
            let mut squares = 0.0;

            for observation in &self.observations {
                let delta = observation.price - mean;
                squares += delta * delta;
            }

            (squares / (as_f64(count) - 1.0)).sqrt()
        };

        Some(PriceStats {
            count,
            mean,
            std,
            min,
            max,
        })
    }

    /// Mean price per unit of measure, or `None` for an empty series.
    #[must_use]
    pub fn mean_unit_price(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }

        let sum: f64 = self.observations.iter().map(|o| o.unit_price).sum();

        Some(sum / as_f64(self.observations.len()))
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Observation counts are tiny relative to f64 precision"
)]
fn as_f64(count: usize) -> f64 {
    count as f64
}

/// Every captured price series, indexed by product, supermarket and
/// category.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    series: FxHashMap<SeriesKey, ProductSeries>,
    keys: Vec<SeriesKey>,
}

impl PriceHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observation to its series, creating the series on first
    /// sight.
    pub fn insert(&mut self, key: SeriesKey, observation: Observation) {
        match self.series.get_mut(&key) {
            Some(series) => series.insert(observation),
            None => {
                let mut series = ProductSeries::default();
                series.insert(observation);

                self.keys.push(key.clone());
                self.series.insert(key, series);
            }
        }
    }

    /// Looks up the series for a product at a supermarket within a category.
    #[must_use]
    pub fn series(&self, product: &str, supermarket: &str, category: &str) -> Option<&ProductSeries> {
        self.series
            .get(&SeriesKey::new(product, supermarket, category))
    }

    /// Iterates over the series keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.keys.iter()
    }

    /// The supermarkets appearing in the history, sorted and de-duplicated.
    #[must_use]
    pub fn supermarkets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys.iter().map(|key| key.supermarket.as_str()).collect();

        names.sort_unstable();
        names.dedup();

        names
    }

    /// The categories a supermarket has products in, sorted and
    /// de-duplicated.
    #[must_use]
    pub fn categories(&self, supermarket: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .keys
            .iter()
            .filter(|key| key.supermarket == supermarket)
            .map(|key| key.category.as_str())
            .collect();

        names.sort_unstable();
        names.dedup();

        names
    }

    /// The products a supermarket stocks in a category, sorted and
    /// de-duplicated.
    #[must_use]
    pub fn products(&self, supermarket: &str, category: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .keys
            .iter()
            .filter(|key| key.supermarket == supermarket && key.category == category)
            .map(|key| key.product.as_str())
            .collect();

        names.sort_unstable();
        names.dedup();

        names
    }

    /// Returns the number of series.
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Returns the number of observations across every series.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.series.values().map(ProductSeries::len).sum()
    }

    /// Returns `true` if the history has no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The oldest and newest capture dates across every series.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut range: Option<(NaiveDate, NaiveDate)> = None;

        for series in self.series.values() {
            let (Some(first), Some(last)) = (series.observations.first(), series.latest()) else {
                continue;
            };

            range = Some(match range {
                Some((oldest, newest)) => (oldest.min(first.date), newest.max(last.date)),
                None => (first.date, last.date),
            });
        }

        range
    }
}

/// One row of the captured price history CSV.
#[derive(Debug, Deserialize)]
struct HistoryRecord {
    product_name: String,
    supermarket_name: String,
    category_name: String,
    capture_date: NaiveDate,
    price_gbp: f64,
    price_unit_gbp: f64,
    unit: String,
    #[serde(default)]
    is_own_brand: u8,
    #[serde(default)]
    price_category: Option<String>,
}

/// Loads a price history from a CSV file.
///
/// Expected columns: `product_name`, `supermarket_name`, `category_name`,
/// `capture_date` (ISO 8601), `price_gbp`, `price_unit_gbp` and `unit`,
/// optionally `is_own_brand` and `price_category`.
///
/// # Errors
///
/// Returns a [`HistoryError`] if the file cannot be read, the CSV is
/// malformed, or a price is negative or not finite.
pub fn load_history(path: impl AsRef<Path>) -> Result<PriceHistory, HistoryError> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let mut history = PriceHistory::new();

    for result in reader.deserialize() {
        let record: HistoryRecord = result?;

        if !is_valid_price(record.price_gbp) || !is_valid_price(record.price_unit_gbp) {
            return Err(HistoryError::InvalidPrice {
                product: record.product_name,
                date: record.capture_date,
            });
        }

        let observation = Observation {
            date: record.capture_date,
            price: record.price_gbp,
            unit_price: record.price_unit_gbp,
            unit: Unit::from_label(&record.unit),
            own_brand: record.is_own_brand != 0,
            band: record
                .price_category
                .as_deref()
                .map_or(PriceBand::Mid, PriceBand::from_label),
        };

        let key = SeriesKey::new(
            record.product_name,
            record.supermarket_name,
            record.category_name,
        );

        history.insert(key, observation);
    }

    info!(
        "loaded price history: {} series, {} observations",
        history.series_count(),
        history.observation_count()
    );

    Ok(history)
}

fn is_valid_price(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use std::fs;

    use testresult::TestResult;

    use super::*;

    const HISTORY_CSV: &str = "\
product_name,supermarket_name,category_name,capture_date,price_gbp,price_unit_gbp,unit,is_own_brand,price_category
Semi Skimmed Milk 2L,Tesco,dairy,2024-01-05,1.45,0.73,l,1,Ucuz
Semi Skimmed Milk 2L,Tesco,dairy,2024-01-19,1.55,0.78,l,1,Ucuz
White Bread 800g,ASDA,bakery,2024-01-12,0.98,1.23,kg,0,Orta
";

    fn date(year: i32, month: u32, day: u32) -> TestResult<NaiveDate> {
        Ok(NaiveDate::from_ymd_opt(year, month, day).ok_or("invalid date")?)
    }

    fn observation(date: NaiveDate, price: f64) -> Observation {
        Observation {
            date,
            price,
            unit_price: price,
            unit: Unit::Each,
            own_brand: false,
            band: PriceBand::Mid,
        }
    }

    #[test]
    fn resolves_unit_labels() {
        assert_eq!(Unit::from_label("kg"), Unit::Kg);
        assert_eq!(Unit::from_label("l"), Unit::Litre);
        assert_eq!(Unit::from_label("bunch"), Unit::Each);
    }

    #[test]
    fn resolves_price_band_labels() {
        assert_eq!(PriceBand::from_label("Ucuz"), PriceBand::Low);
        assert_eq!(PriceBand::from_label("Pahalı"), PriceBand::High);
        assert_eq!(PriceBand::from_label("Orta"), PriceBand::Mid);
        assert_eq!(PriceBand::from_label("mystery"), PriceBand::Mid);
    }

    #[test]
    fn series_keeps_observations_in_date_order() -> TestResult {
        let mut history = PriceHistory::new();
        let key = SeriesKey::new("Milk", "Tesco", "dairy");

        history.insert(key.clone(), observation(date(2024, 2, 1)?, 1.50));
        history.insert(key.clone(), observation(date(2024, 1, 1)?, 1.40));
        history.insert(key, observation(date(2024, 3, 1)?, 1.60));

        let series = history.series("Milk", "Tesco", "dairy").ok_or("missing series")?;
        let dates: Vec<NaiveDate> = series.observations().iter().map(|o| o.date).collect();

        assert_eq!(dates, vec![date(2024, 1, 1)?, date(2024, 2, 1)?, date(2024, 3, 1)?]);
        assert_eq!(series.latest().map(|o| o.price), Some(1.60));

        Ok(())
    }

    #[test]
    fn stats_cover_mean_std_min_and_max() -> TestResult {
        let mut history = PriceHistory::new();
        let key = SeriesKey::new("Milk", "Tesco", "dairy");

        history.insert(key.clone(), observation(date(2024, 1, 1)?, 2.0));
        history.insert(key, observation(date(2024, 1, 8)?, 4.0));

        let series = history.series("Milk", "Tesco", "dairy").ok_or("missing series")?;
        let stats = series.stats().ok_or("missing stats")?;

        assert_eq!(stats.count, 2);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.std - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((stats.min - 2.0).abs() < 1e-12);
        assert!((stats.max - 4.0).abs() < 1e-12);

        Ok(())
    }

    #[test]
    fn a_single_observation_has_zero_deviation() -> TestResult {
        let mut history = PriceHistory::new();

        history.insert(
            SeriesKey::new("Milk", "Tesco", "dairy"),
            observation(date(2024, 1, 1)?, 1.50),
        );

        let series = history.series("Milk", "Tesco", "dairy").ok_or("missing series")?;
        let stats = series.stats().ok_or("missing stats")?;

        assert_eq!(stats.count, 1);
        assert!((stats.std - 0.0).abs() < 1e-12);

        Ok(())
    }

    #[test]
    fn loads_a_history_from_csv() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history.csv");
        fs::write(&path, HISTORY_CSV)?;

        let history = load_history(&path)?;

        assert_eq!(history.series_count(), 2);
        assert_eq!(history.observation_count(), 3);
        assert_eq!(history.supermarkets(), vec!["ASDA", "Tesco"]);
        assert_eq!(history.categories("Tesco"), vec!["dairy"]);
        assert_eq!(history.products("Tesco", "dairy"), vec!["Semi Skimmed Milk 2L"]);

        let series = history
            .series("Semi Skimmed Milk 2L", "Tesco", "dairy")
            .ok_or("missing series")?;
        let latest = series.latest().ok_or("missing latest observation")?;

        assert_eq!(latest.date, date(2024, 1, 19)?);
        assert_eq!(latest.unit, Unit::Litre);
        assert_eq!(latest.band, PriceBand::Low);
        assert!(latest.own_brand);

        assert_eq!(history.date_range(), Some((date(2024, 1, 5)?, date(2024, 1, 19)?)));

        Ok(())
    }

    #[test]
    fn rejects_negative_prices() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history.csv");
        fs::write(
            &path,
            "product_name,supermarket_name,category_name,capture_date,price_gbp,price_unit_gbp,unit\n\
             Milk,Tesco,dairy,2024-01-05,-1.45,0.73,l\n",
        )?;

        match load_history(&path) {
            Err(HistoryError::InvalidPrice { product, .. }) => assert_eq!(product, "Milk"),
            other => panic!("expected an invalid price error, got {other:?}"),
        }

        Ok(())
    }
}
