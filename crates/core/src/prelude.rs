//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::Basket,
    comparison::{Comparison, ReportError},
    fixtures::{Fixture, FixtureError},
    history::{
        HistoryError, Observation, PriceBand, PriceHistory, PriceStats, ProductSeries, SeriesKey,
        Unit, load_history,
    },
    loader::{LoadError, MatrixCache, load_price_matrix},
    markets::{Market, MarketKey},
    matrix::{MatrixError, PriceMatrix},
    optimize::{MarketTotal, OptimizeError, ParsePenaltyMethodError, PenaltyMethod, optimize},
    predict::{
        DateFeatures, FeatureVector, FeatureWeight, ModelError, PredictError, Prediction,
        PriceModel, encode_features, load_model, predict_price, supermarket_token,
    },
    prices::{Price, PriceError, currency_from_code, parse_price},
    products::{Product, ProductKey},
};
