//! Price Model
//!
//! A linear model trained offline and exported to YAML: an intercept plus
//! one coefficient per named feature, kept in the trained column order.

use std::{fs, io, path::Path};

use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::predict::{FeatureVector, PredictError};

/// Model Parsing Errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// IO error reading the model file
    #[error("Failed to read model file: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The same feature is weighted twice
    #[error("Duplicate feature in model file: {0}")]
    DuplicateFeature(String),

    /// The model weights nothing
    #[error("Model file has no feature weights")]
    EmptyModel,
}

/// One weighted feature column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureWeight {
    /// Feature name as the model was trained on it
    pub feature: String,

    /// Trained coefficient
    pub coefficient: f64,
}

/// Raw YAML shape of a model file.
#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default)]
    name: Option<String>,
    intercept: f64,
    weights: Vec<FeatureWeight>,
}

/// A validated, ready-to-score price model.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceModel {
    name: Option<String>,
    intercept: f64,
    weights: Vec<FeatureWeight>,
}

impl PriceModel {
    /// The model's name, if the file carried one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The trained intercept.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// The weighted features in trained column order.
    #[must_use]
    pub fn weights(&self) -> &[FeatureWeight] {
        &self.weights
    }

    /// Returns the number of weighted features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Scores a feature vector: the intercept plus the weighted sum of the
    /// model's features, in trained column order.
    ///
    /// # Errors
    ///
    /// Returns a [`PredictError::MissingFeature`] error if the model weights
    /// a feature the vector does not supply and that is not a one-hot
    /// column.
    pub fn score(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let mut total = self.intercept;

        for weight in &self.weights {
            total += weight.coefficient * features.lookup(&weight.feature)?;
        }

        Ok(total)
    }
}

impl TryFrom<ModelFile> for PriceModel {
    type Error = ModelError;

    fn try_from(file: ModelFile) -> Result<Self, Self::Error> {
        if file.weights.is_empty() {
            return Err(ModelError::EmptyModel);
        }

        let mut seen = FxHashSet::default();

        for weight in &file.weights {
            if !seen.insert(weight.feature.as_str()) {
                return Err(ModelError::DuplicateFeature(weight.feature.clone()));
            }
        }

        Ok(Self {
            name: file.name,
            intercept: file.intercept,
            weights: file.weights,
        })
    }
}

/// Loads a price model from a YAML file.
///
/// # Errors
///
/// Returns a [`ModelError`] if the file cannot be read or parsed, weights a
/// feature twice, or weights nothing at all.
pub fn load_model(path: impl AsRef<Path>) -> Result<PriceModel, ModelError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let file: ModelFile = serde_norway::from_str(&contents)?;
    let model = PriceModel::try_from(file)?;

    info!("loaded price model: {} features", model.feature_count());

    Ok(model)
}
