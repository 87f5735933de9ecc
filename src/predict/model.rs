use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::predict::{FeatureScaler, ModelSupplier, PredictError};

/// Per-feature standardization `(x - mean) / scale`, keyed by feature name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self, PredictError> {
        let s = Self {
            feature_names,
            mean,
            scale,
        };
        s.validate()?;
        Ok(s)
    }

    fn validate(&self) -> Result<(), PredictError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(PredictError::InvalidParameters(
                "scaler has no features".to_string(),
            ));
        }
        if self.mean.len() != n || self.scale.len() != n {
            return Err(PredictError::InvalidParameters(format!(
                "scaler has {} names, {} means, {} scales",
                n,
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(PredictError::InvalidParameters(
                "scaler parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Columns are matched by name and emitted in the scaler's order.
    fn transform(&self, names: &[String], rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PredictError> {
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let missing: Vec<&str> = self
            .feature_names
            .iter()
            .filter(|n| !index.contains_key(n.as_str()))
            .map(|n| n.as_str())
            .collect();
        let unexpected: Vec<&str> = names
            .iter()
            .filter(|n| !self.feature_names.contains(n))
            .map(|n| n.as_str())
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(PredictError::FeatureMismatch(format!(
                "{} missing (first: {}), {} unexpected (first: {})",
                missing.len(),
                missing.first().copied().unwrap_or("-"),
                unexpected.len(),
                unexpected.first().copied().unwrap_or("-")
            )));
        }

        let order: Vec<usize> = self
            .feature_names
            .iter()
            .filter_map(|n| index.get(n.as_str()).copied())
            .collect();
        rows.iter()
            .enumerate()
            .map(|(row, values)| {
                if values.len() != names.len() {
                    return Err(PredictError::RowFailed {
                        row,
                        reason: format!("{} values for {} columns", values.len(), names.len()),
                    });
                }
                Ok(order
                    .iter()
                    .enumerate()
                    .map(|(k, &src)| {
                        let scale = if self.scale[k] == 0.0 { 1.0 } else { self.scale[k] };
                        (values[src] - self.mean[k]) / scale
                    })
                    .collect())
            })
            .collect()
    }
}

/// Linear regression supplier: `intercept + coefficients . x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

fn default_model_name() -> String {
    "linear".to_string()
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            name: default_model_name(),
            intercept,
            coefficients,
        }
    }
}

impl ModelSupplier for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictError::WidthMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        let y = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        if !y.is_finite() {
            return Err(PredictError::NonFinitePrediction);
        }
        Ok(y)
    }
}

pub fn load_standard_scaler(path: &Path) -> Result<StandardScaler> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read scaler {}", path.display()))?;
    let scaler: StandardScaler = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse scaler {}", path.display()))?;
    scaler
        .validate()
        .with_context(|| format!("invalid scaler {}", path.display()))?;
    Ok(scaler)
}

pub fn load_linear_model(path: &Path) -> Result<LinearModel> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read model {}", path.display()))?;
    let model: LinearModel = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse model {}", path.display()))?;
    if model.coefficients.is_empty() {
        anyhow::bail!("model {} has no coefficients", path.display());
    }
    Ok(model)
}
