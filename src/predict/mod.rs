//! Brain-age prediction step.
//!
//! The regression model and the feature scaler are external capabilities:
//! this module only fixes their contracts. Feature vectors handed to a
//! [`ModelSupplier`] are in the scaler's feature order, already scaled.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub mod features;
pub mod model;

pub use features::{
    FeatureTable, load_feature_table, parse_feature_table, read_feature_table,
    rename_cols_to_roi_format,
};
pub use model::{LinearModel, StandardScaler, load_linear_model, load_standard_scaler};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("missing value at row {row}, column '{column}'")]
    MissingValue { row: usize, column: String },
    #[error("non-numeric value '{value}' at row {row}, column '{column}'")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },
    #[error("infinite value at row {row}, column '{column}'")]
    NonFinite { row: usize, column: String },
    #[error("feature table needs an ID column, an Age column and at least one feature column")]
    TooFewColumns,
    #[error("row {row} has {actual} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("malformed feature table: {0}")]
    Malformed(String),
    #[error("feature mismatch: {0}")]
    FeatureMismatch(String),
    #[error("model expects {expected} features, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("model produced a non-finite prediction")]
    NonFinitePrediction,
    #[error("prediction failed at row {row}: {reason}")]
    RowFailed { row: usize, reason: String },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Maps named raw features to model inputs.
pub trait FeatureScaler {
    fn feature_names(&self) -> &[String];
    fn transform(&self, names: &[String], rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PredictError>;
}

/// Pretrained regression model predicting brain age.
pub trait ModelSupplier {
    fn name(&self) -> &str;
    fn n_features(&self) -> usize;
    fn predict_row(&self, features: &[f64]) -> Result<f64, PredictError>;

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        rows.iter().map(|r| self.predict_row(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "BrainAge")]
    pub brain_age: f64,
    #[serde(rename = "BrainPAD")]
    pub brain_pad: f64,
}

/// Scales features (retrying once with ROI-style column names), predicts in
/// batch and falls back to row-by-row prediction when the batch fails.
pub fn predict_brain_age(
    table: &FeatureTable,
    scaler: &dyn FeatureScaler,
    model: &dyn ModelSupplier,
) -> Result<Vec<PredictionRow>, PredictError> {
    let scaled = match scaler.transform(&table.feature_names, &table.rows) {
        Ok(scaled) => scaled,
        Err(first @ PredictError::FeatureMismatch(_)) => {
            warn!(
                error = %first,
                "scaler failed, retrying with ROI-format column names"
            );
            let renamed = rename_cols_to_roi_format(&table.feature_names);
            let scaled = scaler.transform(&renamed, &table.rows).map_err(|e| {
                PredictError::FeatureMismatch(format!(
                    "scaler could not be applied after renaming columns ({first}; then {e})"
                ))
            })?;
            info!("scaler transformation succeeded after renaming");
            scaled
        }
        Err(e) => return Err(e),
    };

    let outputs = match model.predict_batch(&scaled) {
        Ok(outputs) => outputs,
        Err(e) => {
            warn!(
                model = model.name(),
                error = %e,
                "batch prediction failed, predicting row by row"
            );
            let mut outputs = Vec::with_capacity(scaled.len());
            for (row, features) in scaled.iter().enumerate() {
                let y = model.predict_row(features).map_err(|e| PredictError::RowFailed {
                    row,
                    reason: e.to_string(),
                })?;
                outputs.push(y);
            }
            outputs
        }
    };
    info!(rows = outputs.len(), "prediction finished");

    Ok(table
        .ids
        .iter()
        .zip(&table.ages)
        .zip(outputs)
        .map(|((id, &age), brain_age)| PredictionRow {
            id: id.clone(),
            age,
            brain_age,
            brain_pad: brain_age - age,
        })
        .collect())
}

pub fn write_predictions(path: &Path, rows: &[PredictionRow]) -> Result<()> {
    use std::io::Write;

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = std::io::BufWriter::new(file);
    writeln!(w, "ID\tAge\tBrainAge\tBrainPAD")?;
    for r in rows {
        writeln!(
            w,
            "{}\t{:.6}\t{:.6}\t{:.6}",
            r.id, r.age, r.brain_age, r.brain_pad
        )?;
    }
    w.flush()?;
    Ok(())
}
