use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cohort::loader::{delimiter_for, unquote};
use crate::io::{delimited_reader, open_maybe_gz};
use crate::predict::PredictError;

/// Subject features: column 0 is the ID, column 1 the chronological age,
/// the remaining columns are model features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub ids: Vec<String>,
    pub ages: Vec<f64>,
    pub age_column: String,
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn load_feature_table(path: &Path) -> Result<FeatureTable> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open feature table {}", path.display()))?;
    let table = read_feature_table(reader, delimiter_for(path))
        .with_context(|| format!("invalid feature table {}", path.display()))?;
    Ok(table)
}

pub fn parse_feature_table(content: &str, delimiter: u8) -> Result<FeatureTable, PredictError> {
    read_feature_table(content.as_bytes(), delimiter)
}

/// Row numbers in errors are 0-based data rows (header excluded).
pub fn read_feature_table<R: Read>(reader: R, delimiter: u8) -> Result<FeatureTable, PredictError> {
    let mut rdr = delimited_reader(reader, delimiter);
    let header: Vec<String> = rdr
        .headers()
        .map_err(|e| PredictError::Malformed(format!("header: {e}")))?
        .iter()
        .map(|h| unquote(h.trim_start_matches('\u{feff}')).into_owned())
        .collect();
    if header.len() < 3 {
        return Err(PredictError::TooFewColumns);
    }

    let mut ids = Vec::new();
    let mut ages = Vec::new();
    let mut rows = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| PredictError::Malformed(format!("row {row}: {e}")))?;
        if record.len() != header.len() {
            return Err(PredictError::RaggedRow {
                row,
                expected: header.len(),
                actual: record.len(),
            });
        }
        ids.push(unquote(&record[0]).into_owned());
        ages.push(parse_value(&record[1], row, &header[1])?);
        let values = record
            .iter()
            .skip(2)
            .zip(&header[2..])
            .map(|(raw, column)| parse_value(raw, row, column))
            .collect::<Result<Vec<f64>, PredictError>>()?;
        rows.push(values);
    }

    Ok(FeatureTable {
        ids,
        ages,
        age_column: header[1].clone(),
        feature_names: header[2..].to_vec(),
        rows,
    })
}

fn parse_value(raw: &str, row: usize, column: &str) -> Result<f64, PredictError> {
    let cell = unquote(raw);
    let t: &str = &cell;
    if t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("na") {
        return Err(PredictError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    let v: f64 = t.parse().map_err(|_| PredictError::NonNumeric {
        row,
        column: column.to_string(),
        value: t.to_string(),
    })?;
    if v.is_infinite() {
        return Err(PredictError::NonFinite {
            row,
            column: column.to_string(),
        });
    }
    Ok(v)
}

/// FreeSurfer ROI naming used by the published scaler.
pub fn rename_cols_to_roi_format(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let mut n = name.replace("_and_", "&");
            if !n.contains("Thalamus-Proper") {
                n = n
                    .replace("Left-Thalamus", "Left-Thalamus-Proper")
                    .replace("Right-Thalamus", "Right-Thalamus-Proper");
            }
            n
        })
        .collect()
}
