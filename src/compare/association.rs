use std::collections::BTreeSet;

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::compare::CompareError;
use crate::compare::parametric::two_sided_t_p;
use crate::math::stats::{mean, sum_of_squares};

/// Two-way frequency table with labeled rows and columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub counts: Vec<Vec<f64>>,
}

impl ContingencyTable {
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        counts: Vec<Vec<f64>>,
    ) -> Result<Self, CompareError> {
        if counts.len() != row_labels.len() {
            return Err(CompareError::InvalidInput(format!(
                "{} count rows for {} row labels",
                counts.len(),
                row_labels.len()
            )));
        }
        for (label, row) in row_labels.iter().zip(&counts) {
            if row.len() != col_labels.len() {
                return Err(CompareError::InvalidInput(format!(
                    "row '{}' has {} counts for {} columns",
                    label,
                    row.len(),
                    col_labels.len()
                )));
            }
            if row.iter().any(|c| !c.is_finite() || *c < 0.0) {
                return Err(CompareError::InvalidInput(format!(
                    "row '{}' has a negative or non-finite count",
                    label
                )));
            }
        }
        Ok(Self {
            row_labels,
            col_labels,
            counts,
        })
    }

    /// Cross-tabulates (row, column) observations; labels are sorted.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let rows: BTreeSet<&str> = pairs.iter().map(|(r, _)| *r).collect();
        let cols: BTreeSet<&str> = pairs.iter().map(|(_, c)| *c).collect();
        let row_labels: Vec<String> = rows.iter().map(|s| s.to_string()).collect();
        let col_labels: Vec<String> = cols.iter().map(|s| s.to_string()).collect();

        let mut counts = vec![vec![0.0; col_labels.len()]; row_labels.len()];
        for (r, c) in pairs {
            let i = rows.iter().position(|x| *x == r).unwrap_or_default();
            let j = cols.iter().position(|x| *x == c).unwrap_or_default();
            counts[i][j] += 1.0;
        }
        Self {
            row_labels,
            col_labels,
            counts,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyResult {
    pub statistic: f64,
    pub dof: usize,
    pub p_value: f64,
    pub yates_corrected: bool,
    pub cramers_v: f64,
    pub expected: Vec<Vec<f64>>,
}

/// Pearson chi-square test of independence; Yates-corrected for 2x2.
pub fn chi2_contingency(table: &ContingencyTable) -> Result<ContingencyResult, CompareError> {
    let r = table.n_rows();
    let c = table.n_cols();
    if r < 2 || c < 2 {
        return Err(CompareError::DegenerateTable(format!(
            "need at least 2 rows and 2 columns, got {r}x{c}"
        )));
    }
    let row_sums: Vec<f64> = table.counts.iter().map(|row| row.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..c)
        .map(|j| table.counts.iter().map(|row| row[j]).sum())
        .collect();
    let total: f64 = row_sums.iter().sum();
    if let Some(i) = row_sums.iter().position(|s| *s == 0.0) {
        return Err(CompareError::DegenerateTable(format!(
            "row '{}' has no observations",
            table.row_labels[i]
        )));
    }
    if let Some(j) = col_sums.iter().position(|s| *s == 0.0) {
        return Err(CompareError::DegenerateTable(format!(
            "column '{}' has no observations",
            table.col_labels[j]
        )));
    }

    let dof = (r - 1) * (c - 1);
    let yates = dof == 1;
    let mut expected = vec![vec![0.0; c]; r];
    let mut statistic = 0.0;
    let mut uncorrected = 0.0;
    for i in 0..r {
        for j in 0..c {
            let e = row_sums[i] * col_sums[j] / total;
            expected[i][j] = e;
            let diff = table.counts[i][j] - e;
            uncorrected += diff * diff / e;
            let adj = if yates {
                let d = diff.abs();
                d - d.min(0.5)
            } else {
                diff.abs()
            };
            statistic += adj * adj / e;
        }
    }

    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| CompareError::Distribution(format!("chi-square (dof={dof}): {e}")))?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);
    let k = (r.min(c) - 1) as f64;
    let cramers_v = (uncorrected / (total * k)).sqrt();

    Ok(ContingencyResult {
        statistic,
        dof,
        p_value,
        yates_corrected: yates,
        cramers_v,
        expected,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OlsFit {
    pub n: usize,
    pub intercept: f64,
    pub slope: f64,
    pub slope_se: f64,
    pub slope_t: f64,
    pub slope_p_value: f64,
    pub r_squared: f64,
}

/// Ordinary least squares of `y` on `x` with intercept.
pub fn ols_fit(x: &[f64], y: &[f64]) -> Result<OlsFit, CompareError> {
    if x.len() != y.len() {
        return Err(CompareError::InvalidInput(format!(
            "predictor has {} values, outcome has {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 3 {
        return Err(CompareError::InsufficientSample {
            label: "regression pairs".to_string(),
            actual: n,
            required: 3,
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(CompareError::InvalidInput(
            "regression input contains non-finite values".to_string(),
        ));
    }
    let mx = mean(x).unwrap_or_default();
    let my = mean(y).unwrap_or_default();
    let sxx = sum_of_squares(x, mx);
    let syy = sum_of_squares(y, my);
    if !(sxx > 0.0) {
        return Err(CompareError::ZeroVariance(
            "predictor is constant".to_string(),
        ));
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| {
            let r = b - intercept - slope * a;
            r * r
        })
        .sum();
    let df = (n - 2) as f64;
    let slope_se = (sse / df / sxx).sqrt();
    let r_squared = if syy > 0.0 { 1.0 - sse / syy } else { 0.0 };

    let (slope_t, slope_p_value) = if slope_se > 0.0 {
        let t = slope / slope_se;
        (t, two_sided_t_p(t, df)?)
    } else {
        // Perfect fit.
        let t = if slope == 0.0 { 0.0 } else { f64::INFINITY.copysign(slope) };
        (t, if slope == 0.0 { 1.0 } else { 0.0 })
    };

    Ok(OlsFit {
        n,
        intercept,
        slope,
        slope_se,
        slope_t,
        slope_p_value,
        r_squared,
    })
}
