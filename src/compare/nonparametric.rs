use statrs::distribution::{ContinuousCDF, Normal};

use crate::compare::{CompareError, MIN_GROUP_SIZE, TestOutcome};
use crate::math::stats::{average_ranks, tie_correction};

/// Largest smaller-group size for which the exact null distribution is used.
pub const EXACT_MAX_N: usize = 8;

/// Two-sided Mann-Whitney U test. The reported statistic is U of the first
/// sample.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TestOutcome, CompareError> {
    guard(a, "first sample")?;
    guard(b, "second sample")?;
    let n1 = a.len();
    let n2 = b.len();

    let mut pooled = Vec::with_capacity(n1 + n2);
    pooled.extend_from_slice(a);
    pooled.extend_from_slice(b);
    let ranks = average_ranks(&pooled);
    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let ties = tie_correction(&pooled);
    let p_value = if n1.min(n2) <= EXACT_MAX_N && ties == 0.0 {
        exact_p(u, n1, n2)
    } else {
        asymptotic_p(u, n1, n2, ties)?
    };

    Ok(TestOutcome {
        statistic: u1,
        p_value,
    })
}

/// Cliff's delta: P(a > b) - P(a < b) over all cross pairs.
pub fn cliffs_delta(a: &[f64], b: &[f64]) -> Result<f64, CompareError> {
    if a.is_empty() || b.is_empty() {
        return Err(CompareError::InvalidInput(
            "Cliff's delta requires two non-empty samples".to_string(),
        ));
    }
    let mut greater = 0i64;
    let mut less = 0i64;
    for &x in a {
        for &y in b {
            if x > y {
                greater += 1;
            } else if x < y {
                less += 1;
            }
        }
    }
    Ok((greater - less) as f64 / (a.len() * b.len()) as f64)
}

/// Number of arrangements yielding each U value, index = U.
///
/// Coefficients of the Gaussian binomial [n1+n2, n1]_q built as
/// prod_{i=1..k} (1 - q^(m+i)) / (1 - q^i) with k = min(n1, n2).
pub fn u_null_counts(n1: usize, n2: usize) -> Vec<f64> {
    let k = n1.min(n2);
    let m = n1.max(n2);
    let len = n1 * n2 + k + m + 1;
    let mut poly = vec![0.0; len];
    poly[0] = 1.0;
    for i in 1..=k {
        let shift = m + i;
        for d in (shift..len).rev() {
            poly[d] -= poly[d - shift];
        }
        for d in i..len {
            poly[d] += poly[d - i];
        }
    }
    poly.truncate(n1 * n2 + 1);
    poly
}

fn exact_p(u: f64, n1: usize, n2: usize) -> f64 {
    let counts = u_null_counts(n1, n2);
    let total: f64 = counts.iter().sum();
    let start = (u.round() as usize).min(counts.len());
    let upper: f64 = counts[start..].iter().sum();
    (2.0 * upper / total).clamp(0.0, 1.0)
}

fn asymptotic_p(u: f64, n1: usize, n2: usize, ties: f64) -> Result<f64, CompareError> {
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let n = n1f + n2f;
    let mu = n1f * n2f / 2.0;
    let var = n1f * n2f / 12.0 * ((n + 1.0) - ties / (n * (n - 1.0)));
    if !(var > 0.0) {
        return Err(CompareError::ZeroVariance(
            "all observations are tied".to_string(),
        ));
    }
    let z = (u - mu - 0.5) / var.sqrt();
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| CompareError::Distribution(format!("standard normal: {e}")))?;
    Ok((2.0 * normal.sf(z)).clamp(0.0, 1.0))
}

fn guard(values: &[f64], what: &str) -> Result<(), CompareError> {
    if values.len() < MIN_GROUP_SIZE {
        return Err(CompareError::InsufficientSample {
            label: what.to_string(),
            actual: values.len(),
            required: MIN_GROUP_SIZE,
        });
    }
    Ok(())
}
