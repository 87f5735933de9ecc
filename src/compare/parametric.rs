use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::compare::{CompareError, MIN_GROUP_SIZE, TestOutcome};
use crate::math::stats::{mean, sample_variance};

/// Two-sided Student t-test assuming equal variances.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Result<TestOutcome, CompareError> {
    let (m1, v1) = moments(a, "first sample")?;
    let (m2, v2) = moments(b, "second sample")?;
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if !(se > 0.0) {
        return Err(CompareError::ZeroVariance(
            "pooled variance of both samples is zero".to_string(),
        ));
    }
    let t = (m1 - m2) / se;
    let p_value = two_sided_t_p(t, df)?;
    Ok(TestOutcome {
        statistic: t,
        p_value,
    })
}

/// Standardized mean difference over the unweighted average of the two
/// sample variances.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Result<f64, CompareError> {
    let (m1, v1) = moments(a, "first sample")?;
    let (m2, v2) = moments(b, "second sample")?;
    let pooled_sd = ((v1 + v2) / 2.0).sqrt();
    if !(pooled_sd > 0.0) {
        return Err(CompareError::ZeroVariance(
            "pooled standard deviation is zero".to_string(),
        ));
    }
    Ok((m1 - m2) / pooled_sd)
}

pub(crate) fn two_sided_t_p(t: f64, df: f64) -> Result<f64, CompareError> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| CompareError::Distribution(format!("t distribution (df={df}): {e}")))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

fn moments(values: &[f64], what: &str) -> Result<(f64, f64), CompareError> {
    let too_small = || CompareError::InsufficientSample {
        label: what.to_string(),
        actual: values.len(),
        required: MIN_GROUP_SIZE,
    };
    let m = mean(values).ok_or_else(too_small)?;
    let v = sample_variance(values).ok_or_else(too_small)?;
    Ok((m, v))
}
