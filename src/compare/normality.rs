//! Normality verdict from Shapiro-Wilk and a self-parameterized
//! Kolmogorov-Smirnov test.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::compare::{CompareError, NormalityVerdict, Sample};
use crate::math::kolmogorov::kolmogorov_sf;
use crate::math::stats::{mean, sorted, std_dev};

pub const SHAPIRO_MIN_N: usize = 3;
/// Above this size W is still computed but its p-value is extrapolated.
pub const SHAPIRO_MAX_N: usize = 5000;

const SMALL: f64 = 1e-19;

// Royston (1995), AS R94 polynomial coefficients.
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub w: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsResult {
    pub d: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityReport {
    pub n: usize,
    pub shapiro: ShapiroWilk,
    pub ks: KsResult,
    pub alpha: f64,
    pub verdict: NormalityVerdict,
    /// Set when the verdict rests on an extrapolated Shapiro-Wilk p-value.
    pub warning: Option<String>,
}

/// Verdict is normal only when both tests exceed `alpha`.
pub fn determine_normality(sample: &Sample, alpha: f64) -> Result<NormalityReport, CompareError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(CompareError::InvalidInput(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }
    sample.require(SHAPIRO_MIN_N)?;
    let shapiro = shapiro_wilk(sample.values())?;
    let ks = ks_normal(sample.values())?;
    let verdict = if shapiro.p_value > alpha && ks.p_value > alpha {
        NormalityVerdict::Normal
    } else {
        NormalityVerdict::NotNormal
    };
    Ok(NormalityReport {
        n: sample.len(),
        shapiro,
        ks,
        alpha,
        verdict,
        warning: shapiro_size_warning(sample.len()),
    })
}

pub fn shapiro_wilk(values: &[f64]) -> Result<ShapiroWilk, CompareError> {
    let n = values.len();
    if n < SHAPIRO_MIN_N {
        return Err(CompareError::InsufficientSample {
            label: "Shapiro-Wilk input".to_string(),
            actual: n,
            required: SHAPIRO_MIN_N,
        });
    }
    let x = sorted(values);
    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Err(CompareError::ZeroVariance(
            "all values are identical".to_string(),
        ));
    }

    let half = coefficients(n)?;
    let mut coef = vec![0.0; n];
    for (i, &a) in half.iter().enumerate() {
        coef[i] = -a;
        coef[n - 1 - i] = a;
    }

    // W as the squared correlation between data and coefficients, carried
    // as 1 - W to keep precision for W close to 1.
    let scaled: Vec<f64> = x.iter().map(|v| v / range).collect();
    let mx = scaled.iter().sum::<f64>() / n as f64;
    let mc = coef.iter().sum::<f64>() / n as f64;
    let mut ssa = 0.0;
    let mut ssx = 0.0;
    let mut sax = 0.0;
    for (c, v) in coef.iter().zip(&scaled) {
        let dc = c - mc;
        let dx = v - mx;
        ssa += dc * dc;
        ssx += dx * dx;
        sax += dc * dx;
    }
    let root = (ssa * ssx).sqrt();
    let w1 = (root - sax) * (root + sax) / (ssa * ssx);
    let w = 1.0 - w1;

    let p_value = shapiro_p_value(w, w1, n)?;
    Ok(ShapiroWilk {
        w,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

pub fn shapiro_size_warning(n: usize) -> Option<String> {
    (n > SHAPIRO_MAX_N).then(|| {
        format!("Shapiro-Wilk p-value may not be accurate for n > {SHAPIRO_MAX_N} (n={n})")
    })
}

/// One-sample two-sided KS test against N(mean, sd) of the sample itself.
pub fn ks_normal(values: &[f64]) -> Result<KsResult, CompareError> {
    let n = values.len();
    let (m, sd) = match (mean(values), std_dev(values)) {
        (Some(m), Some(sd)) => (m, sd),
        _ => {
            return Err(CompareError::InsufficientSample {
                label: "Kolmogorov-Smirnov input".to_string(),
                actual: n,
                required: 2,
            });
        }
    };
    if !(sd > 0.0) {
        return Err(CompareError::ZeroVariance(
            "standard deviation is zero".to_string(),
        ));
    }
    let dist =
        Normal::new(m, sd).map_err(|e| CompareError::Distribution(format!("normal: {e}")))?;

    let x = sorted(values);
    let nf = n as f64;
    let mut d = 0.0f64;
    for (i, &v) in x.iter().enumerate() {
        let f = dist.cdf(v);
        let plus = (i + 1) as f64 / nf - f;
        let minus = f - i as f64 / nf;
        d = d.max(plus).max(minus);
    }
    Ok(KsResult {
        d,
        p_value: kolmogorov_sf(n, d),
    })
}

fn coefficients(n: usize) -> Result<Vec<f64>, CompareError> {
    let nn2 = n / 2;
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }
    let std_normal = Normal::new(0.0, 1.0)
        .map_err(|e| CompareError::Distribution(format!("standard normal: {e}")))?;

    let nf = n as f64;
    let m: Vec<f64> = (0..nn2)
        .map(|i| std_normal.inverse_cdf((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; nn2];
    let (first, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    if !fac.is_finite() || fac <= 0.0 {
        return Err(CompareError::InvalidInput(format!(
            "Shapiro-Wilk coefficients undefined for n={n}"
        )));
    }
    a[0] = a1;
    for i in first..nn2 {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

fn shapiro_p_value(w: f64, w1: f64, n: usize) -> Result<f64, CompareError> {
    if n == 3 {
        // Exact for n = 3.
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::FRAC_PI_3;
        return Ok((pi6 * (w.max(0.0).sqrt().min(1.0).asin() - stqr)).max(0.0));
    }
    if w1 <= 0.0 {
        return Ok(1.0);
    }
    let nf = n as f64;
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return Ok(1e-99);
        }
        y = -(gamma - y).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let xx = nf.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };
    let dist = Normal::new(m, s).map_err(|e| CompareError::Distribution(format!("normal: {e}")))?;
    Ok(dist.sf(y))
}

fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}
