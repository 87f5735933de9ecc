//! Cohort comparator.
//!
//! A normality verdict is computed once per outcome variable and dataset
//! slice; every pairwise comparison over that slice then dispatches through
//! [`decide_test`] to either a Student t-test with Cohen's d or a
//! Mann-Whitney U test with Cliff's delta.

use serde::Serialize;
use thiserror::Error;

pub mod association;
pub mod batch;
pub mod nonparametric;
pub mod normality;
pub mod parametric;

pub use association::{ContingencyResult, ContingencyTable, OlsFit, chi2_contingency, ols_fit};
pub use batch::{ComparisonFailure, ComparisonSet, PairOutcome, Stratum, pairwise};
pub use normality::{KsResult, NormalityReport, ShapiroWilk, determine_normality};

/// Minimum group size for a pairwise comparison.
pub const MIN_GROUP_SIZE: usize = 2;

/// Default significance threshold for the normality tests.
pub const DEFAULT_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    #[error("insufficient sample size: '{label}' has {actual} values, need at least {required}")]
    InsufficientSample {
        label: String,
        actual: usize,
        required: usize,
    },
    #[error("zero variance: {0}")]
    ZeroVariance(String),
    #[error("degenerate contingency table: {0}")]
    DegenerateTable(String),
    #[error("column '{0}' not available")]
    MissingColumn(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("distribution error: {0}")]
    Distribution(String),
}

/// Labeled group of finite observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    label: String,
    values: Vec<f64>,
}

impl Sample {
    /// Non-finite values are dropped.
    pub fn new(label: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            label: label.into(),
            values: values.into_iter().filter(|v| v.is_finite()).collect(),
        }
    }

    pub fn from_options(
        label: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
    ) -> Self {
        Self::new(label, values.into_iter().flatten())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn require(&self, required: usize) -> Result<(), CompareError> {
        if self.values.len() < required {
            return Err(CompareError::InsufficientSample {
                label: self.label.clone(),
                actual: self.values.len(),
                required,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalityVerdict {
    Normal,
    NotNormal,
}

impl NormalityVerdict {
    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::NotNormal => "not_normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    StudentT,
    MannWhitneyU,
}

impl TestKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::StudentT => "t-test",
            Self::MannWhitneyU => "Mann-Whitney U",
        }
    }

    pub fn statistic_symbol(self) -> &'static str {
        match self {
            Self::StudentT => "t",
            Self::MannWhitneyU => "U",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSizeKind {
    CohensD,
    CliffsDelta,
}

impl EffectSizeKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CohensD => "Cohen's d",
            Self::CliffsDelta => "Cliff's delta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Cohen (1988) bands for d; Romano et al. (2006) bands for delta.
    pub fn classify(kind: EffectSizeKind, value: f64) -> Self {
        let v = value.abs();
        let (small, medium, large) = match kind {
            EffectSizeKind::CohensD => (0.2, 0.5, 0.8),
            EffectSizeKind::CliffsDelta => (0.147, 0.33, 0.474),
        };
        if v < small {
            Self::Negligible
        } else if v < medium {
            Self::Small
        } else if v < large {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Statistic and two-sided p-value of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

type TestFn = fn(&[f64], &[f64]) -> Result<TestOutcome, CompareError>;
type EffectFn = fn(&[f64], &[f64]) -> Result<f64, CompareError>;

/// Test and effect-size pair selected by a normality verdict.
#[derive(Clone, Copy)]
pub struct TestStrategy {
    pub test: TestKind,
    pub effect: EffectSizeKind,
    test_fn: TestFn,
    effect_fn: EffectFn,
}

impl TestStrategy {
    pub fn run_test(&self, a: &[f64], b: &[f64]) -> Result<TestOutcome, CompareError> {
        (self.test_fn)(a, b)
    }

    pub fn effect_size(&self, a: &[f64], b: &[f64]) -> Result<f64, CompareError> {
        (self.effect_fn)(a, b)
    }
}

impl std::fmt::Debug for TestStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestStrategy")
            .field("test", &self.test)
            .field("effect", &self.effect)
            .finish()
    }
}

pub fn decide_test(verdict: NormalityVerdict) -> TestStrategy {
    match verdict {
        NormalityVerdict::Normal => TestStrategy {
            test: TestKind::StudentT,
            effect: EffectSizeKind::CohensD,
            test_fn: parametric::student_t_test,
            effect_fn: parametric::cohens_d,
        },
        NormalityVerdict::NotNormal => TestStrategy {
            test: TestKind::MannWhitneyU,
            effect: EffectSizeKind::CliffsDelta,
            test_fn: nonparametric::mann_whitney_u,
            effect_fn: nonparametric::cliffs_delta,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub group1: String,
    pub group2: String,
    pub test: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    pub effect_kind: EffectSizeKind,
    pub effect_size: f64,
    pub n1: usize,
    pub n2: usize,
}

impl ComparisonResult {
    pub fn test_used(&self) -> String {
        format!(
            "{} ({}={:.2})",
            self.test.display_name(),
            self.test.statistic_symbol(),
            self.statistic
        )
    }

    pub fn sample_sizes(&self) -> String {
        format!("n1={}, n2={}", self.n1, self.n2)
    }

    pub fn magnitude(&self) -> EffectMagnitude {
        EffectMagnitude::classify(self.effect_kind, self.effect_size)
    }
}

pub fn compare(
    a: &Sample,
    b: &Sample,
    verdict: NormalityVerdict,
) -> Result<ComparisonResult, CompareError> {
    a.require(MIN_GROUP_SIZE)?;
    b.require(MIN_GROUP_SIZE)?;

    let strategy = decide_test(verdict);
    let outcome = strategy.run_test(a.values(), b.values())?;
    let effect_size = strategy.effect_size(a.values(), b.values())?;

    Ok(ComparisonResult {
        group1: a.label().to_string(),
        group2: b.label().to_string(),
        test: strategy.test,
        statistic: outcome.statistic,
        p_value: outcome.p_value,
        effect_kind: strategy.effect,
        effect_size,
        n1: a.len(),
        n2: b.len(),
    })
}
