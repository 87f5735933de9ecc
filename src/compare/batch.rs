use serde::Serialize;
use tracing::{debug, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::compare::{CompareError, ComparisonResult, NormalityVerdict, Sample, compare};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stratum {
    pub column: String,
    pub value: String,
}

impl Stratum {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Stratum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.column, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonFailure {
    pub group1: String,
    pub group2: String,
    pub n1: usize,
    pub n2: usize,
    pub reason: String,
}

/// Outcome of one pair, in pair order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOutcome {
    Compared(ComparisonResult),
    Failed(ComparisonFailure),
}

/// One family of pairwise comparisons sharing a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSet {
    pub name: String,
    pub variable: String,
    pub stratum: Option<Stratum>,
    pub verdict: Option<NormalityVerdict>,
    pub outcomes: Vec<PairOutcome>,
    pub skipped: Option<String>,
}

impl ComparisonSet {
    pub fn evaluated(
        name: &str,
        variable: &str,
        stratum: Option<Stratum>,
        verdict: NormalityVerdict,
        samples: &[Sample],
        threads: usize,
    ) -> Self {
        let outcomes = pairwise(samples, verdict, threads);
        let set = Self {
            name: name.to_string(),
            variable: variable.to_string(),
            stratum,
            verdict: Some(verdict),
            outcomes,
            skipped: None,
        };
        for f in set.failures() {
            warn!(
                set = name,
                group1 = %f.group1,
                group2 = %f.group2,
                reason = %f.reason,
                "pairwise comparison failed"
            );
        }
        set
    }

    /// The whole set is "Not Available" (missing column, no verdict).
    pub fn unavailable(
        name: &str,
        variable: &str,
        stratum: Option<Stratum>,
        reason: impl Into<String>,
    ) -> Self {
        let reason = reason.into();
        warn!(set = name, reason = %reason, "comparison set not available");
        Self {
            name: name.to_string(),
            variable: variable.to_string(),
            stratum,
            verdict: None,
            outcomes: Vec::new(),
            skipped: Some(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        self.skipped.is_none()
    }

    pub fn results(&self) -> impl Iterator<Item = &ComparisonResult> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            PairOutcome::Compared(r) => Some(r),
            PairOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComparisonFailure> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            PairOutcome::Failed(f) => Some(f),
            PairOutcome::Compared(_) => None,
        })
    }
}

/// Compares every unordered pair (i < j) in input order. Failures are
/// collected per pair and never abort the remaining pairs.
pub fn pairwise(samples: &[Sample], verdict: NormalityVerdict, threads: usize) -> Vec<PairOutcome> {
    let pairs: Vec<(usize, usize)> = (0..samples.len())
        .flat_map(|i| (i + 1..samples.len()).map(move |j| (i, j)))
        .collect();

    let outcomes = run_pairs(samples, &pairs, verdict, threads);

    pairs
        .into_iter()
        .zip(outcomes)
        .map(|((i, j), outcome)| match outcome {
            Ok(r) => PairOutcome::Compared(r),
            Err(err) => PairOutcome::Failed(ComparisonFailure {
                group1: samples[i].label().to_string(),
                group2: samples[j].label().to_string(),
                n1: samples[i].len(),
                n2: samples[j].len(),
                reason: err.to_string(),
            }),
        })
        .collect()
}

fn run_pairs(
    samples: &[Sample],
    pairs: &[(usize, usize)],
    verdict: NormalityVerdict,
    threads: usize,
) -> Vec<Result<ComparisonResult, CompareError>> {
    let serial = || {
        pairs
            .iter()
            .map(|&(i, j)| compare(&samples[i], &samples[j], verdict))
            .collect::<Vec<_>>()
    };

    #[cfg(feature = "mt")]
    {
        if threads > 1 && pairs.len() > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => {
                    return pool.install(|| {
                        pairs
                            .par_iter()
                            .map(|&(i, j)| compare(&samples[i], &samples[j], verdict))
                            .collect()
                    });
                }
                Err(e) => {
                    debug!(error = %e, "thread pool unavailable, comparing serially");
                }
            }
        }
    }
    #[cfg(not(feature = "mt"))]
    {
        if threads > 1 {
            debug!("feature 'mt' disabled, comparing serially");
        }
    }

    serial()
}
