use anyhow::Result;
use tracing::{info, warn};

use crate::cohort::select::{age_all, brainpad_all, brainpad_by_ais, time_since_injury_by_cohort};
use crate::cohort::{COL_AGE, COL_AIS, COL_TIME_SINCE_INJURY};
use crate::compare::{CompareError, NormalityReport, Sample, determine_normality};
use crate::ctx::{
    Ctx, SLICE_AGE, SLICE_BRAINPAD, SLICE_BRAINPAD_AIS, SLICE_TIME_SINCE_INJURY,
};
use crate::pipeline::Stage;

pub struct Stage3Normality;

impl Stage3Normality {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Normality {
    fn name(&self) -> &'static str {
        "stage3_normality"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let alpha = ctx.alpha;
        let table = ctx.table()?;
        let cols = table.columns;

        let slices: Vec<(&str, Result<Sample, CompareError>)> = vec![
            (SLICE_BRAINPAD, Ok(brainpad_all(table))),
            (
                SLICE_BRAINPAD_AIS,
                require(cols.ais, COL_AIS, || brainpad_by_ais(table).pooled),
            ),
            (
                SLICE_TIME_SINCE_INJURY,
                require(cols.time_since_injury, COL_TIME_SINCE_INJURY, || {
                    time_since_injury_by_cohort(table).pooled
                }),
            ),
            (SLICE_AGE, require(cols.age, COL_AGE, || age_all(table))),
        ];

        let mut verdicts = Vec::with_capacity(slices.len());
        let mut warnings = Vec::new();
        for (slice, sample) in slices {
            let report = sample.and_then(|s| determine_normality(&s, alpha));
            log_report(slice, &report);
            match &report {
                Ok(r) => {
                    if let Some(w) = &r.warning {
                        warnings.push(format!("normality '{}': {}", slice, w));
                    }
                }
                Err(err) => warnings.push(format!("normality '{}': {}", slice, err)),
            }
            verdicts.push((slice.to_string(), report));
        }

        ctx.normality.extend(verdicts);
        ctx.warnings.extend(warnings);
        Ok(())
    }
}

fn require<F>(present: bool, column: &str, slice: F) -> Result<Sample, CompareError>
where
    F: FnOnce() -> Sample,
{
    if present {
        Ok(slice())
    } else {
        Err(CompareError::MissingColumn(column.to_string()))
    }
}

fn log_report(slice: &str, report: &Result<NormalityReport, CompareError>) {
    match report {
        Ok(r) => {
            if let Some(w) = &r.warning {
                warn!(slice, n = r.n, "{}", w);
            }
            info!(
                slice,
                n = r.n,
                shapiro_p = r.shapiro.p_value,
                ks_p = r.ks.p_value,
                verdict = r.verdict.as_str(),
                "normality_determined"
            )
        }
        Err(err) => warn!(slice, error = %err, "normality_unavailable"),
    }
}
