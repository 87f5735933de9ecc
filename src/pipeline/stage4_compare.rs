use anyhow::Result;
use tracing::info;

use crate::cohort::select::{
    age_by_cohort, brainpad_by_ais, brainpad_by_cohort, brainpad_by_cohort_for_sex,
    time_since_injury_by_cohort,
};
use crate::cohort::{
    COL_AGE, COL_AIS, COL_BRAINPAD, COL_SEX, COL_TIME_SINCE_INJURY, SEX_FEMALE, SEX_MALE,
};
use crate::compare::{CompareError, ComparisonSet, Sample, Stratum};
use crate::ctx::{Ctx, SLICE_AGE, SLICE_BRAINPAD, SLICE_BRAINPAD_AIS, SLICE_TIME_SINCE_INJURY};
use crate::pipeline::Stage;

pub const SET_COHORTS: &str = "brainpad_across_cohorts";
pub const SET_SEX: &str = "brainpad_across_sex";
pub const SET_AIS: &str = "brainpad_across_ais";
pub const SET_TIME_SINCE_INJURY: &str = "time_since_injury_comparison";
pub const SET_AGE: &str = "chronological_age_comparison";

pub struct Stage4Compare;

impl Stage4Compare {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Compare {
    fn name(&self) -> &'static str {
        "stage4_compare"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let sets = build_comparison_sets(ctx)?;

        let mut warnings = Vec::new();
        for set in &sets {
            let label = match &set.stratum {
                Some(st) => format!("{} [{}]", set.name, st),
                None => set.name.clone(),
            };
            if let Some(reason) = &set.skipped {
                warnings.push(format!("{}: Not Available ({})", label, reason));
            }
            for f in set.failures() {
                warnings.push(format!(
                    "{}: {} vs {}: {}",
                    label, f.group1, f.group2, f.reason
                ));
            }
            info!(
                set = %label,
                compared = set.results().count(),
                failed = set.failures().count(),
                "comparison_set_ready"
            );
        }

        ctx.warnings.extend(warnings);
        ctx.comparison_sets = sets;
        Ok(())
    }
}

/// Builds the five comparison families in output order. BrainPAD sets stratified by sex reuse the verdict
/// of the full BrainPAD slice.
pub fn build_comparison_sets(ctx: &Ctx) -> Result<Vec<ComparisonSet>> {
    let table = ctx.table()?;
    let cols = table.columns;
    let mut sets = Vec::new();

    sets.push(comparison_set(
        ctx,
        SET_COHORTS,
        COL_BRAINPAD,
        None,
        SLICE_BRAINPAD,
        Ok(brainpad_by_cohort(table).groups),
    ));

    for sex in [SEX_FEMALE, SEX_MALE] {
        sets.push(comparison_set(
            ctx,
            SET_SEX,
            COL_BRAINPAD,
            Some(Stratum::new(COL_SEX, sex)),
            SLICE_BRAINPAD,
            groups_if(cols.sex, COL_SEX, || {
                brainpad_by_cohort_for_sex(table, sex).groups
            }),
        ));
    }

    sets.push(comparison_set(
        ctx,
        SET_AIS,
        COL_BRAINPAD,
        None,
        SLICE_BRAINPAD_AIS,
        groups_if(cols.ais, COL_AIS, || brainpad_by_ais(table).groups),
    ));

    sets.push(comparison_set(
        ctx,
        SET_TIME_SINCE_INJURY,
        COL_TIME_SINCE_INJURY,
        None,
        SLICE_TIME_SINCE_INJURY,
        groups_if(cols.time_since_injury, COL_TIME_SINCE_INJURY, || {
            time_since_injury_by_cohort(table).groups
        }),
    ));

    sets.push(comparison_set(
        ctx,
        SET_AGE,
        COL_AGE,
        None,
        SLICE_AGE,
        groups_if(cols.age, COL_AGE, || age_by_cohort(table).groups),
    ));

    Ok(sets)
}

fn groups_if<F>(present: bool, column: &str, groups: F) -> Result<Vec<Sample>, CompareError>
where
    F: FnOnce() -> Vec<Sample>,
{
    if present {
        Ok(groups())
    } else {
        Err(CompareError::MissingColumn(column.to_string()))
    }
}

fn comparison_set(
    ctx: &Ctx,
    name: &str,
    variable: &str,
    stratum: Option<Stratum>,
    slice: &str,
    groups: Result<Vec<Sample>, CompareError>,
) -> ComparisonSet {
    let groups = match groups {
        Ok(groups) => groups,
        Err(err) => return ComparisonSet::unavailable(name, variable, stratum, err.to_string()),
    };
    match ctx.verdict(slice) {
        Ok(verdict) => {
            ComparisonSet::evaluated(name, variable, stratum, verdict, &groups, ctx.threads)
        }
        Err(reason) => ComparisonSet::unavailable(name, variable, stratum, reason),
    }
}
