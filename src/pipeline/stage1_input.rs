use anyhow::Result;
use tracing::{info, warn};

use crate::cohort::{
    COHORT_ORDER, COL_AGE, COL_AIS, COL_BRAIN_AGE, COL_SEX, COL_TIME_SINCE_INJURY, CohortTable,
    load_cohort_table,
};
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = load_cohort_table(&ctx.input)?;

        let warnings = input_warnings(&table);
        for w in &warnings {
            warn!(warning = %w, "input_warning");
        }
        ctx.warnings.extend(warnings);

        for cohort in COHORT_ORDER {
            info!(cohort, subjects = table.cohort_count(cohort), "cohort_size");
        }
        ctx.report.input_meta.rows = Some(table.len() as u64);
        ctx.table = Some(table);
        Ok(())
    }
}

/// Absent optional columns and unrecognized cohort labels.
pub fn input_warnings(table: &CohortTable) -> Vec<String> {
    let cols = table.columns;
    let mut warnings = Vec::new();
    let optional = [
        (cols.age, COL_AGE),
        (cols.brain_age, COL_BRAIN_AGE),
        (cols.sex, COL_SEX),
        (cols.ais, COL_AIS),
        (cols.time_since_injury, COL_TIME_SINCE_INJURY),
    ];
    for (present, column) in optional {
        if !present {
            warnings.push(format!(
                "column '{}' not present; dependent results are Not Available",
                column
            ));
        }
    }
    if cols.brain_pad_derived {
        warnings.push("BrainPAD derived as BrainAge - Age".to_string());
    }

    let unknown = table
        .records
        .iter()
        .filter(|r| !COHORT_ORDER.contains(&r.cohort.as_str()))
        .count();
    if unknown > 0 {
        warnings.push(format!(
            "{} rows with a cohort outside {{{}}} are excluded from cohort comparisons",
            unknown,
            COHORT_ORDER.join(", ")
        ));
    }
    for cohort in COHORT_ORDER {
        if table.cohort_count(cohort) == 0 {
            warnings.push(format!("cohort '{}' has no rows", cohort));
        }
    }
    warnings
}
