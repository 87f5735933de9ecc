use std::collections::BTreeMap;

use anyhow::Result;

use crate::cohort::COHORT_ORDER;
use crate::ctx::{Ctx, NORMALITY_SLICES};
use crate::schema::v1::{
    BrainPadReportV1, ChiSquareEntry, CohortSummaryRow, Columns, ComparisonEntry,
    ComparisonFailureEntry, ComparisonSetEntry, InputMeta, NormalityEntry, RegressionEntry,
};

pub fn build_report(ctx: &Ctx) -> Result<BrainPadReportV1> {
    let table = ctx.table()?;

    let cohorts: BTreeMap<String, u64> = COHORT_ORDER
        .iter()
        .map(|c| (c.to_string(), table.cohort_count(c) as u64))
        .collect();
    let cols = table.columns;
    let input_meta = InputMeta {
        path: ctx.input.display().to_string(),
        rows: Some(table.len() as u64),
        cohorts,
        columns: Some(Columns {
            id: cols.id,
            age: cols.age,
            brain_age: cols.brain_age,
            sex: cols.sex,
            ais: cols.ais,
            time_since_injury: cols.time_since_injury,
            brainpad_derived: cols.brain_pad_derived,
        }),
        alpha: ctx.alpha,
    };

    let cohort_summary = ctx
        .cohort_summary
        .iter()
        .map(|s| CohortSummaryRow {
            cohort: s.cohort.clone(),
            participants: s.participants as u64,
            mean_age: s.mean_age,
            sd_age: s.sd_age,
            mean_brainpad: s.mean_brain_pad,
            sd_brainpad: s.sd_brain_pad,
            mean_brain_age: s.mean_brain_age,
            sd_brain_age: s.sd_brain_age,
            num_male: s.num_male.map(|v| v as u64),
            num_female: s.num_female.map(|v| v as u64),
            ais_distribution: s
                .ais_distribution
                .as_ref()
                .map(|d| d.iter().map(|(k, v)| (k.clone(), *v as u64)).collect()),
            mean_time_since_injury: s.mean_time_since_injury,
        })
        .collect();

    let normality = NORMALITY_SLICES
        .iter()
        .filter_map(|slice| {
            ctx.normality.get(*slice).map(|entry| match entry {
                Ok(r) => NormalityEntry {
                    slice: slice.to_string(),
                    n: Some(r.n as u64),
                    shapiro_w: Some(r.shapiro.w),
                    shapiro_p: Some(r.shapiro.p_value),
                    ks_d: Some(r.ks.d),
                    ks_p: Some(r.ks.p_value),
                    verdict: Some(r.verdict.as_str().to_string()),
                    error: None,
                },
                Err(err) => NormalityEntry {
                    slice: slice.to_string(),
                    n: None,
                    shapiro_w: None,
                    shapiro_p: None,
                    ks_d: None,
                    ks_p: None,
                    verdict: None,
                    error: Some(err.to_string()),
                },
            })
        })
        .collect();

    let comparisons = ctx
        .comparison_sets
        .iter()
        .map(|set| ComparisonSetEntry {
            name: set.name.clone(),
            variable: set.variable.clone(),
            stratum: set.stratum.as_ref().map(|s| s.to_string()),
            verdict: set.verdict.map(|v| v.as_str().to_string()),
            skipped: set.skipped.clone(),
            results: set
                .results()
                .map(|r| ComparisonEntry {
                    group1: r.group1.clone(),
                    group2: r.group2.clone(),
                    test: r.test.display_name().to_string(),
                    statistic: r.statistic,
                    p_value: r.p_value,
                    effect_size_kind: r.effect_kind.display_name().to_string(),
                    effect_size: r.effect_size,
                    magnitude: r.magnitude().as_str().to_string(),
                    n1: r.n1 as u64,
                    n2: r.n2 as u64,
                })
                .collect(),
            failures: set
                .failures()
                .map(|f| ComparisonFailureEntry {
                    group1: f.group1.clone(),
                    group2: f.group2.clone(),
                    n1: f.n1 as u64,
                    n2: f.n2 as u64,
                    reason: f.reason.clone(),
                })
                .collect(),
        })
        .collect();

    let ais_chi_square = match &ctx.ais_association {
        Some(Ok(assoc)) => Some(ChiSquareEntry {
            statistic: assoc.result.statistic,
            dof: assoc.result.dof as u64,
            p_value: assoc.result.p_value,
            yates_corrected: assoc.result.yates_corrected,
            cramers_v: assoc.result.cramers_v,
            rows: assoc.table.row_labels.clone(),
            cols: assoc.table.col_labels.clone(),
            observed: assoc.table.counts.clone(),
            expected: assoc.result.expected.clone(),
        }),
        _ => None,
    };

    let time_since_injury_regression = match &ctx.tsi_regression {
        Some(Ok(fit)) => Some(RegressionEntry {
            n: fit.n as u64,
            intercept: fit.intercept,
            slope: fit.slope,
            slope_se: fit.slope_se,
            slope_t: fit.slope_t,
            slope_p_value: fit.slope_p_value,
            r_squared: fit.r_squared,
        }),
        _ => None,
    };

    Ok(BrainPadReportV1 {
        tool: ctx.report.tool.clone(),
        version: ctx.report.version.clone(),
        schema_version: "v1".to_string(),
        input_meta,
        cohort_summary,
        normality,
        comparisons,
        ais_chi_square,
        time_since_injury_regression,
        warnings: ctx.warnings.clone(),
    })
}
