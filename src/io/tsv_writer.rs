use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cohort::summary::format_ais_distribution;
use crate::compare::{ComparisonSet, PairOutcome};
use crate::ctx::{Ctx, NORMALITY_SLICES};

pub const NOT_AVAILABLE: &str = "Not Available";

pub const SUMMARY_TSV: &str = "summary_statistics.tsv";
pub const NORMALITY_TSV: &str = "normality.tsv";
pub const CHI2_AIS_TSV: &str = "chi2_ais.tsv";
pub const REGRESSION_TSV: &str = "brainpad_vs_time_since_injury.tsv";

/// Comparison set name and the file it is written to.
pub const COMPARISON_TABLES: [(&str, &str); 5] = [
    ("brainpad_across_cohorts", "brainpad_across_cohorts.tsv"),
    ("brainpad_across_sex", "brainpad_across_sex.tsv"),
    ("brainpad_across_ais", "brainpad_across_ais.tsv"),
    ("time_since_injury_comparison", "time_since_injury_comparison.tsv"),
    ("chronological_age_comparison", "chronological_age_comparison.tsv"),
];

/// Writes every result table into `out_dir` and returns the paths written.
pub fn write_tsv_outputs(out_dir: &Path, ctx: &Ctx) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = out_dir.join(SUMMARY_TSV);
    write_summary(&path, ctx)?;
    written.push(path);

    let path = out_dir.join(NORMALITY_TSV);
    write_normality(&path, ctx)?;
    written.push(path);

    for (name, file) in COMPARISON_TABLES {
        let path = out_dir.join(file);
        let sets: Vec<&ComparisonSet> = ctx.comparison_set(name).collect();
        write_comparisons(&path, &sets)?;
        written.push(path);
    }

    let path = out_dir.join(CHI2_AIS_TSV);
    write_chi2(&path, ctx)?;
    written.push(path);

    let path = out_dir.join(REGRESSION_TSV);
    write_regression(&path, ctx)?;
    written.push(path);

    Ok(written)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Fixed six decimals; scientific notation below 1e-4 so small p-values
/// keep their digits.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() {
        NOT_AVAILABLE.to_string()
    } else if v != 0.0 && v.abs() < 1e-4 {
        format!("{:.6e}", v)
    } else {
        format!("{:.6}", v)
    }
}

fn opt_float(v: Option<f64>) -> String {
    v.map(format_float)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn opt_count(v: Option<usize>) -> String {
    v.map(|c| c.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn write_summary(path: &Path, ctx: &Ctx) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "Cohort\tParticipants\tMean Age\tSD Age\tMean BrainPAD\tSD BrainPAD\tMean BrainAge\tSD BrainAge\tNum Male\tNum Female\tAIS Distribution\tMean Time Since SCI (years)"
    )?;
    for s in &ctx.cohort_summary {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.cohort,
            s.participants,
            opt_float(s.mean_age),
            opt_float(s.sd_age),
            opt_float(s.mean_brain_pad),
            opt_float(s.sd_brain_pad),
            opt_float(s.mean_brain_age),
            opt_float(s.sd_brain_age),
            opt_count(s.num_male),
            opt_count(s.num_female),
            format_ais_distribution(s.ais_distribution.as_ref()),
            opt_float(s.mean_time_since_injury)
        )?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_normality(path: &Path, ctx: &Ctx) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "Slice\tN\tShapiro W\tShapiro p-value\tKS D\tKS p-value\tVerdict\tNote"
    )?;
    for slice in NORMALITY_SLICES {
        match ctx.normality.get(slice) {
            Some(Ok(r)) => writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                slice,
                r.n,
                format_float(r.shapiro.w),
                format_float(r.shapiro.p_value),
                format_float(r.ks.d),
                format_float(r.ks.p_value),
                r.verdict.as_str(),
                r.warning.as_deref().unwrap_or("")
            )?,
            Some(Err(err)) => writeln!(
                w,
                "{slice}\t{na}\t{na}\t{na}\t{na}\t{na}\t{na}\t{err}",
                na = NOT_AVAILABLE
            )?,
            None => {}
        }
    }
    w.flush()?;
    Ok(())
}

/// One row per pair; a stratum column leads when the sets are stratified.
pub fn write_comparisons(path: &Path, sets: &[&ComparisonSet]) -> Result<()> {
    let mut w = create(path)?;
    let stratum_column = sets
        .iter()
        .find_map(|s| s.stratum.as_ref().map(|st| st.column.clone()));

    let mut header = Vec::new();
    if let Some(col) = &stratum_column {
        header.push(col.as_str());
    }
    header.extend([
        "Group1",
        "Group2",
        "Test Used",
        "p-value",
        "Effect Size",
        "Sample Size",
    ]);
    writeln!(w, "{}", header.join("\t"))?;

    for set in sets {
        let prefix = match (&stratum_column, &set.stratum) {
            (Some(_), Some(st)) => format!("{}\t", st.value),
            (Some(_), None) => format!("{}\t", NOT_AVAILABLE),
            (None, _) => String::new(),
        };
        if !set.is_available() {
            writeln!(
                w,
                "{prefix}{na}\t{na}\t{na}\t{na}\t{na}\t{na}",
                na = NOT_AVAILABLE
            )?;
            continue;
        }
        for outcome in &set.outcomes {
            match outcome {
                PairOutcome::Compared(r) => writeln!(
                    w,
                    "{}{}\t{}\t{}\t{}\t{}\t{}",
                    prefix,
                    r.group1,
                    r.group2,
                    r.test_used(),
                    format_float(r.p_value),
                    format_float(r.effect_size),
                    r.sample_sizes()
                )?,
                PairOutcome::Failed(f) => writeln!(
                    w,
                    "{}{}\t{}\t{na}\t{na}\t{na}\tn1={}, n2={}",
                    prefix,
                    f.group1,
                    f.group2,
                    f.n1,
                    f.n2,
                    na = NOT_AVAILABLE
                )?,
            }
        }
    }
    w.flush()?;
    Ok(())
}

pub fn write_chi2(path: &Path, ctx: &Ctx) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "Chi-Square Statistic\tDegrees of Freedom\tp-value\tYates Correction\tCramer's V"
    )?;
    match &ctx.ais_association {
        Some(Ok(assoc)) => {
            let r = &assoc.result;
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                format_float(r.statistic),
                r.dof,
                format_float(r.p_value),
                r.yates_corrected,
                format_float(r.cramers_v)
            )?;
        }
        _ => writeln!(
            w,
            "{na}\t{na}\t{na}\t{na}\t{na}",
            na = NOT_AVAILABLE
        )?,
    }
    w.flush()?;
    Ok(())
}

pub fn write_regression(path: &Path, ctx: &Ctx) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "N\tIntercept\tSlope\tSlope SE\tSlope t\tp-value\tR-squared"
    )?;
    match &ctx.tsi_regression {
        Some(Ok(fit)) => writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            fit.n,
            format_float(fit.intercept),
            format_float(fit.slope),
            format_float(fit.slope_se),
            format_float(fit.slope_t),
            format_float(fit.slope_p_value),
            format_float(fit.r_squared)
        )?,
        _ => writeln!(
            w,
            "{na}\t{na}\t{na}\t{na}\t{na}\t{na}\t{na}",
            na = NOT_AVAILABLE
        )?,
    }
    w.flush()?;
    Ok(())
}
