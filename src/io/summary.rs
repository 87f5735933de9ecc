use anyhow::Result;

use crate::cohort::COHORT_ORDER;
use crate::ctx::{Ctx, NORMALITY_SLICES};

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let table = ctx.table()?;

    let mut out = String::new();
    out.push_str(&format!("brainpad-stats v{}\n", version));
    let counts: Vec<String> = COHORT_ORDER
        .iter()
        .map(|c| format!("{}={}", c, table.cohort_count(c)))
        .collect();
    out.push_str(&format!(
        "Input: {} subjects ({})\n",
        table.len(),
        counts.join(", ")
    ));

    let verdicts: Vec<String> = NORMALITY_SLICES
        .iter()
        .map(|s| match ctx.normality.get(*s) {
            Some(Ok(r)) => format!("{}={}", s, r.verdict.as_str()),
            _ => format!("{}=n/a", s),
        })
        .collect();
    out.push_str(&format!("Normality: {}\n", verdicts.join(", ")));

    for set in &ctx.comparison_sets {
        let label = match &set.stratum {
            Some(st) => format!("{} [{}]", set.name, st),
            None => set.name.clone(),
        };
        if let Some(reason) = &set.skipped {
            out.push_str(&format!("{}: not available ({})\n", label, reason));
            continue;
        }
        let significant = set
            .results()
            .filter(|r| r.p_value < ctx.alpha)
            .count();
        out.push_str(&format!(
            "{}: {} compared, {} failed, {} with p < {}\n",
            label,
            set.results().count(),
            set.failures().count(),
            significant,
            ctx.alpha
        ));
    }

    match &ctx.ais_association {
        Some(Ok(a)) => out.push_str(&format!(
            "AIS chi-square: {:.3} (dof={}, p={:.4})\n",
            a.result.statistic, a.result.dof, a.result.p_value
        )),
        _ => out.push_str("AIS chi-square: not available\n"),
    }
    match &ctx.tsi_regression {
        Some(Ok(fit)) => out.push_str(&format!(
            "BrainPAD ~ time since SCI: slope={:+.3}, p={:.4}, R2={:.3}\n",
            fit.slope, fit.slope_p_value, fit.r_squared
        )),
        _ => out.push_str("BrainPAD ~ time since SCI: not available\n"),
    }

    Ok(out)
}
