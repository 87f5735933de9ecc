use anyhow::Result;
use tracing::info;

use crate::cohort::summarize_cohorts;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage2Summary;

impl Stage2Summary {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Summary {
    fn name(&self) -> &'static str {
        "stage2_summary"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let summary = summarize_cohorts(ctx.table()?);
        info!(cohorts = summary.len(), "cohort_summary_ready");
        ctx.cohort_summary = summary;
        Ok(())
    }
}
