use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage1_input;
pub mod stage2_summary;
pub mod stage3_normality;
pub mod stage4_compare;
pub mod stage5_association;
pub mod stage6_output;

use stage0_scaffold::Stage0Scaffold;
use stage1_input::Stage1Input;
use stage2_summary::Stage2Summary;
use stage3_normality::Stage3Normality;
use stage4_compare::Stage4Compare;
use stage5_association::Stage5Association;
use stage6_output::Stage6Output;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Full analysis run: load, summarize, test, write.
    pub fn analysis() -> Self {
        Self::new(vec![
            Box::new(Stage0Scaffold::new()),
            Box::new(Stage1Input::new()),
            Box::new(Stage2Summary::new()),
            Box::new(Stage3Normality::new()),
            Box::new(Stage4Compare::new()),
            Box::new(Stage5Association::new()),
            Box::new(Stage6Output::new()),
        ])
    }

    /// Load and check the input without writing anything.
    pub fn validation() -> Self {
        Self::new(vec![
            Box::new(Stage1Input::new()),
            Box::new(Stage2Summary::new()),
            Box::new(Stage3Normality::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
