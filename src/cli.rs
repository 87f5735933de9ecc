use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "brainpad-stats",
    version,
    about = "BrainPAD cohort statistics and brain-age prediction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare BrainPAD across cohorts, sex, AIS grade and write result tables
    Run(RunArgs),
    /// Predict brain age from a feature table with a scaler and a linear model
    Predict(PredictArgs),
    /// Load a cohort table and report column presence and normality
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Cohort table (.csv, .tsv, optionally .gz)")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(
        long,
        default_value_t = 0.05,
        help = "Significance threshold for the normality tests"
    )]
    pub alpha: f64,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = serial)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long, help = "Feature table: ID, Age, then feature columns")]
    pub features: PathBuf,

    #[arg(long, help = "Scaler parameters (JSON: feature_names, mean, scale)")]
    pub scaler: PathBuf,

    #[arg(long, help = "Linear model parameters (JSON: intercept, coefficients)")]
    pub model: PathBuf,

    #[arg(long, help = "Output TSV (ID, Age, BrainAge, BrainPAD)")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Cohort table (.csv, .tsv, optionally .gz)")]
    pub input: PathBuf,

    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,
}
