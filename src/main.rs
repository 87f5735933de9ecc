use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use brainpad_stats::cli::{Cli, Commands, PredictArgs};
use brainpad_stats::ctx::{Ctx, NORMALITY_SLICES};
use brainpad_stats::io;
use brainpad_stats::pipeline::Pipeline;
use brainpad_stats::predict;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            check_alpha(args.alpha)?;
            let mut ctx = Ctx::new(
                args.input,
                args.out,
                args.json,
                args.tsv,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.alpha = args.alpha;
            ctx.threads = args.threads;

            Pipeline::analysis().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Predict(args) => run_predict(args)?,
        Commands::Validate(args) => {
            check_alpha(args.alpha)?;
            let mut ctx = Ctx::new(
                args.input,
                PathBuf::from("."),
                false,
                false,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.alpha = args.alpha;

            Pipeline::validation().run(&mut ctx)?;
            print_validate_summary(&ctx)?;
        }
    }

    Ok(())
}

fn check_alpha(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        bail!("--alpha must be in (0, 1), got {}", alpha);
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let table = predict::load_feature_table(&args.features)?;
    let scaler = predict::load_standard_scaler(&args.scaler)?;
    let model = predict::load_linear_model(&args.model)?;
    tracing::info!(
        subjects = table.len(),
        features = table.feature_names.len(),
        model_features = model.coefficients.len(),
        "prediction inputs loaded"
    );

    let rows = predict::predict_brain_age(&table, &scaler, &model)?;
    predict::write_predictions(&args.out, &rows)?;
    println!("brainpad-stats predict ok");
    println!("subjects: {}", rows.len());
    println!("output: {}", args.out.display());
    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    print_warnings(ctx);
    Ok(())
}

fn print_validate_summary(ctx: &Ctx) -> Result<()> {
    let table = ctx.table()?;
    let cols = table.columns;
    println!("brainpad-stats validate ok");
    println!("subjects: {}", table.len());
    println!(
        "columns: age={} brain_age={} sex={} ais={} time_since_injury={} brainpad_derived={}",
        cols.age,
        cols.brain_age,
        cols.sex,
        cols.ais,
        cols.time_since_injury,
        cols.brain_pad_derived
    );
    for slice in NORMALITY_SLICES {
        match ctx.normality.get(slice) {
            Some(Ok(r)) => println!(
                "normality {}: n={} shapiro_p={:.4} ks_p={:.4} verdict={}",
                slice,
                r.n,
                r.shapiro.p_value,
                r.ks.p_value,
                r.verdict.as_str()
            ),
            Some(Err(err)) => println!("normality {}: not available ({})", slice, err),
            None => {}
        }
    }
    print_warnings(ctx);
    Ok(())
}

fn print_warnings(ctx: &Ctx) {
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
}
