//! Command-line driver for the petrel analysis.

mod input;

use clap::Parser;
use miette::IntoDiagnostic;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use petrel_engine::{render_report, run_analysis, AnalysisOptions};

#[derive(Parser)]
#[command(name = "petrel")]
#[command(about = "Strategy synthesis for consumption MDPs with a bounded resource")]
#[command(version)]
struct Cli {
    /// Path to the JSON model file
    model: PathBuf,

    /// Where to write the plain-text report (also printed to stdout)
    #[arg(long, short = 'o', default_value = "petrel-output.txt")]
    output: PathBuf,

    /// Skip validating the counter selector on the product MDP
    #[arg(long, default_value_t = false)]
    no_validate: bool,
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (cmdp, capacity) = input::load_model(&cli.model)?;
    info!(model = %cli.model.display(), capacity, "loaded model");
    println!("capacity = {capacity}");

    let options = AnalysisOptions {
        validate: !cli.no_validate,
    };
    let report = run_analysis(&cmdp, capacity, &options).into_diagnostic()?;

    let text = render_report(&report);
    print!("{text}");
    std::fs::write(&cli.output, &text).into_diagnostic()?;
    info!(output = %cli.output.display(), "report written");
    Ok(())
}
