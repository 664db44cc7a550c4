use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

mod commands;
mod report;

use commands::{DemoArgs, EvalArgs, FeaturesArgs, OverrideArgs, SimulateArgs, SweepArgs};

#[derive(Parser)]
#[command(name = "newsalpha")]
#[command(about = "News sentiment signal evaluation and backtesting pipeline", long_about = None)]
struct Cli {
    /// Config file path (TOML or JSON); CLI flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate scored news items into the daily feature table
    Features(FeaturesArgs),
    /// Compute the IC, permutation p-value and burst-day event study
    Eval(EvalArgs),
    /// Simulate the lagged long/short strategy with slippage
    Simulate(SimulateArgs),
    /// Sweep strategy parameters over the saved merged table
    Sweep(SweepArgs),
    /// Run features, eval, simulate and sweep end to end
    Demo(DemoArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging, optionally into a file
    if let Some(path) = &cli.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let config = commands::load_config(cli.config.as_deref(), &cli.overrides)?;
    tracing::info!("Targeting {} tickers", config.tickers.len());

    let start = Instant::now();
    match cli.command {
        Commands::Features(args) => {
            commands::run_features(args, &config).await?;
        }
        Commands::Eval(args) => {
            commands::run_eval(args, &config).await?;
        }
        Commands::Simulate(args) => {
            commands::run_simulate(args, &config).await?;
        }
        Commands::Sweep(args) => {
            commands::run_sweep_stage(args, &config).await?;
        }
        Commands::Demo(args) => {
            commands::run_demo(args, &config).await?;
        }
    }
    tracing::info!("Pipeline finished in {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
