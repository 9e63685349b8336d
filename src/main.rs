//! @ai:module:intent CLI for the benchmark harness
//! @ai:module:layer presentation

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sweet_harness::{
    config::HarnessConfig, driver::Driver, harness::CockroachDb, toolchain::ToolchainCheck,
    Harness,
};

#[derive(Parser)]
#[command(name = "sweet-harness")]
#[command(about = "Fetch, build and run the CockroachDB benchmark workload")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the Go toolchain root
    #[arg(long)]
    go_root: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    /// Run the reduced variant set
    #[arg(long)]
    short: bool,

    /// Results file (default: <results_dir>/<timestamp>/cockroachdb.results)
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Arguments passed through to the benchmark driver
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check host architecture and required tools
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Clone the workload source at its pinned revision
    Get {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Build the workload and the benchmark driver
    Build {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Run the benchmark variants
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Get, build and run
    All {
        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "harness.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sweet_harness=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => check(config),
        Commands::Get { config } => make_driver(config, None)?.get(),
        Commands::Build { config } => make_driver(config, None)?.build(),
        Commands::Run { config, run } => {
            let results = run.results.clone();
            let driver = make_driver(config, Some(run))?;
            let results = results.unwrap_or_else(|| driver.results_path(chrono::Utc::now()));
            driver.run(&results).await
        }
        Commands::All { config, run } => {
            let results = run.results.clone();
            let driver = make_driver(config, Some(run))?;
            let results = results.unwrap_or_else(|| driver.results_path(chrono::Utc::now()));
            driver.all(&results).await
        }
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Load config, apply CLI overrides
/// @ai:effects fs:read
fn load_config(args: ConfigArgs, run: Option<RunArgs>) -> Result<HarnessConfig> {
    let mut config = match args.config {
        Some(path) => HarnessConfig::load(&path)?,
        None => HarnessConfig::default(),
    };

    if let Some(go_root) = args.go_root {
        config.toolchain.go_root = go_root;
    }

    if let Some(run) = run {
        config.run.short |= run.short;
        config.run.args.extend(run.args);
    }

    Ok(config)
}

fn make_driver(args: ConfigArgs, run: Option<RunArgs>) -> Result<Driver<CockroachDb>> {
    Ok(Driver::new(CockroachDb::new(), load_config(args, run)?))
}

/// @ai:intent Report host support and missing tools
/// @ai:effects io
fn check(args: ConfigArgs) -> Result<()> {
    let config = load_config(args, None)?;
    let harness = CockroachDb::new();

    harness.check_prerequisites()?;
    tracing::info!("{}: host architecture supported", harness.name());

    let status = ToolchainCheck::validate(&config.toolchain.go_root);
    ToolchainCheck::log_warnings(&status);

    if status.is_complete() {
        tracing::info!("All required tools found");
    }

    Ok(())
}

/// @ai:intent Write a default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    HarnessConfig::default().save(&output)?;
    tracing::info!("Wrote default configuration to {}", output.display());
    Ok(())
}
