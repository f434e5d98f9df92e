//! Spark node: runs the handle registry and credential authority in process
//! and drives them from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spark_core::SparkService;
use spark_time::ManualClock;
use spark_types::TimeNs;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

mod config;
mod demo;
mod logging;
mod script;

use crate::config::{AppConfig, ClockMode, LogFormat};
use crate::logging::init_logging;
use crate::script::{parse_script, ScriptRunner};

#[derive(Parser)]
#[command(name = "spark-node")]
#[command(about = "Spark handle registry and credential authority", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the log level
    #[arg(
        long,
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        global = true
    )]
    log_level: Option<String>,

    /// Select log output format
    #[arg(long, value_name = "FORMAT", value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through registration, issuance, verification and revocation
    Demo,
    /// Execute a JSON script of calls, printing one result per line
    Run {
        /// Path to the script file
        script: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn load_config_with_overrides(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.log_level.as_deref(), cli.log_format);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config_with_overrides(&cli)?;
    init_logging(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Demo => {
            // The lifecycle walkthrough always runs on a fresh manual clock.
            let clock = ManualClock::shared(TimeNs(config.manual_clock_start_ns));
            let service = SparkService::with_config(&config.service_config(), clock.clone())
                .context("failed to start service")?;
            info!(seeded = config.seed_demo_data, "running demo scenario");
            demo::run(&service, clock, &mut out)?;
        }
        Commands::Run { script } => {
            let source = fs::read_to_string(script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let ops = parse_script(&source)?;

            let (clock, manual) = config.build_clock();
            let service = SparkService::with_config(&config.service_config(), clock)
                .context("failed to start service")?;
            info!(
                calls = ops.len(),
                manual_clock = config.clock == ClockMode::Manual,
                "running script"
            );
            ScriptRunner::new(&service, manual).run_all(&ops, &mut out)?;
        }
        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("failed to render configuration")?;
            write!(out, "{rendered}")?;
        }
    }

    out.flush()?;
    Ok(())
}
