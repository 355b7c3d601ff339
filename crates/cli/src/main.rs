//! stickflow - controller remapping loop CLI
//!
//! Validates configuration files, prints a starter config and runs the tick
//! loop against a logging sink for a fixed time.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod error;
mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stickflow_engine::{
    Engine, EngineEvent, InputUpdate, SharedInput, StickflowConfig, TracingSink,
    build_rule_chain,
};
use tracing::{info, warn};

use crate::error::CliError;
use crate::logging::{LoggingConfig, init_logging};

#[derive(Parser, Debug)]
#[command(name = "stickflow")]
#[command(about = "Fixed-rate controller remapping loop")]
#[command(version)]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a config and build its rule chain without running it
    Check {
        /// Config file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the factory config
    SampleConfig,

    /// Run the tick loop against a logging sink
    Run {
        /// Config file; the factory config when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// How long to run, in seconds
        #[arg(long, default_value_t = 5)]
        seconds: u64,

        /// Hold an input for the whole run, e.g. `R2=255` or `L1=1`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,

        /// Log every Nth output frame at debug level
        #[arg(long, default_value_t = 200)]
        log_every: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(LoggingConfig::from_verbosity(cli.verbose, cli.json_logs)) {
        eprintln!("{e}");
    }

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e, cli.json);
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute_command(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Check { config } => {
            let rules = check(config)?;
            output::print_rules(&rules, cli.json);
            Ok(())
        }
        Commands::SampleConfig => {
            println!("{}", StickflowConfig::sample().to_json_pretty()?);
            Ok(())
        }
        Commands::Run {
            config,
            seconds,
            overrides,
            log_every,
        } => {
            let config = match config {
                Some(path) => StickflowConfig::load(path)?,
                None => StickflowConfig::sample(),
            };
            let updates = overrides
                .iter()
                .map(|o| parse_override(o))
                .collect::<Result<Vec<_>, _>>()?;
            run(
                &config,
                &updates,
                Duration::from_secs(*seconds),
                *log_every,
                cli.json,
            )
        }
    }
}

/// Names of the rules `path` builds, in execution order.
fn check(path: &Path) -> Result<Vec<&'static str>, CliError> {
    let config = StickflowConfig::load(path)?;
    let chain = build_rule_chain(&config.macros)?;
    info!(
        path = %path.display(),
        tick_ms = config.tick_ms,
        rules = chain.len(),
        "config ok"
    );
    Ok(chain.names().collect())
}

fn parse_override(text: &str) -> Result<InputUpdate, CliError> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| CliError::InvalidInput(format!("expected NAME=VALUE, got '{text}'")))?;
    let value: i32 = value
        .trim()
        .parse()
        .map_err(|e| CliError::InvalidInput(format!("'{text}': {e}")))?;
    InputUpdate::from_named(name.trim(), value)
        .ok_or_else(|| CliError::InvalidInput(format!("unknown input '{}'", name.trim())))
}

fn run(
    config: &StickflowConfig,
    updates: &[InputUpdate],
    duration: Duration,
    log_every: u64,
    json: bool,
) -> Result<(), CliError> {
    let chain = build_rule_chain(&config.macros)?;
    let input = Arc::new(SharedInput::new());
    if !updates.is_empty() {
        input.apply_batch(updates);
    }

    let mut engine = Engine::new(config, Arc::clone(&input));
    let events = engine.events();
    engine.start(chain, TracingSink::new(log_every))?;
    thread::sleep(duration);
    engine.stop()?;

    for event in events.try_iter() {
        if let EngineEvent::Resynced { tick, dropped } = event {
            warn!(tick, dropped, "loop resynchronised during run");
        }
    }

    let counters = engine.counters().snapshot();
    match engine.last_report() {
        Some(report) => output::print_report(report, &counters, json),
        None => warn!("tick loop produced no report"),
    }
    Ok(())
}
