//! `rabbit` - command-line console for the RabbitRelay billing relay.
//!
//! # Architecture
//!
//! ```text
//! main() -> Cli::parse() -> open_client() -> commands::run() -> Output::print()
//!                               |
//!                               v
//!              BuildEnv (env + config file + flags) + LocalStore -> ApiClient
//! ```
//!
//! Every subcommand is one backend call or one local workflow. Results go to
//! stdout as pretty JSON (or raw CSV for CSV reports). Errors go to stderr
//! verbatim, followed by an optional hint, and exit non-zero.

mod commands;
mod output;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rabbit_client::{ApiClient, ApiError};
use rabbit_config::{BuildEnv, ConsoleConfig, EnvOverrides, KeyValueStore, LocalStore};

use crate::commands::Command;

#[derive(Parser)]
#[command(name = "rabbit")]
#[command(about = "Console for the RabbitRelay AI API billing relay")]
#[command(version)]
struct Cli {
    /// Enable debug affordances: local API base override and dev credentials
    #[arg(long, global = true)]
    debug: bool,

    /// Copy the build API base into the local store before running
    #[arg(long, global = true)]
    write_env: bool,

    /// Backend origin for this invocation, e.g. `localhost:8000`
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    /// Local store file (defaults to ~/.rabbit/local.toml)
    #[arg(long, global = true, env = "RABBIT_STORE", value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Build the client from the environment, the config file and `cli` flags.
fn open_client(cli: &Cli) -> Result<ApiClient> {
    let config = ConsoleConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring config at {:?}: {}", e.path(), e);
        None
    });
    let env = BuildEnv::from_process(config.as_ref().and_then(ConsoleConfig::app))
        .with_overrides(&EnvOverrides {
            debug: cli.debug,
            write_env: cli.write_env,
            api_base: cli.api_base.clone(),
        });

    let store: Arc<dyn KeyValueStore> = match &cli.store {
        Some(path) => Arc::new(
            LocalStore::open(path)
                .with_context(|| format!("opening local store {}", path.display()))?,
        ),
        None => Arc::new(LocalStore::open_default().context("opening local store")?),
    };

    rabbit_config::write_env_on_start(&env, store.as_ref());
    tracing::debug!(debug = env.debug(), api_base = %env.api_base(), "Console ready");

    Ok(ApiClient::new(env, store))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("RABBIT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Stdout carries command output, so the last resort is stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.rabbit/logs/rabbit.log
    if let Some(dir) = rabbit_config::rabbit_dir() {
        candidates.push(dir.join("logs").join("rabbit.log"));
    }

    // Fallback: ./.rabbit/logs/rabbit.log
    candidates.push(PathBuf::from(".rabbit").join("logs").join("rabbit.log"));

    candidates
}

/// Print `err` verbatim, then a hint when one applies.
fn report(err: &anyhow::Error, debug: bool) {
    eprintln!("{err}");
    let hint = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(|api_err| rabbit_core::errors::hint_for(api_err, debug));
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let client = match open_client(&cli) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("Startup failed: {err:#}");
            eprintln!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&client, cli.command).await {
        Ok(output) => {
            output.print();
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Command failed: {err:#}");
            report(&err, client.debug());
            ExitCode::FAILURE
        }
    }
}
