// ABOUTME: Entry point for the deckhand CLI application.
// ABOUTME: Parses arguments, loads configuration, and dispatches lifecycle operations.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, TargetArgs};
use deckhand::config::{self, CONFIG_FILENAME, Config, LoadedConfig, LogLevel};
use deckhand::deploy::{CancelHandle, OverallStatus};
use deckhand::dispatch::{DispatchError, Dispatcher};
use deckhand::error::{Error, Result};
use deckhand::invocation::Flags;
use deckhand::output::{Output, OutputMode};
use deckhand::runtime::{CaptureMode, ProcessBackend, resolve_backend};
use deckhand::types::Operation;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut output = Output::new(cli.output_mode());
    output.start_timer();

    if let Err(e) = run(&cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

/// `--verbose` wins, then `RUST_LOG`, then the environment's configured level.
fn init_tracing(verbose: bool, level: Option<LogLevel>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or_default().as_filter()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;

    if let Commands::Init { project, force } = &cli.command {
        init_tracing(cli.verbose, None);
        config::init_config(&cwd, project.as_deref(), *force)?;
        output.success(&format!("Created {}", CONFIG_FILENAME));
        return Ok(());
    }

    let Some((operation, target, build)) = cli.command.operation() else {
        return Ok(());
    };

    let loaded = load_config(cli.config.as_deref(), &cwd)?;
    let environment = target
        .env
        .clone()
        .unwrap_or_else(|| loaded.config.default_environment.to_string());

    init_tracing(cli.verbose, loaded.config.log_level_for(&environment));
    match &loaded.source {
        Some(path) => tracing::debug!("using configuration {}", path.display()),
        None => tracing::debug!("using built-in topology"),
    }

    deploy(cli, output, loaded, &environment, operation, target, build).await
}

fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => Config::load_explicit(&std::path::absolute(path)?),
        None => Config::discover_or_builtin(cwd),
    }
}

async fn deploy(
    cli: &Cli,
    output: &Output,
    loaded: LoadedConfig,
    environment: &str,
    operation: Operation,
    target: &TargetArgs,
    build: bool,
) -> Result<()> {
    let runtime = resolve_backend(&loaded.config.backend);
    tracing::debug!("using {} ({})", runtime.runtime_type, runtime.binary);

    let capture = match output.mode() {
        OutputMode::Json => CaptureMode::Buffer,
        OutputMode::Normal | OutputMode::Quiet => CaptureMode::Stream,
    };

    let (cancel, signal) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current phase");
            cancel.cancel();
        }
    });

    let dispatcher = Dispatcher::new(loaded, runtime, ProcessBackend::new())
        .capture(capture)
        .cancel_signal(signal);

    let flags = Flags {
        force: target.force,
        verbose: cli.verbose,
        build,
    };

    output.progress(&format!("→ {} {}", operation, environment));

    match dispatcher
        .dispatch(environment, operation, &target.services, flags)
        .await
    {
        Ok(report) => {
            output.report(&report);
            match report.overall_status() {
                OverallStatus::Success => Ok(()),
                _ if report.cancelled => Err(Error::Cancelled(operation)),
                status => Err(Error::OperationFailed { operation, status }),
            }
        }
        Err(e) => {
            if let DispatchError::Execution { partial, .. } = &e {
                output.report(partial);
            }
            Err(e.into())
        }
    }
}
