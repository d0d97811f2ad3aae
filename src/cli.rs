// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use deckhand::output::OutputMode;
use deckhand::types::Operation;

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "Environment-aware compose orchestration with ordered startup and health checks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging and verbose backend output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print the deployment report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file (default: discover deckhand.yml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deckhand.yml configuration file
    Init {
        /// Compose project name (default: directory name)
        #[arg(long)]
        project: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Build service images
    Build(TargetArgs),

    /// Start infrastructure, wait for it to settle, then start applications
    Up {
        #[command(flatten)]
        target: TargetArgs,

        /// Build images before starting
        #[arg(long)]
        build: bool,
    },

    /// Stop and remove services
    Down(TargetArgs),

    /// Restart services
    Restart(TargetArgs),

    /// Show recent service logs
    Logs(TargetArgs),

    /// Show service status and run health probes
    Status(TargetArgs),

    /// Tear down the project and prune its images (and volumes with --force)
    Clean(TargetArgs),
}

/// Options shared by every lifecycle command.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target environment: dev, staging or prod (default from config)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Comma-separated subset of services
    #[arg(short, long, value_delimiter = ',', value_name = "NAMES")]
    pub services: Vec<String>,

    /// Disable build caches; remove volumes on teardown
    #[arg(long)]
    pub force: bool,
}

impl Commands {
    /// The lifecycle operation, its target, and whether to build first.
    pub fn operation(&self) -> Option<(Operation, &TargetArgs, bool)> {
        match self {
            Commands::Init { .. } => None,
            Commands::Build(t) => Some((Operation::Build, t, false)),
            Commands::Up { target, build } => Some((Operation::Up, target, *build)),
            Commands::Down(t) => Some((Operation::Down, t, false)),
            Commands::Restart(t) => Some((Operation::Restart, t, false)),
            Commands::Logs(t) => Some((Operation::Logs, t, false)),
            Commands::Status(t) => Some((Operation::Status, t, false)),
            Commands::Clean(t) => Some((Operation::Clean, t, false)),
        }
    }
}
