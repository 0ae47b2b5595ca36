//! Orgforge — declarative GitHub org resources as Terraform fragments.
//!
//! # Usage
//!
//! ```text
//! orgforge init [--config <path>] [--output-dir <path>] [--force]
//! orgforge plan [--config <path>] [--output-dir <path>]
//! orgforge apply [--config <path>] [--output-dir <path>] [--dry-run]
//! orgforge state [--config <path>] [--output-dir <path>] [--json]
//! ```
//!
//! Desired resources are read from the `REPOSITORIES`, `TEAMS`, `MEMBERSHIPS`
//! and `REPOSITORY_COLLABORATORS` environment variables as JSON lists; unset
//! variables mean "no resources of that kind requested".

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{apply::ApplyArgs, init::InitArgs, plan::PlanArgs, state::StateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "orgforge",
    version,
    about = "Reconcile desired GitHub org resources against Terraform state",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffold an orgforge config file and an empty Terraform state.
    Init(InitArgs),

    /// Show what apply would change, as unified diffs, without writing.
    Plan(PlanArgs),

    /// Render .tf fragments for added and changed resources, remove deleted ones.
    Apply(ApplyArgs),

    /// Show the resources recorded in the Terraform state snapshot.
    State(StateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Apply(args) => args.run(),
        Commands::State(args) => args.run(),
    }
}

// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
