//! `orgforge apply` — render .tf fragments and remove deleted artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use orgforge_core::{Config, DesiredSource, DesiredState};
use orgforge_sync::{pipeline, PipelineOutcome, RemoveResult, WriteResult};

/// Arguments for `orgforge apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the orgforge config file.
    #[arg(long, default_value = "config/config.yaml")]
    pub config: PathBuf,

    /// Override the configured output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Show what would change without writing or removing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyArgs {
    pub fn run(self) -> Result<()> {
        let config = Config::load(&self.config)
            .with_context(|| {
                format!(
                    "failed to load config '{}' — run `orgforge init` first",
                    self.config.display()
                )
            })?
            .with_output_dir(self.output_dir);

        let desired = DesiredState::parse(&DesiredSource::from_env(), &config)
            .context("failed to parse desired resources from environment")?;

        let outcome = pipeline::run(&config, &desired, self.dry_run).context("apply failed")?;
        print_outcome(&outcome, self.dry_run);

        for failure in &outcome.report.failed_removals {
            eprintln!(
                "✗ could not remove {} '{}': {}",
                failure.kind, failure.key, failure.error
            );
        }

        Ok(())
    }
}

fn print_outcome(outcome: &PipelineOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let report = &outcome.report;

    if outcome.changes.is_empty() {
        println!("{prefix}✓ nothing to do");
        return;
    }

    println!(
        "{prefix}✓ applied ({} written, {} unchanged, {} removed)",
        report.written() + report.would_write(),
        report.unchanged(),
        report.removed() + report.would_remove(),
    );

    for write in &report.writes {
        match write {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
    for removal in &report.removals {
        match removal {
            RemoveResult::Removed { path } => println!("  ✗  {}", path.display()),
            RemoveResult::WouldRemove { path } => println!("  ~  {}", path.display()),
            RemoveResult::Missing { path } => println!("  ·  {}", path.display()),
        }
    }
}
