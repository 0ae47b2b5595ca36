//! `orgforge plan` — show what apply would change, without writing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use orgforge_core::{Config, DesiredSource, DesiredState};
use orgforge_sync::{pipeline, plan_changes};

/// Arguments for `orgforge plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the orgforge config file.
    #[arg(long, default_value = "config/config.yaml")]
    pub config: PathBuf,

    /// Override the configured output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl PlanArgs {
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

        let (_, changes) = pipeline::compute_changes(&config, &desired)
            .context("failed to compute resource changes")?;
        let report = plan_changes(&config, &changes).context("plan failed")?;

        if report.is_empty() {
            println!("No changes.");
            return Ok(());
        }

        for diff in &report.diffs {
            print_colored_diff(&diff.unified_diff);
        }
        for path in &report.pending_removals {
            println!("{}", format!("would remove: {}", path.display()).red());
        }
        for path in &report.missing_removals {
            println!(
                "{}",
                format!("already absent: {}", path.display()).bright_black()
            );
        }

        Ok(())
    }
}

fn print_colored_diff(unified: &str) {
    for line in unified.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}
