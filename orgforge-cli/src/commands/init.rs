//! `orgforge init` — scaffold a config file and an empty Terraform state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use orgforge_core::{state, Config, TfState};

/// Arguments for `orgforge init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the config file.
    #[arg(long, default_value = "config/config.yaml")]
    pub config: PathBuf,

    /// Artifact directory recorded in the scaffolded config.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Overwrite an existing config file and Terraform state.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let config = if self.config.exists() && !self.force {
            println!("· config already exists: {}", self.config.display());
            Config::load(&self.config)
                .with_context(|| format!("failed to load config '{}'", self.config.display()))?
                .with_output_dir(self.output_dir)
        } else {
            let config = Config::default().with_output_dir(self.output_dir);
            config
                .save(&self.config)
                .with_context(|| format!("failed to write config '{}'", self.config.display()))?;
            println!("✓ wrote config: {}", self.config.display());
            config
        };

        let tfstate = config.tfstate_path();
        if tfstate.exists() && !self.force {
            println!("· terraform state already exists: {}", tfstate.display());
        } else {
            state::save_tfstate(&TfState::empty(), &tfstate).with_context(|| {
                format!("failed to write terraform state '{}'", tfstate.display())
            })?;
            println!("✓ wrote empty terraform state: {}", tfstate.display());
        }

        Ok(())
    }
}
