//! `orgforge state` — inspect what the Terraform state snapshot contains.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use orgforge_core::{key_string, state, Config, ExtractedState, RecordMap, ResourceKind};

/// Arguments for `orgforge state`.
#[derive(Args, Debug)]
pub struct StateArgs {
    /// Path to the orgforge config file.
    #[arg(long, default_value = "config/config.yaml")]
    pub config: PathBuf,

    /// Override the configured output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StateJson<'a> {
    summary: StateSummary,
    resources: &'a ExtractedState,
}

#[derive(Serialize)]
struct StateSummary {
    repositories: usize,
    teams: usize,
    memberships: usize,
    repository_collaborators: usize,
    total: usize,
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "attributes")]
    attributes: String,
}

impl StateArgs {
    pub fn run(self) -> Result<()> {
        let config = Config::load(&self.config)
            .with_context(|| {
                format!(
                    "failed to load config '{}' — run `orgforge init` first",
                    self.config.display()
                )
            })?
            .with_output_dir(self.output_dir);

        let tfstate_path = config.tfstate_path();
        let tfstate = state::load_tfstate(&tfstate_path)
            .with_context(|| format!("failed to load '{}'", tfstate_path.display()))?;
        let extracted = state::extract_resources(&tfstate)
            .context("failed to extract resources from terraform state")?;

        if self.json {
            print_json(&extracted)?;
            return Ok(());
        }

        print_table(&extracted);
        Ok(())
    }
}

fn print_json(extracted: &ExtractedState) -> Result<()> {
    let payload = StateJson {
        summary: StateSummary {
            repositories: extracted.repositories.len(),
            teams: extracted.teams.len(),
            memberships: extracted.memberships.len(),
            repository_collaborators: extracted.repository_collaborators.len(),
            total: extracted.total(),
        },
        resources: extracted,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize state JSON")?
    );
    Ok(())
}

fn print_table(extracted: &ExtractedState) {
    println!(
        "Orgforge v{} | {} repositories | {} teams | {} memberships | {} collaborators",
        env!("CARGO_PKG_VERSION"),
        extracted.repositories.len(),
        extracted.teams.len(),
        extracted.memberships.len(),
        extracted.repository_collaborators.len(),
    );

    if extracted.total() == 0 {
        println!("No resources in state.");
        return;
    }

    let mut rows = Vec::new();
    for kind in ResourceKind::all() {
        for record in extracted.collection(*kind) {
            rows.push(ResourceRow {
                kind: kind.to_string(),
                key: record_key_cell(*kind, record),
                attributes: attribute_cell(*kind, record),
            });
        }
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn record_key_cell(kind: ResourceKind, record: &RecordMap) -> String {
    record
        .get(kind.unique_key())
        .map(key_string)
        .unwrap_or_else(|| "?".to_string())
}

fn attribute_cell(kind: ResourceKind, record: &RecordMap) -> String {
    record
        .iter()
        .filter(|(name, _)| name.as_str() != kind.unique_key())
        .map(|(name, value)| format!("{name}={}", key_string(value)))
        .collect::<Vec<_>>()
        .join(", ")
}
