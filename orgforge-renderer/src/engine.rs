//! Tera rendering engine — one embedded template per resource kind.
//!
//! # Template mapping
//!
//! | Kind                   | Template                        | Artifact                     |
//! |------------------------|---------------------------------|------------------------------|
//! | Repository             | `repository.tf.tera`            | `<name>_repository.tf`       |
//! | Team                   | `team.tf.tera`                  | `<name>_team.tf`             |
//! | Membership             | `membership.tf.tera`            | `<username>_membership.tf`   |
//! | RepositoryCollaborator | `repository_collaborator.tf.tera` | `<id>_collaborator.tf`     |
//!
//! Artifact names come from [`ResourceKind::artifact_name`]; this crate only
//! produces content.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use orgforge_core::types::{RecordMap, ResourceKind};

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("repository.tf.tera", include_str!("templates/repository.tf.tera")),
    ("team.tf.tera", include_str!("templates/team.tf.tera")),
    ("membership.tf.tera", include_str!("templates/membership.tf.tera")),
    (
        "repository_collaborator.tf.tera",
        include_str!("templates/repository_collaborator.tf.tera"),
    ),
];

/// Template name rendered for a given resource kind.
pub fn template_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Repository => "repository.tf.tera",
        ResourceKind::Team => "team.tf.tera",
        ResourceKind::Membership => "membership.tf.tera",
        ResourceKind::RepositoryCollaborator => "repository_collaborator.tf.tera",
    }
}

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path
            .strip_prefix(dir)
            .unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine rendering resource records into Terraform fragments.
///
/// `user_template_dir` may contain `.tera` files that override embedded
/// defaults. Template names are normalised to lowercase and relative paths.
/// Create once with [`TemplateEngine::new`] and reuse; the record map itself
/// is the template context, so every record field is addressable by name.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the Terraform fragment for one resource record.
    pub fn render(&self, kind: ResourceKind, record: &RecordMap) -> Result<String, RenderError> {
        let ctx = tera::Context::from_serialize(record)?;
        Ok(self.tera.render(template_name(kind), &ctx)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
