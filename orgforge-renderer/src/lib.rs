//! # orgforge-renderer
//!
//! Tera-based template engine that renders resource records into per-resource
//! Terraform fragments.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orgforge_core::types::{RecordMap, ResourceKind};
//! use orgforge_renderer::TemplateEngine;
//!
//! fn render_one(record: &RecordMap) {
//!     if let Ok(engine) = TemplateEngine::new(None) {
//!         if let Ok(content) = engine.render(ResourceKind::Repository, record) {
//!             println!("{} bytes", content.len());
//!         }
//!     }
//! }
//! ```

pub mod engine;
pub mod error;

pub use engine::{template_name, TemplateEngine};
pub use error::RenderError;
