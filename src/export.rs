//! Loading the help-center export from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{Article, Category, Section};

const CATEGORIES_FILE: &str = "categories.json";
const SECTIONS_FILE: &str = "sections.json";
const ARTICLES_FILE: &str = "articles.json";
const MANIFEST_FILE: &str = "manifest.json";

/// The three ordered entity collections plus the export manifest.
#[derive(Debug, Clone, Default)]
pub struct ExportSnapshot {
  /// Categories in export order.
  pub categories: Vec<Category>,
  /// Sections in export order.
  pub sections: Vec<Section>,
  /// Articles in export order.
  pub articles: Vec<Article>,
  /// Exporter manifest, kept verbatim.
  pub manifest: Value,
}

impl ExportSnapshot {
  /// Read every export file from `export_dir`. Any missing or malformed file aborts the load.
  pub fn load(export_dir: &Path) -> Result<Self> {
    Ok(Self {
      categories: load_json(&export_dir.join(CATEGORIES_FILE))?,
      sections: load_json(&export_dir.join(SECTIONS_FILE))?,
      articles: load_json(&export_dir.join(ARTICLES_FILE))?,
      manifest: load_json(&export_dir.join(MANIFEST_FILE))?,
    })
  }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("export file not found at {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse export file {}", path.display()))
}
