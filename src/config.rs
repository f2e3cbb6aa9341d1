//! Site configuration describing where the export lives and how the offline site looks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "helpdesk.config.json";

/// Discoverable configuration for a generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
  /// Directory holding `categories.json`, `sections.json`, `articles.json` and `manifest.json`.
  pub export_dir: String,
  /// Directory the static site is written to.
  pub output_dir: String,
  /// Directory name used for attachments, both in the export and in the output.
  pub attachments_dir_name: String,
  /// Brand shown in page titles and the header.
  pub site_name: String,
  /// Subtitle shown under the brand.
  pub tagline: String,
  /// Host serving `/hc/article_attachments/<id>` URLs.
  pub attachment_host: String,
  /// Maximum number of related articles listed under an article.
  pub related_limit: usize,
  /// Number of recently updated articles on the homepage.
  pub recent_limit: usize,
  /// Per-request timeout for attachment downloads, in seconds.
  pub fetch_timeout_secs: u64,
  /// User agent sent when downloading attachments.
  pub user_agent: String,
  /// Footer line. `{year}` expands to the current year.
  pub footer_text: String,
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      export_dir: "zendesk_export".into(),
      output_dir: "offline_help_center".into(),
      attachments_dir_name: "attachments".into(),
      site_name: "Help Center".into(),
      tagline: "Your complete guide, available offline".into(),
      attachment_host: "support.example.co".into(),
      related_limit: 3,
      recent_limit: 6,
      fetch_timeout_secs: 30,
      user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
      footer_text: "© {year} Help Center. All rights reserved.".into(),
    }
  }
}

impl SiteConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unparsable file falls back to the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Read configuration from a file the operator named explicitly; failures are errors.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config {}", path.display()))
  }

  /// Directory holding the export files.
  pub fn export_path(&self) -> PathBuf {
    PathBuf::from(&self.export_dir)
  }

  /// Root of the generated site.
  pub fn output_path(&self) -> PathBuf {
    PathBuf::from(&self.output_dir)
  }

  /// Attachments shipped with the export.
  pub fn export_attachments_path(&self) -> PathBuf {
    self.export_path().join(&self.attachments_dir_name)
  }

  /// Attachments inside the generated site.
  pub fn output_attachments_path(&self) -> PathBuf {
    self.output_path().join(&self.attachments_dir_name)
  }

  /// Timeout applied to each attachment request.
  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }

  /// Footer text with `{year}` substituted.
  pub fn footer_for_year(&self, year: i32) -> String {
    self.footer_text.replace("{year}", &year.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn falls_back_to_defaults_without_config_file() {
    let dir = tempdir().unwrap();
    let config = SiteConfig::discover(dir.path());
    assert_eq!(config.related_limit, 3);
    assert_eq!(config.attachments_dir_name, "attachments");
  }

  #[test]
  fn merges_partial_config_with_defaults() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(DEFAULT_CONFIG_FILE),
      r#"{"site_name": "Acme Help", "attachment_host": "help.acme.test"}"#,
    )
    .unwrap();

    let config = SiteConfig::discover(dir.path());
    assert_eq!(config.site_name, "Acme Help");
    assert_eq!(config.attachment_host, "help.acme.test");
    assert_eq!(config.recent_limit, 6);
  }

  #[test]
  fn explicit_config_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = SiteConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
  }

  #[test]
  fn expands_year_in_footer() {
    let config = SiteConfig::default();
    assert_eq!(
      config.footer_for_year(2025),
      "© 2025 Help Center. All rights reserved."
    );
  }
}
