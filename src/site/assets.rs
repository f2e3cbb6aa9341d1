//! Static stylesheet and script shipped with every generated site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const STYLESHEET: &str = include_str!("static/style.css");
const MAIN_SCRIPT: &str = include_str!("static/main.js");

/// Stylesheet path relative to the site root.
pub const STYLESHEET_PATH: &str = "css/style.css";
/// Main script path relative to the site root.
pub const MAIN_SCRIPT_PATH: &str = "js/main.js";
/// Generated search index path relative to the site root.
pub const SEARCH_INDEX_PATH: &str = "js/search-index.js";

/// Write the stylesheet and main script below `site_root`.
pub fn write_static_assets(site_root: &Path) -> Result<()> {
  write_site_file(site_root, STYLESHEET_PATH, STYLESHEET)?;
  write_site_file(site_root, MAIN_SCRIPT_PATH, MAIN_SCRIPT)?;
  Ok(())
}

/// Write `contents` to `relative` inside `site_root`, creating parent directories.
pub fn write_site_file(site_root: &Path, relative: &str, contents: &str) -> Result<()> {
  let target = site_root.join(relative);
  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(&target, contents).with_context(|| format!("failed to write {}", target.display()))
}
