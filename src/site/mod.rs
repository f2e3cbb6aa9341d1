//! Offline site generation orchestrator.

pub mod assets;
pub mod layout;
pub mod pages;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use tracing::info;

use crate::config::SiteConfig;
use crate::export::ExportSnapshot;
use crate::fetch::Fetch;
use crate::mirror::{
  MirrorStats, install_exported_attachments, mirror_article, seed_exported_attachments,
};
use crate::models::{
  ArticleAttachmentSummary, AttachmentLedger, EntityCounts, SiteManifestSummary,
};
use crate::resolver::{ContentResolver, RewriteRules};

use self::assets::{SEARCH_INDEX_PATH, write_site_file, write_static_assets};
use self::pages::{PageRenderer, category_page, section_page};

const SITE_MANIFEST_FILE: &str = "site_manifest.json";

/// What a generation run produced.
#[derive(Debug)]
pub struct SiteReport {
  /// Root directory of the generated site.
  pub output_dir: PathBuf,
  /// HTML pages written, relative to the output directory.
  pub pages: Vec<String>,
  /// Files installed from the export's attachments directory.
  pub installed_attachments: usize,
  /// Attachment outcomes across all articles.
  pub attachments: MirrorStats,
}

/// High-level helper turning an export snapshot into a static site.
pub struct SiteBuilder<'a> {
  config: &'a SiteConfig,
  snapshot: &'a ExportSnapshot,
}

impl<'a> SiteBuilder<'a> {
  /// Create a builder for a loaded export.
  pub fn new(config: &'a SiteConfig, snapshot: &'a ExportSnapshot) -> Self {
    Self { config, snapshot }
  }

  /// Mirror attachments, render every page and write the site manifest.
  pub fn build<F: Fetch + ?Sized>(&self, fetcher: &F) -> Result<SiteReport> {
    let config = self.config;
    let snapshot = self.snapshot;
    let output_dir = config.output_path();
    let attachments_dir = config.output_attachments_path();

    fs::create_dir_all(&output_dir)
      .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let installed_attachments =
      install_exported_attachments(&config.export_attachments_path(), &attachments_dir)?;
    info!("Installed {} exported attachments", installed_attachments);

    let resolver = ContentResolver::from_snapshot(
      snapshot,
      RewriteRules::for_host(&config.attachment_host),
    );
    let mut ledger = AttachmentLedger::new();
    let seeded = seed_exported_attachments(
      &resolver,
      &snapshot.articles,
      &attachments_dir,
      &mut ledger,
    );
    if seeded > 0 {
      info!("Reusing {} attachments recorded by the exporter", seeded);
    }

    let mut attachments = MirrorStats::default();
    for article in &snapshot.articles {
      if article.body.is_empty() {
        continue;
      }
      info!("Processing attachments for article: {}", article.title);
      attachments += mirror_article(&resolver, fetcher, article, &attachments_dir, &mut ledger)?;
    }

    info!("Creating CSS and JavaScript...");
    write_static_assets(&output_dir)?;

    let now = Local::now();
    let renderer = PageRenderer::new(config, &resolver, &ledger, now.year());
    write_site_file(
      &output_dir,
      SEARCH_INDEX_PATH,
      &renderer.search_index_script(&snapshot.articles)?,
    )?;

    let mut pages = Vec::new();
    let mut emit = |name: String, html: String| -> Result<()> {
      write_site_file(&output_dir, &name, &html)?;
      pages.push(name);
      Ok(())
    };

    info!("Creating homepage...");
    emit(
      "index.html".into(),
      renderer.homepage(&snapshot.categories, &snapshot.articles),
    )?;

    info!("Creating category pages...");
    for category in &snapshot.categories {
      emit(category_page(category.id), renderer.category_page(category))?;
    }

    info!("Creating section pages...");
    for section in &snapshot.sections {
      emit(section_page(section.id), renderer.section_page(section))?;
    }

    info!("Creating article pages...");
    for article in &snapshot.articles {
      emit(article.page_name(), renderer.article_page(article))?;
    }

    info!("Creating index pages...");
    emit(
      "categories.html".into(),
      renderer.categories_index(&snapshot.categories),
    )?;
    emit(
      "articles.html".into(),
      renderer.articles_index(&snapshot.articles),
    )?;
    emit("videos.html".into(), renderer.videos_page(&snapshot.articles))?;

    let summary = SiteManifestSummary {
      generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
      counts: EntityCounts {
        categories: snapshot.categories.len(),
        sections: snapshot.sections.len(),
        articles: snapshot.articles.len(),
      },
      pages: pages.clone(),
      attachments: ledger
        .articles()
        .map(|(article_id, entries)| ArticleAttachmentSummary {
          article_id,
          attachments: entries.to_vec(),
        })
        .collect(),
      failed_attachments: ledger.failures().to_vec(),
    };
    write_site_file(
      &output_dir,
      SITE_MANIFEST_FILE,
      &serde_json::to_string_pretty(&summary)?,
    )?;

    Ok(SiteReport {
      output_dir,
      pages,
      installed_attachments,
      attachments,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fetch::{FetchError, FetchedResource};
  use crate::models::{Article, Category, Section};
  use serde_json::Value;
  use tempfile::tempdir;

  fn snapshot() -> ExportSnapshot {
    ExportSnapshot {
      categories: vec![Category {
        id: 1,
        name: "Setup".into(),
        description: None,
      }],
      sections: vec![Section {
        id: 10,
        name: "Getting Started".into(),
        description: None,
        category_id: 1,
      }],
      articles: vec![Article {
        id: 100,
        title: "Install".into(),
        body: concat!(
          "<img src='https://support.example.co/hc/article_attachments/555' alt='Step One'>",
          "<img src='https://support.example.co/hc/article_attachments/556' alt='Gone'>",
        )
        .into(),
        section_id: 10,
        updated_at: "2025-01-01T00:00:00Z".into(),
        downloaded_attachments: Vec::new(),
      }],
      manifest: Value::Null,
    }
  }

  #[test]
  fn builds_complete_site_from_example_export() {
    let dir = tempdir().unwrap();
    let config = SiteConfig {
      export_dir: dir.path().join("export").to_string_lossy().into_owned(),
      output_dir: dir.path().join("site").to_string_lossy().into_owned(),
      ..SiteConfig::default()
    };
    let snapshot = snapshot();
    let fetcher = |url: &str| -> Result<FetchedResource, FetchError> {
      if url.ends_with("555") {
        Ok(FetchedResource {
          bytes: b"png".to_vec(),
          content_type: Some("image/png".into()),
        })
      } else {
        Err(FetchError::Status {
          url: url.to_string(),
          status: 500,
        })
      }
    };

    let report = SiteBuilder::new(&config, &snapshot).build(&fetcher).unwrap();
    assert_eq!(report.attachments, MirrorStats {
      downloaded: 1,
      reused: 0,
      failed: 1
    });
    assert_eq!(report.pages, vec![
      "index.html",
      "category_1.html",
      "section_10.html",
      "article_100.html",
      "categories.html",
      "articles.html",
      "videos.html",
    ]);

    let site = dir.path().join("site");
    assert!(site.join("attachments/100_1_Step_One.png").is_file());
    assert!(site.join("css/style.css").is_file());
    assert!(site.join("js/main.js").is_file());
    assert!(site.join("js/search-index.js").is_file());

    let article = fs::read_to_string(site.join("article_100.html")).unwrap();
    assert!(article.contains("src='attachments/100_1_Step_One.png'"));
    assert!(article.contains("https://support.example.co/hc/article_attachments/556"));

    let manifest: Value =
      serde_json::from_str(&fs::read_to_string(site.join(SITE_MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["counts"]["articles"], 1);
    assert_eq!(manifest["failed_attachments"][0]["article_id"], 100);
    assert_eq!(
      manifest["attachments"][0]["attachments"][0]["file_name"],
      "100_1_Step_One.png"
    );
  }
}
