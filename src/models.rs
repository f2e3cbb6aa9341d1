//! Records read from the help-center export and produced while mirroring it.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder shown wherever a category or section reference cannot be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Top-level grouping of sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Category {
  /// Unique category identifier.
  pub id: u64,
  /// Display name.
  pub name: String,
  /// Optional description rendered under the heading.
  #[serde(default, deserialize_with = "null_as_none")]
  pub description: Option<String>,
}

/// Grouping of articles belonging to exactly one category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Section {
  /// Unique section identifier.
  pub id: u64,
  /// Display name.
  pub name: String,
  /// Optional description rendered under the heading.
  #[serde(default, deserialize_with = "null_as_none")]
  pub description: Option<String>,
  /// Owning category.
  pub category_id: u64,
}

/// A single help-center page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Article {
  /// Unique article identifier.
  pub id: u64,
  /// Article title.
  pub title: String,
  /// Raw HTML body as exported. Missing bodies deserialize to an empty string.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub body: String,
  /// Owning section.
  pub section_id: u64,
  /// Last-updated timestamp, RFC 3339 in Zendesk exports.
  #[serde(default)]
  pub updated_at: String,
  /// Attachments already mirrored by the exporter.
  #[serde(default)]
  pub downloaded_attachments: Vec<ExportedAttachment>,
}

impl Article {
  /// Calendar date of the last update, if the timestamp can be read.
  pub fn updated_on(&self) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&self.updated_at) {
      return Some(timestamp.date_naive());
    }
    self
      .updated_at
      .get(..10)
      .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
  }

  /// Relative link to the rendered article page.
  pub fn page_name(&self) -> String {
    format!("article_{}.html", self.id)
  }
}

/// Attachment record written by the exporter next to an article.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportedAttachment {
  /// Remote URL the file was downloaded from.
  #[serde(default)]
  pub original_url: String,
  /// File name inside the export's attachments directory.
  pub filename: String,
}

/// A remote attachment referenced from an article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
  /// Numeric token taken from the remote URL; the de-duplication key.
  pub remote_id: String,
  /// Remote URL as it should be requested.
  pub remote_url: String,
  /// Sanitized file name, unique across the output tree.
  pub file_name: String,
  /// Location of the mirrored file once fetched.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub local_path: Option<PathBuf>,
}

impl Attachment {
  /// Whether the attachment has a local copy the pages can point at.
  pub fn is_mirrored(&self) -> bool {
    self.local_path.is_some()
  }

  /// Page-relative href of the mirrored file.
  pub fn local_href(&self, attachments_dir_name: &str) -> String {
    format!("{}/{}", attachments_dir_name, self.file_name)
  }
}

/// A fetch that did not produce a local copy.
#[derive(Debug, Clone, Serialize)]
pub struct FailedAttachment {
  /// Article whose body referenced the attachment.
  pub article_id: u64,
  /// Remote URL that could not be mirrored.
  pub remote_url: String,
  /// Human readable failure reason.
  pub reason: String,
}

/// Append-only side table of attachments discovered per article.
///
/// Entities from the export are never mutated; rendering consults this table instead.
#[derive(Debug, Default)]
pub struct AttachmentLedger {
  by_article: BTreeMap<u64, Vec<Attachment>>,
  mirrored: HashMap<String, (u64, usize)>,
  failures: Vec<FailedAttachment>,
}

impl AttachmentLedger {
  /// Create an empty ledger.
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an attachment for an article. The first mirrored record for a remote id wins lookups.
  pub fn record(&mut self, article_id: u64, attachment: Attachment) {
    let entries = self.by_article.entry(article_id).or_default();
    if attachment.is_mirrored() {
      self
        .mirrored
        .entry(attachment.remote_id.clone())
        .or_insert((article_id, entries.len()));
    }
    entries.push(attachment);
  }

  /// Remember a fetch failure for the operator report.
  pub fn record_failure(&mut self, failure: FailedAttachment) {
    self.failures.push(failure);
  }

  /// Mirrored attachment for a remote id, from whichever article discovered it first.
  pub fn mirrored(&self, remote_id: &str) -> Option<&Attachment> {
    let (article_id, index) = self.mirrored.get(remote_id)?;
    self.by_article.get(article_id)?.get(*index)
  }

  /// Attachments recorded for a single article, in discovery order.
  pub fn for_article(&self, article_id: u64) -> &[Attachment] {
    self
      .by_article
      .get(&article_id)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Every article with at least one recorded attachment.
  pub fn articles(&self) -> impl Iterator<Item = (u64, &[Attachment])> {
    self
      .by_article
      .iter()
      .map(|(id, entries)| (*id, entries.as_slice()))
  }

  /// Failed fetches in the order they happened.
  pub fn failures(&self) -> &[FailedAttachment] {
    &self.failures
  }
}

/// Summary of one article's attachments in the site manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleAttachmentSummary {
  /// Article identifier.
  pub article_id: u64,
  /// Attachments recorded for the article.
  pub attachments: Vec<Attachment>,
}

/// Serializable summary written next to the generated site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteManifestSummary {
  /// Local timestamp of the generation run.
  pub generated_at: String,
  /// Number of categories, sections and articles rendered.
  pub counts: EntityCounts,
  /// HTML pages written, relative to the output directory.
  pub pages: Vec<String>,
  /// Mirrored attachments grouped by article.
  pub attachments: Vec<ArticleAttachmentSummary>,
  /// Attachments that kept their remote URL.
  pub failed_attachments: Vec<FailedAttachment>,
}

/// Entity totals for the site manifest.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EntityCounts {
  /// Number of categories.
  pub categories: usize,
  /// Number of sections.
  pub sections: usize,
  /// Number of articles.
  pub articles: usize,
}

fn null_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<String>::deserialize(deserializer)?;
  Ok(value.filter(|text| !text.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
