//! Mirroring remote attachments into the generated site.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use same_file::is_same_file;
use tracing::{debug, info, warn};

use crate::fetch::{Fetch, FetchedResource};
use crate::models::{Article, Attachment, AttachmentLedger, FailedAttachment};
use crate::resolver::ContentResolver;

const KNOWN_EXTENSIONS: &[&str] = &[
  "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "ico", "pdf", "mp4", "mov", "webm", "zip",
  "csv", "txt", "docx", "xlsx", "pptx",
];

/// Outcome counters for one article or a whole run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStats {
  /// Attachments downloaded and written.
  pub downloaded: usize,
  /// Attachments already mirrored earlier in the run.
  pub reused: usize,
  /// Attachments whose fetch failed.
  pub failed: usize,
}

impl std::ops::AddAssign for MirrorStats {
  fn add_assign(&mut self, other: Self) {
    self.downloaded += other.downloaded;
    self.reused += other.reused;
    self.failed += other.failed;
  }
}

/// Install every file from the export's attachments directory into the site.
///
/// Files are hard linked when possible and copied otherwise. Returns the number of files
/// installed; a missing source directory installs nothing.
pub fn install_exported_attachments(source_dir: &Path, destination_dir: &Path) -> Result<usize> {
  let entries = match fs::read_dir(source_dir) {
    Ok(entries) => entries,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
    Err(err) => {
      return Err(
        anyhow::Error::new(err).context(format!("failed to read {}", source_dir.display())),
      );
    }
  };

  fs::create_dir_all(destination_dir)
    .with_context(|| format!("failed to create {}", destination_dir.display()))?;

  let mut installed = 0;
  for entry in entries {
    let entry = entry?;
    if !entry.file_type()?.is_file() {
      continue;
    }
    let destination = destination_dir.join(entry.file_name());
    install_file(&entry.path(), &destination).with_context(|| {
      format!(
        "failed to install {} into {}",
        entry.path().display(),
        destination.display()
      )
    })?;
    installed += 1;
  }

  Ok(installed)
}

/// Record attachments the exporter already downloaded, so they are not fetched again.
///
/// Only records whose file is present in `attachments_dir` and whose URL carries a remote
/// id are kept.
pub fn seed_exported_attachments(
  resolver: &ContentResolver<'_>,
  articles: &[Article],
  attachments_dir: &Path,
  ledger: &mut AttachmentLedger,
) -> usize {
  let pattern = resolver.rules().attachment_pattern();
  let mut seeded = 0;

  for article in articles {
    for exported in &article.downloaded_attachments {
      let Some(caps) = pattern.captures(&exported.original_url) else {
        debug!(
          "ignoring exported attachment without remote id: {}",
          exported.original_url
        );
        continue;
      };
      let local_path = attachments_dir.join(&exported.filename);
      if !local_path.is_file() {
        debug!("exported attachment missing on disk: {}", local_path.display());
        continue;
      }

      ledger.record(article.id, Attachment {
        remote_id: caps["id"].to_string(),
        remote_url: exported.original_url.clone(),
        file_name: exported.filename.clone(),
        local_path: Some(local_path),
      });
      seeded += 1;
    }
  }

  seeded
}

/// Discover, fetch and write the attachments referenced by one article.
///
/// Fetch failures are logged and recorded in the ledger; only local I/O errors are returned.
pub fn mirror_article<F: Fetch + ?Sized>(
  resolver: &ContentResolver<'_>,
  fetcher: &F,
  article: &Article,
  attachments_dir: &Path,
  ledger: &mut AttachmentLedger,
) -> Result<MirrorStats> {
  let mut stats = MirrorStats::default();

  for mut attachment in resolver.discover_attachments(article) {
    if let Some(existing) = ledger.mirrored(&attachment.remote_id) {
      // Seeded for this very article by the exporter.
      if ledger
        .for_article(article.id)
        .iter()
        .any(|recorded| recorded.remote_id == attachment.remote_id)
      {
        stats.reused += 1;
        continue;
      }
      attachment.file_name = existing.file_name.clone();
      attachment.local_path = existing.local_path.clone();
      debug!("Reusing attachment: {}", attachment.file_name);
      ledger.record(article.id, attachment);
      stats.reused += 1;
      continue;
    }

    match fetcher.fetch(&attachment.remote_url) {
      Ok(resource) => {
        attachment.file_name = settle_file_name(&attachment.file_name, &resource);
        let destination = attachments_dir.join(&attachment.file_name);
        fs::create_dir_all(attachments_dir)
          .with_context(|| format!("failed to create {}", attachments_dir.display()))?;
        fs::write(&destination, &resource.bytes)
          .with_context(|| format!("failed to write {}", destination.display()))?;

        info!("Downloaded attachment: {}", attachment.file_name);
        attachment.local_path = Some(destination);
        ledger.record(article.id, attachment);
        stats.downloaded += 1;
      }
      Err(err) => {
        warn!("Failed to download attachment {}: {}", attachment.remote_url, err);
        ledger.record_failure(FailedAttachment {
          article_id: article.id,
          remote_url: attachment.remote_url.clone(),
          reason: err.to_string(),
        });
        ledger.record(article.id, attachment);
        stats.failed += 1;
      }
    }
  }

  Ok(stats)
}

/// Append an extension to `base` unless it already carries a known one.
pub fn settle_file_name(base: &str, resource: &FetchedResource) -> String {
  if has_known_extension(base) {
    return base.to_string();
  }

  let extension = resource
    .content_type
    .as_deref()
    .and_then(extension_for_content_type)
    .or_else(|| sniff_extension(&resource.bytes));

  match extension {
    Some(extension) => format!("{base}.{extension}"),
    None => base.to_string(),
  }
}

fn has_known_extension(name: &str) -> bool {
  name.rsplit_once('.').is_some_and(|(_, extension)| {
    KNOWN_EXTENSIONS
      .iter()
      .any(|known| known.eq_ignore_ascii_case(extension))
  })
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
  let essence = content_type
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_ascii_lowercase();

  match essence.as_str() {
    "image/png" => Some("png"),
    "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
    "image/gif" => Some("gif"),
    "image/webp" => Some("webp"),
    "image/svg+xml" => Some("svg"),
    "image/bmp" => Some("bmp"),
    "application/pdf" => Some("pdf"),
    "video/mp4" => Some("mp4"),
    "video/quicktime" => Some("mov"),
    "video/webm" => Some("webm"),
    _ => None,
  }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
  if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
    Some("png")
  } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
    Some("jpg")
  } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
    Some("gif")
  } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
    Some("webp")
  } else if bytes.starts_with(b"%PDF") {
    Some("pdf")
  } else if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
    Some("mp4")
  } else {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    head.contains("<svg").then_some("svg")
  }
}

fn install_file(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  match fs::hard_link(source, destination) {
    Ok(_) => Ok(()),
    Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
    Err(_) => fs::copy(source, destination).map(|_| ()),
  }
}
