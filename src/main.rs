//! helpdesk-offline CLI entrypoint

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use helpdesk_offline::{ExportSnapshot, HttpFetcher, OfflineFetcher, SiteBuilder, SiteConfig};

/// Build a self-contained offline website from a help-center export.
#[derive(Parser, Debug)]
#[command(name = "helpdesk-offline")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Configuration file (defaults to ./helpdesk.config.json when present)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory holding the exported JSON files
  #[arg(long)]
  export_dir: Option<String>,

  /// Directory the site is written to
  #[arg(short, long)]
  output_dir: Option<String>,

  /// Host serving attachment URLs in article bodies
  #[arg(long)]
  host: Option<String>,

  /// Skip downloads and keep remote attachment references as they are
  #[arg(long)]
  offline: bool,
}

impl Cli {
  fn site_config(&self) -> Result<SiteConfig> {
    let mut config = match &self.config {
      Some(path) => SiteConfig::load(path)?,
      None => SiteConfig::discover(&env::current_dir().context("failed to read working directory")?),
    };
    if let Some(export_dir) = &self.export_dir {
      config.export_dir = export_dir.clone();
    }
    if let Some(output_dir) = &self.output_dir {
      config.output_dir = output_dir.clone();
    }
    if let Some(host) = &self.host {
      config.attachment_host = host.clone();
    }
    Ok(config)
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_target(false)
    .init();

  let cli = Cli::parse();
  let config = cli.site_config()?;

  info!("Loading export from {}", config.export_path().display());
  let snapshot = ExportSnapshot::load(&config.export_path())?;
  info!(
    "Loaded {} categories, {} sections, {} articles",
    snapshot.categories.len(),
    snapshot.sections.len(),
    snapshot.articles.len()
  );

  let builder = SiteBuilder::new(&config, &snapshot);
  let report = if cli.offline {
    builder.build(&OfflineFetcher)?
  } else {
    let fetcher = HttpFetcher::new(config.fetch_timeout(), &config.user_agent)?;
    builder.build(&fetcher)?
  };

  println!("Offline help center created in {}", report.output_dir.display());
  println!("  pages written:        {}", report.pages.len());
  println!("  attachments installed: {}", report.installed_attachments);
  println!("  attachments fetched:  {}", report.attachments.downloaded);
  println!("  attachments reused:   {}", report.attachments.reused);
  println!("  attachments failed:   {}", report.attachments.failed);
  println!("Open {} in a browser", report.output_dir.join("index.html").display());
  Ok(())
}
