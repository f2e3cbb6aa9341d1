#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod export;
pub mod fetch;
pub mod mirror;
pub mod models;
pub mod resolver;
pub mod site;

pub use config::SiteConfig;
pub use export::ExportSnapshot;
pub use fetch::{Fetch, FetchError, FetchedResource, HttpFetcher, OfflineFetcher};
pub use resolver::{ContentResolver, RewriteContext, RewriteRule, RewriteRules};
pub use site::{SiteBuilder, SiteReport};
