//! Cross-reference resolution, body rewriting and navigation over the exported entities.
//!
//! The resolver never mutates the export. Attachment state lives in an
//! [`AttachmentLedger`](crate::models::AttachmentLedger) that callers fill in and hand back
//! through [`RewriteContext`] when bodies are rewritten.

mod discovery;
mod navigation;
mod rules;

use std::collections::HashMap;

pub use discovery::{discover_attachments, sanitize_file_name};
pub use navigation::{Neighbours, article_neighbours, related_articles};
pub use rules::{
  RewriteContext, RewriteFn, RewriteRule, RewriteRules, VIDEO_WRAPPER_OPEN, contains_video_embed,
};

use crate::export::ExportSnapshot;
use crate::models::{Article, Attachment, Category, Section, UNKNOWN_LABEL};

/// Category and section an article hangs off, either of which may be unresolvable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lineage<'a> {
  /// Owning category, if the section's foreign key resolved.
  pub category: Option<&'a Category>,
  /// Owning section, if the article's foreign key resolved.
  pub section: Option<&'a Section>,
}

impl<'a> Lineage<'a> {
  /// Category display name or the placeholder.
  pub fn category_name(&self) -> &'a str {
    self.category.map_or(UNKNOWN_LABEL, |category| category.name.as_str())
  }

  /// Section display name or the placeholder.
  pub fn section_name(&self) -> &'a str {
    self.section.map_or(UNKNOWN_LABEL, |section| section.name.as_str())
  }
}

/// Lookup indices and rewrite rules over one export.
#[derive(Debug)]
pub struct ContentResolver<'a> {
  categories: HashMap<u64, &'a Category>,
  sections: HashMap<u64, &'a Section>,
  sections_by_category: HashMap<u64, Vec<&'a Section>>,
  articles_by_section: HashMap<u64, Vec<&'a Article>>,
  rules: RewriteRules,
}

impl<'a> ContentResolver<'a> {
  /// Index the three collections. Input order is preserved inside every index.
  pub fn new(
    categories: &'a [Category],
    sections: &'a [Section],
    articles: &'a [Article],
    rules: RewriteRules,
  ) -> Self {
    let mut sections_by_category: HashMap<u64, Vec<&'a Section>> = HashMap::new();
    let mut articles_by_section: HashMap<u64, Vec<&'a Article>> = HashMap::new();

    for section in sections {
      sections_by_category
        .entry(section.category_id)
        .or_default()
        .push(section);
      articles_by_section.entry(section.id).or_default();
    }

    for article in articles {
      if let Some(bucket) = articles_by_section.get_mut(&article.section_id) {
        bucket.push(article);
      }
    }

    Self {
      categories: categories.iter().map(|c| (c.id, c)).collect(),
      sections: sections.iter().map(|s| (s.id, s)).collect(),
      sections_by_category,
      articles_by_section,
      rules,
    }
  }

  /// Index a loaded export.
  pub fn from_snapshot(snapshot: &'a ExportSnapshot, rules: RewriteRules) -> Self {
    Self::new(
      &snapshot.categories,
      &snapshot.sections,
      &snapshot.articles,
      rules,
    )
  }

  /// Category by id.
  pub fn category(&self, id: u64) -> Option<&'a Category> {
    self.categories.get(&id).copied()
  }

  /// Section by id.
  pub fn section(&self, id: u64) -> Option<&'a Section> {
    self.sections.get(&id).copied()
  }

  /// Sections of a category in export order.
  pub fn sections_in(&self, category_id: u64) -> &[&'a Section] {
    self
      .sections_by_category
      .get(&category_id)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Articles of a section in export order.
  pub fn articles_in(&self, section_id: u64) -> &[&'a Article] {
    self
      .articles_by_section
      .get(&section_id)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Total articles across a category's sections.
  pub fn article_count_in_category(&self, category_id: u64) -> usize {
    self
      .sections_in(category_id)
      .iter()
      .map(|section| self.articles_in(section.id).len())
      .sum()
  }

  /// Category owning a section.
  pub fn parent_category(&self, section: &Section) -> Option<&'a Category> {
    self.category(section.category_id)
  }

  /// Resolve an article's section and category.
  pub fn lineage(&self, article: &Article) -> Lineage<'a> {
    let section = self.section(article.section_id);
    Lineage {
      category: section.and_then(|section| self.parent_category(section)),
      section,
    }
  }

  /// Up to `limit` other articles from the same section, in section order.
  pub fn related(&self, article: &Article, limit: usize) -> Vec<&'a Article> {
    related_articles(self.articles_in(article.section_id), article.id, limit)
  }

  /// Prev/next within the article's section.
  pub fn neighbours(&self, article: &Article) -> Option<Neighbours<'a>> {
    article_neighbours(self.articles_in(article.section_id), article.id)
  }

  /// Distinct remote attachments referenced by an article body.
  pub fn discover_attachments(&self, article: &Article) -> Vec<Attachment> {
    discover_attachments(self.rules.attachment_pattern(), article.id, &article.body)
  }

  /// Apply the rule table to a body.
  pub fn rewrite_body(&self, body: &str, context: &RewriteContext<'_>) -> String {
    self.rules.rewrite(body, context)
  }

  /// The rule table in use.
  pub fn rules(&self) -> &RewriteRules {
    &self.rules
  }
}
