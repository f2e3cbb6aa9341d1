//! Positional navigation derived from a section's article order.

use crate::models::Article;

/// Articles on either side of the current one within its section.
#[derive(Debug, Clone, Copy)]
pub struct Neighbours<'a> {
  /// Article before the current one, absent at the start of the section.
  pub prev: Option<&'a Article>,
  /// Article after the current one, absent at the end of the section.
  pub next: Option<&'a Article>,
}

/// First `limit` siblings in section order, skipping the current article.
pub fn related_articles<'a>(
  siblings: &[&'a Article],
  current_id: u64,
  limit: usize,
) -> Vec<&'a Article> {
  siblings
    .iter()
    .copied()
    .filter(|article| article.id != current_id)
    .take(limit)
    .collect()
}

/// Prev/next for `current_id`, or `None` when no navigation block should be shown.
pub fn article_neighbours<'a>(siblings: &[&'a Article], current_id: u64) -> Option<Neighbours<'a>> {
  if siblings.len() <= 1 {
    return None;
  }

  let index = siblings
    .iter()
    .position(|article| article.id == current_id)?;

  Some(Neighbours {
    prev: index.checked_sub(1).map(|prev| siblings[prev]),
    next: siblings.get(index + 1).copied(),
  })
}
