//! Attachment discovery over article bodies.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::Attachment;

const MAX_NAME_CHARS: usize = 100;
/// Alt text Zendesk inserts for images uploaded without one.
const PLACEHOLDER_ALT: &str = "Image";

fn tag_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?is)<(?P<tag>img|a|source|video)\b[^>]*>").expect("invalid tag regex")
  })
}

fn attribute_pattern(attribute: &str) -> &'static Regex {
  static ALT: OnceLock<Regex> = OnceLock::new();
  static TITLE: OnceLock<Regex> = OnceLock::new();

  let (cell, source) = match attribute {
    "alt" => (&ALT, r#"(?i)\salt\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#),
    _ => (
      &TITLE,
      r#"(?i)\stitle\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#,
    ),
  };
  cell.get_or_init(|| Regex::new(source).expect("invalid attribute regex"))
}

/// Scan a body for remote attachment URLs, yielding one record per distinct remote id.
///
/// Records come back in first-occurrence order with `local_path` unset. File names are
/// `<article_id>_<n>_<name>` where `n` counts distinct attachments from 1.
pub fn discover_attachments(
  attachment_pattern: &Regex,
  article_id: u64,
  body: &str,
) -> Vec<Attachment> {
  let mut seen = HashSet::new();
  let mut discovered = Vec::new();

  for caps in attachment_pattern.captures_iter(body) {
    let remote_id = &caps["id"];
    if !seen.insert(remote_id.to_string()) {
      continue;
    }

    let name = recover_name(attachment_pattern, body, remote_id)
      .unwrap_or_else(|| format!("attachment_{remote_id}"));
    let ordinal = discovered.len() + 1;

    discovered.push(Attachment {
      remote_id: remote_id.to_string(),
      remote_url: absolute_url(&caps[0]),
      file_name: format!("{article_id}_{ordinal}_{name}"),
      local_path: None,
    });
  }

  discovered
}

/// Replace anything unsafe in a file name or URL path segment with `_`.
pub fn sanitize_file_name(raw: &str) -> String {
  let mut sanitized = raw
    .trim()
    .chars()
    .map(|c| {
      if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')') {
        c
      } else {
        '_'
      }
    })
    .collect::<String>();

  while sanitized.contains("__") {
    sanitized = sanitized.replace("__", "_");
  }

  let trimmed = sanitized.trim_matches(|c| c == '_' || c == '.');
  trimmed.chars().take(MAX_NAME_CHARS).collect()
}

fn recover_name(attachment_pattern: &Regex, body: &str, remote_id: &str) -> Option<String> {
  let referencing: Vec<_> = tag_pattern()
    .captures_iter(body)
    .filter(|tag| {
      attachment_pattern
        .captures_iter(&tag[0])
        .any(|caps| &caps["id"] == remote_id)
    })
    .collect();

  // A wrapping <a> usually precedes the <img> carrying the alt text.
  let alt = referencing
    .iter()
    .find(|tag| tag["tag"].eq_ignore_ascii_case("img"))
    .and_then(|img| usable_name(attribute_value(&img[0], "alt")?));

  alt.or_else(|| usable_name(attribute_value(&referencing.first()?[0], "title")?))
}

fn usable_name(raw: String) -> Option<String> {
  let name = sanitize_file_name(&raw);
  (!name.is_empty() && name != PLACEHOLDER_ALT).then_some(name)
}

fn attribute_value(tag: &str, attribute: &str) -> Option<String> {
  let caps = attribute_pattern(attribute).captures(tag)?;
  let value = caps.name("dq").or_else(|| caps.name("sq"))?.as_str().trim();
  (!value.is_empty()).then(|| value.to_string())
}

fn absolute_url(url: &str) -> String {
  if url.starts_with("//") {
    format!("https:{url}")
  } else {
    url.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolver::RewriteRules;

  fn pattern() -> Regex {
    RewriteRules::for_host("support.example.co")
      .attachment_pattern()
      .clone()
  }

  #[test]
  fn names_attachment_from_alt_text() {
    let body = "<img src='https://support.example.co/hc/article_attachments/555' alt='Step One'>";
    let found = discover_attachments(&pattern(), 100, body);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].remote_id, "555");
    assert_eq!(found[0].file_name, "100_1_Step_One");
    assert_eq!(
      found[0].remote_url,
      "https://support.example.co/hc/article_attachments/555"
    );
    assert!(found[0].local_path.is_none());
  }

  #[test]
  fn deduplicates_repeated_references() {
    let body = concat!(
      r#"<img src="https://support.example.co/hc/article_attachments/555" alt="First">"#,
      r#"<a href="https://support.example.co/hc/article_attachments/555">again</a>"#,
      r#"<img src="https://support.example.co/hc/article_attachments/555">"#,
      r#"<img src="https://support.example.co/hc/article_attachments/556" title="Second shot">"#,
    );
    let found = discover_attachments(&pattern(), 7, body);

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].file_name, "7_1_First");
    assert_eq!(found[1].file_name, "7_2_Second_shot");
  }

  #[test]
  fn names_linked_image_from_inner_alt() {
    let body = concat!(
      r#"<a href="https://support.example.co/hc/article_attachments/555">"#,
      r#"<img src="https://support.example.co/hc/article_attachments/555" alt="Step One"></a>"#,
    );
    let found = discover_attachments(&pattern(), 100, body);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].file_name, "100_1_Step_One");
  }

  #[test]
  fn ignores_data_attributes_when_reading_alt_and_title() {
    let body = concat!(
      r#"<img data-alt="Wrong" src="https://support.example.co/hc/article_attachments/555" alt="Right">"#,
      r#"<a data-title="Nope" title="Manual" href="https://support.example.co/hc/article_attachments/556">pdf</a>"#,
    );
    let found = discover_attachments(&pattern(), 100, body);

    assert_eq!(found[0].file_name, "100_1_Right");
    assert_eq!(found[1].file_name, "100_2_Manual");
  }

  #[test]
  fn placeholder_alt_falls_back_to_title() {
    let body = r#"<img src="https://support.example.co/hc/article_attachments/555" alt="Image" title="Dashboard">"#;
    let found = discover_attachments(&pattern(), 3, body);
    assert_eq!(found[0].file_name, "3_1_Dashboard");
  }

  #[test]
  fn falls_back_to_generated_name() {
    let body = concat!(
      r#"<img src="https://support.example.co/hc/article_attachments/42" alt="Image">"#,
      r#"<p>https://support.example.co/hc/article_attachments/43</p>"#,
      r#"<img alt="???" src="//support.example.co/hc/article_attachments/44">"#,
    );
    let found = discover_attachments(&pattern(), 9, body);

    let names: Vec<_> = found.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec![
      "9_1_attachment_42",
      "9_2_attachment_43",
      "9_3_attachment_44",
    ]);
    assert_eq!(
      found[2].remote_url,
      "https://support.example.co/hc/article_attachments/44"
    );
  }

  #[test]
  fn sanitizes_unsafe_characters() {
    assert_eq!(sanitize_file_name(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
    assert_eq!(sanitize_file_name("  Step  One.png "), "Step_One.png");
    assert_eq!(sanitize_file_name("50% done #2"), "50_done_2");
    assert_eq!(sanitize_file_name(".hidden"), "hidden");
    assert_eq!(sanitize_file_name(&"x".repeat(300)).len(), MAX_NAME_CHARS);
  }
}
