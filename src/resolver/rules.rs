//! Ordered table of `{matcher, rewrite}` rules applied to article bodies.

use regex::{Captures, Regex};

use crate::models::AttachmentLedger;

/// Opening tag of the responsive wrapper placed around video embeds.
pub const VIDEO_WRAPPER_OPEN: &str = r#"<div class="video-container">"#;
const VIDEO_WRAPPER_CLOSE: &str = "</div>";

const SECURE_SCHEME_PATTERN: &str = r#"(?i)(\bsrc\s*=\s*["'])//"#;
const VIDEO_EMBED_PATTERN: &str = r#"(?is)<iframe\b[^>]*\bsrc\s*=\s*["']https?://(?:www\.)?(?:youtube(?:-nocookie)?\.com/embed/|player\.vimeo\.com/video/)[^"']*["'][^>]*>[^<]*</iframe>"#;

/// State shared by every rule while rewriting one body.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
  /// Attachments mirrored so far.
  pub ledger: &'a AttachmentLedger,
  /// Directory name local attachment hrefs are rooted at.
  pub attachments_dir_name: &'a str,
}

/// Produces the replacement for one match, or `None` to keep the matched text.
///
/// Receives the captures, the full text the rule is running over, and the context.
pub type RewriteFn = fn(&Captures<'_>, &str, &RewriteContext<'_>) -> Option<String>;

/// A single matcher paired with its rewrite.
pub struct RewriteRule {
  name: &'static str,
  pattern: Regex,
  rewrite: RewriteFn,
}

impl RewriteRule {
  /// Build a rule from a compiled pattern and rewrite function.
  pub fn new(name: &'static str, pattern: Regex, rewrite: RewriteFn) -> Self {
    Self {
      name,
      pattern,
      rewrite,
    }
  }

  /// Identifier used in logs.
  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Rewrite every match in `text`.
  pub fn apply(&self, text: &str, context: &RewriteContext<'_>) -> String {
    self
      .pattern
      .replace_all(text, |caps: &Captures<'_>| {
        (self.rewrite)(caps, text, context).unwrap_or_else(|| caps[0].to_string())
      })
      .into_owned()
  }
}

impl std::fmt::Debug for RewriteRule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RewriteRule")
      .field("name", &self.name)
      .field("pattern", &self.pattern.as_str())
      .finish()
  }
}

/// The rule table, applied top to bottom.
#[derive(Debug)]
pub struct RewriteRules {
  attachment_pattern: Regex,
  rules: Vec<RewriteRule>,
}

impl RewriteRules {
  /// Standard table for a help center whose attachments are served from `host`.
  pub fn for_host(host: &str) -> Self {
    let attachment_pattern = attachment_url_pattern(host);
    let rules = vec![
      RewriteRule::new(
        "attachment-links",
        attachment_pattern.clone(),
        rewrite_attachment_link,
      ),
      RewriteRule::new(
        "secure-scheme",
        Regex::new(SECURE_SCHEME_PATTERN).expect("invalid secure scheme regex"),
        rewrite_secure_scheme,
      ),
      RewriteRule::new(
        "video-embeds",
        Regex::new(VIDEO_EMBED_PATTERN).expect("invalid video embed regex"),
        wrap_video_embed,
      ),
    ];

    Self {
      attachment_pattern,
      rules,
    }
  }

  /// Append a rule that runs after the existing ones.
  pub fn push(&mut self, rule: RewriteRule) {
    self.rules.push(rule);
  }

  /// Rules in application order.
  pub fn rules(&self) -> &[RewriteRule] {
    &self.rules
  }

  /// Pattern matching remote attachment URLs; the `id` group holds the remote identifier.
  pub fn attachment_pattern(&self) -> &Regex {
    &self.attachment_pattern
  }

  /// Run the whole table over an article body.
  pub fn rewrite(&self, body: &str, context: &RewriteContext<'_>) -> String {
    self
      .rules
      .iter()
      .fold(body.to_string(), |text, rule| rule.apply(&text, context))
  }
}

fn attachment_url_pattern(host: &str) -> Regex {
  let host = host
    .trim()
    .trim_start_matches("https://")
    .trim_start_matches("http://")
    .trim_end_matches('/');
  Regex::new(&format!(
    r#"(?i)(?:https?:)?//{}/hc/(?:[a-z]{{2}}(?:-[a-z0-9]{{2,4}})?/)?article_attachments/(?P<id>\d+)(?:/[^\s"'<>?#]*)?"#,
    regex::escape(host)
  ))
  .expect("invalid attachment URL regex")
}

fn rewrite_attachment_link(
  caps: &Captures<'_>,
  _text: &str,
  context: &RewriteContext<'_>,
) -> Option<String> {
  let attachment = context.ledger.mirrored(&caps["id"])?;
  Some(attachment.local_href(context.attachments_dir_name))
}

fn rewrite_secure_scheme(
  caps: &Captures<'_>,
  _text: &str,
  _context: &RewriteContext<'_>,
) -> Option<String> {
  Some(format!("{}https://", &caps[1]))
}

fn wrap_video_embed(
  caps: &Captures<'_>,
  text: &str,
  _context: &RewriteContext<'_>,
) -> Option<String> {
  let embed = caps.get(0)?;
  if text[..embed.start()].trim_end().ends_with(VIDEO_WRAPPER_OPEN) {
    return None;
  }
  Some(format!(
    "{VIDEO_WRAPPER_OPEN}{}{VIDEO_WRAPPER_CLOSE}",
    embed.as_str()
  ))
}

/// Whether a body (after rewriting) contains a recognised video embed.
pub fn contains_video_embed(body: &str) -> bool {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN
    .get_or_init(|| Regex::new(VIDEO_EMBED_PATTERN).expect("invalid video embed regex"))
    .is_match(body)
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::models::Attachment;

  const HOST: &str = "support.example.co";

  fn ledger_with(remote_id: &str, file_name: &str) -> AttachmentLedger {
    let mut ledger = AttachmentLedger::new();
    ledger.record(100, Attachment {
      remote_id: remote_id.into(),
      remote_url: format!("https://{HOST}/hc/article_attachments/{remote_id}"),
      file_name: file_name.into(),
      local_path: Some(PathBuf::from("site/attachments").join(file_name)),
    });
    ledger
  }

  fn context(ledger: &AttachmentLedger) -> RewriteContext<'_> {
    RewriteContext {
      ledger,
      attachments_dir_name: "attachments",
    }
  }

  #[test]
  fn body_without_attachment_urls_is_unchanged() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = ledger_with("555", "100_1_Step_One.png");
    let body = r#"<p>Plain text with <a href="https://example.org/page">a link</a>.</p>"#;
    assert_eq!(rules.rewrite(body, &context(&ledger)), body);
  }

  #[test]
  fn rewrites_mirrored_attachments_and_keeps_unknown_ones() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = ledger_with("555", "100_1_Step_One.png");
    let body = concat!(
      r#"<img src="https://support.example.co/hc/article_attachments/555">"#,
      r#"<img src="https://support.example.co/hc/en-us/article_attachments/555/shot.png">"#,
      r#"<img src="https://support.example.co/hc/article_attachments/777">"#,
    );

    let rewritten = rules.rewrite(body, &context(&ledger));
    assert_eq!(
      rewritten,
      concat!(
        r#"<img src="attachments/100_1_Step_One.png">"#,
        r#"<img src="attachments/100_1_Step_One.png">"#,
        r#"<img src="https://support.example.co/hc/article_attachments/777">"#,
      )
    );
  }

  #[test]
  fn secure_scheme_fix_is_idempotent() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = AttachmentLedger::new();
    let body = r#"<img src="//cdn.example.org/a.png"><script src='//cdn.example.org/b.js'></script>"#;

    let once = rules.rewrite(body, &context(&ledger));
    assert_eq!(
      once,
      r#"<img src="https://cdn.example.org/a.png"><script src='https://cdn.example.org/b.js'></script>"#
    );
    assert_eq!(rules.rewrite(&once, &context(&ledger)), once);
  }

  #[test]
  fn wraps_video_embeds_once() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = AttachmentLedger::new();
    let body = r#"<p>Watch:</p><iframe src="//www.youtube-nocookie.com/embed/abc123" allowfullscreen></iframe>"#;

    let once = rules.rewrite(body, &context(&ledger));
    assert_eq!(
      once,
      r#"<p>Watch:</p><div class="video-container"><iframe src="https://www.youtube-nocookie.com/embed/abc123" allowfullscreen></iframe></div>"#
    );

    let twice = rules.rewrite(&once, &context(&ledger));
    assert_eq!(twice, once);
    assert_eq!(twice.matches(VIDEO_WRAPPER_OPEN).count(), 1);
  }

  #[test]
  fn wraps_plain_http_embeds() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = AttachmentLedger::new();
    let body = r#"<iframe src="http://www.youtube.com/embed/xyz"></iframe>"#;

    assert_eq!(
      rules.rewrite(body, &context(&ledger)),
      format!("{VIDEO_WRAPPER_OPEN}{body}</div>")
    );
    assert!(contains_video_embed(body));
  }

  #[test]
  fn unclosed_embed_does_not_swallow_following_markup() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = AttachmentLedger::new();
    let body = concat!(
      r#"<iframe src="https://player.vimeo.com/video/1"><p>Steps</p>"#,
      r#"<iframe src="https://maps.example.org/embed"></iframe>"#,
    );

    assert_eq!(rules.rewrite(body, &context(&ledger)), body);
    assert!(!contains_video_embed(body));
  }

  #[test]
  fn leaves_non_video_iframes_alone() {
    let rules = RewriteRules::for_host(HOST);
    let ledger = AttachmentLedger::new();
    let body = r#"<iframe src="https://maps.example.org/embed"></iframe>"#;
    assert_eq!(rules.rewrite(body, &context(&ledger)), body);
    assert!(!contains_video_embed(body));
  }

  #[test]
  fn custom_rules_run_after_the_standard_table() {
    let mut rules = RewriteRules::for_host(HOST);
    rules.push(RewriteRule::new(
      "strip-tracking",
      Regex::new(r#"\?utm_[^\s"']*"#).unwrap(),
      |_, _, _| Some(String::new()),
    ));

    let ledger = AttachmentLedger::new();
    let body = r#"<a href="https://example.org/?utm_source=help">x</a>"#;
    assert_eq!(
      rules.rewrite(body, &context(&ledger)),
      r#"<a href="https://example.org/">x</a>"#
    );
    assert_eq!(rules.rules().last().unwrap().name(), "strip-tracking");
  }
}
