//! The page shell shared by every generated HTML page.

use crate::config::SiteConfig;

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

/// Header, navigation and footer wrapped around page content.
#[derive(Debug, Clone)]
pub struct PageShell<'a> {
  config: &'a SiteConfig,
  footer: String,
}

impl<'a> PageShell<'a> {
  /// Shell for a run generated in `year`.
  pub fn new(config: &'a SiteConfig, year: i32) -> Self {
    Self {
      config,
      footer: config.footer_for_year(year),
    }
  }

  /// Wrap `content` in a complete HTML document.
  pub fn render(&self, title: &str, description: &str, content: &str) -> String {
    let site_name = escape_html(&self.config.site_name);
    format!(
      r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {site_name}</title>
    <meta name="description" content="{description}">
    <link rel="stylesheet" href="css/style.css">
</head>
<body>
    <header class="header">
        <div class="container">
            <div class="header-branding">
                <a href="index.html" class="header-text">
                    <h1>{site_name}</h1>
                    <p>{tagline}</p>
                </a>
            </div>
            <div class="header-actions">
                <input type="search" id="searchInput" class="search-input" placeholder="Search articles..." aria-label="Search articles">
                <button class="theme-toggle" aria-label="Toggle dark mode">&#9680;</button>
                <button class="mobile-menu-btn" aria-label="Toggle menu">
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
            </div>
        </div>
    </header>

    <nav class="nav">
        <div class="container">
            <ul>
                <li><a href="index.html">Home</a></li>
                <li><a href="categories.html">Browse Topics</a></li>
                <li><a href="articles.html">All Articles</a></li>
                <li><a href="videos.html">Videos</a></li>
            </ul>
        </div>
    </nav>

    <div class="container">
        <main class="main">
{content}
        </main>
    </div>

    <footer class="footer">
        <div class="container">
            <p>{footer}</p>
        </div>
    </footer>

    <script src="js/search-index.js"></script>
    <script src="js/main.js"></script>
</body>
</html>
"#,
      title = escape_html(title),
      description = escape_html(description),
      site_name = site_name,
      tagline = escape_html(&self.config.tagline),
      content = content,
      footer = escape_html(&self.footer),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup_characters() {
    assert_eq!(
      escape_html(r#"Tips & <tricks> "quoted" 'single'"#),
      "Tips &amp; &lt;tricks&gt; &quot;quoted&quot; &#39;single&#39;"
    );
  }

  #[test]
  fn renders_title_nav_and_footer() {
    let config = SiteConfig {
      site_name: "Acme Help".into(),
      ..SiteConfig::default()
    };
    let html = PageShell::new(&config, 2025).render("Q&A", "desc", "<p>body</p>");

    assert!(html.contains("<title>Q&amp;A - Acme Help</title>"));
    assert!(html.contains(r#"<a href="videos.html">Videos</a>"#));
    assert!(html.contains("<p>body</p>"));
    assert!(html.contains("© 2025 Help Center. All rights reserved."));
  }
}
