//! Page bodies for every kind of generated page.

use serde::Serialize;

use crate::config::SiteConfig;
use crate::models::{Article, AttachmentLedger, Category, Section};
use crate::resolver::{ContentResolver, Lineage, RewriteContext, contains_video_embed};
use crate::site::layout::{PageShell, escape_html};

/// Entry of the generated client-side search index.
#[derive(Debug, Serialize)]
struct SearchEntry<'a> {
  title: &'a str,
  href: String,
  category: &'a str,
  section: &'a str,
}

/// Renders pages from resolved entities, rewritten bodies and derived navigation.
pub struct PageRenderer<'r, 'a> {
  config: &'r SiteConfig,
  resolver: &'r ContentResolver<'a>,
  ledger: &'r AttachmentLedger,
  shell: PageShell<'r>,
}

impl<'r, 'a> PageRenderer<'r, 'a> {
  /// Renderer for a run generated in `year`.
  pub fn new(
    config: &'r SiteConfig,
    resolver: &'r ContentResolver<'a>,
    ledger: &'r AttachmentLedger,
    year: i32,
  ) -> Self {
    Self {
      config,
      resolver,
      ledger,
      shell: PageShell::new(config, year),
    }
  }

  /// Article body with attachment links, schemes and embeds rewritten.
  pub fn rewritten_body(&self, article: &Article) -> String {
    self.resolver.rewrite_body(&article.body, &RewriteContext {
      ledger: self.ledger,
      attachments_dir_name: &self.config.attachments_dir_name,
    })
  }

  /// Landing page: category sidebar and the most recently updated articles.
  pub fn homepage(&self, categories: &[Category], articles: &[Article]) -> String {
    let mut recent: Vec<&Article> = articles.iter().collect();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent.truncate(self.config.recent_limit);

    let sidebar = link_list(
      categories
        .iter()
        .map(|category| (category_page(category.id), category.name.as_str())),
    );
    let cards = recent
      .into_iter()
      .map(|article| self.article_card(article))
      .collect::<String>();

    let content = format!(
      r#"            <aside class="sidebar">
                <h3>Categories</h3>
                <ul>
{sidebar}                </ul>
            </aside>

            <div class="content">
                <h1>Welcome to {site_name}</h1>
                <p>Find guides, tutorials, and answers to common questions.</p>

                <h2>Recently Updated</h2>
                <div class="article-grid">
{cards}                </div>
            </div>"#,
      site_name = escape_html(&self.config.site_name),
    );

    self.shell.render("Home", &self.config.tagline, &content)
  }

  /// Category page listing its sections with article counts.
  pub fn category_page(&self, category: &Category) -> String {
    let sections = self.resolver.sections_in(category.id);
    let name = escape_html(&category.name);

    let sidebar = link_list(
      sections
        .iter()
        .map(|section| (section_page(section.id), section.name.as_str())),
    );
    let cards = sections
      .iter()
      .map(|section| {
        format!(
          r#"                    <a href="{href}" class="topic-card">
                        <h3>{name}</h3>
                        <p class="topic-meta">{count} articles</p>
                    </a>
"#,
          href = section_page(section.id),
          name = escape_html(&section.name),
          count = self.resolver.articles_in(section.id).len(),
        )
      })
      .collect::<String>();

    let content = format!(
      r#"            <aside class="sidebar">
                <h3>Sections in {name}</h3>
                <ul>
{sidebar}                </ul>
            </aside>

            <div class="content">
                <div class="breadcrumbs">
                    <a href="index.html">Home</a>
                    <span>/</span>
                    <span>{name}</span>
                </div>

                <h1>{name}</h1>
                <p class="section-description">{description}</p>

                <h2>Sections ({count})</h2>
                <div class="topic-grid">
{cards}                </div>
            </div>"#,
      description = escape_html(category.description.as_deref().unwrap_or_default()),
      count = sections.len(),
    );

    self.shell.render(
      &category.name,
      category.description.as_deref().unwrap_or(&category.name),
      &content,
    )
  }

  /// Section page listing its articles.
  pub fn section_page(&self, section: &Section) -> String {
    let articles = self.resolver.articles_in(section.id);
    let name = escape_html(&section.name);
    let category = self.resolver.parent_category(section);

    let sidebar = link_list(
      articles
        .iter()
        .map(|article| (article.page_name(), article.title.as_str())),
    );
    let items = articles
      .iter()
      .map(|article| {
        format!(
          r#"                    <li class="article-item">
                        <a href="{href}">{title}</a>
                    </li>
"#,
          href = article.page_name(),
          title = escape_html(&article.title),
        )
      })
      .collect::<String>();

    let content = format!(
      r#"            <aside class="sidebar">
                <h3>Articles in {name}</h3>
                <ul>
{sidebar}                </ul>
            </aside>

            <div class="content">
                <div class="breadcrumbs">
                    <a href="index.html">Home</a>
                    <span>/</span>
                    {category_crumb}
                    <span>/</span>
                    <span>{name}</span>
                </div>

                <h1>{name}</h1>
                <p class="section-description">{description}</p>

                <h2>Articles ({count})</h2>
                <ul class="article-list">
{items}                </ul>
            </div>"#,
      category_crumb = category_crumb(category),
      description = escape_html(section.description.as_deref().unwrap_or_default()),
      count = articles.len(),
    );

    self.shell.render(
      &section.name,
      section.description.as_deref().unwrap_or(&section.name),
      &content,
    )
  }

  /// Article page with breadcrumbs, rewritten body, related list and prev/next block.
  pub fn article_page(&self, article: &Article) -> String {
    let lineage = self.resolver.lineage(article);
    let title = escape_html(&article.title);

    let mut back_links = String::from(
      "                    <li><a href=\"index.html\">&larr; Back to Home</a></li>\n",
    );
    if let Some(category) = lineage.category {
      back_links.push_str(&format!(
        "                    <li><a href=\"{}\">&larr; {}</a></li>\n",
        category_page(category.id),
        escape_html(&category.name)
      ));
    }
    if let Some(section) = lineage.section {
      back_links.push_str(&format!(
        "                    <li><a href=\"{}\">&larr; {}</a></li>\n",
        section_page(section.id),
        escape_html(&section.name)
      ));
    }

    let updated = article
      .updated_on()
      .map(|date| date.format("%Y-%m-%d").to_string())
      .unwrap_or_else(|| article.updated_at.chars().take(10).collect());

    let content = format!(
      r#"            <aside class="sidebar">
                <h3>Navigation</h3>
                <ul>
{back_links}                </ul>
            </aside>

            <div class="content">
                <div class="breadcrumbs">
                    <a href="index.html">Home</a>
                    <span>/</span>
                    {category_crumb}
                    <span>/</span>
                    {section_crumb}
                    <span>/</span>
                    <span>{title}</span>
                </div>

                <h1>{title}</h1>
                <div class="article-meta">
                    Updated: {updated}
                </div>

                <div class="toc">
                    <h4>On this page</h4>
                </div>

                <div class="article-content">
{body}
                </div>

                <div class="related-articles">
                    <h3>Related Articles</h3>
                    <ul>
{related}                    </ul>
                </div>
{navigation}
            </div>"#,
      category_crumb = category_crumb(lineage.category),
      section_crumb = section_crumb(lineage.section),
      updated = escape_html(&updated),
      body = self.rewritten_body(article),
      related = self.related_html(article),
      navigation = self.navigation_html(article),
    );

    self.shell.render(&article.title, &article.title, &content)
  }

  /// Grid of every category with section and article totals.
  pub fn categories_index(&self, categories: &[Category]) -> String {
    let cards = categories
      .iter()
      .map(|category| {
        format!(
          r#"                    <a href="{href}" class="topic-card">
                        <h3>{name}</h3>
                        <p class="topic-description">{description}</p>
                        <div class="topic-meta">{sections} sections, {articles} articles</div>
                    </a>
"#,
          href = category_page(category.id),
          name = escape_html(&category.name),
          description = escape_html(
            category
              .description
              .as_deref()
              .unwrap_or("Browse articles in this category")
          ),
          sections = self.resolver.sections_in(category.id).len(),
          articles = self.resolver.article_count_in_category(category.id),
        )
      })
      .collect::<String>();

    self.shell.render(
      "Categories",
      "Browse all help categories",
      &grid_page("All Categories", "article-grid", &cards),
    )
  }

  /// Every article, sorted by title.
  pub fn articles_index(&self, articles: &[Article]) -> String {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| a.title.cmp(&b.title));

    let cards = sorted
      .into_iter()
      .map(|article| self.article_card(article))
      .collect::<String>();

    self.shell.render(
      "All Articles",
      "Browse all help articles",
      &grid_page("All Articles", "article-grid", &cards),
    )
  }

  /// Articles whose bodies embed a video, in export order.
  pub fn videos_page(&self, articles: &[Article]) -> String {
    let cards = articles
      .iter()
      .filter(|article| contains_video_embed(&self.rewritten_body(article)))
      .map(|article| self.article_card(article))
      .collect::<String>();

    let cards = if cards.is_empty() {
      "                    <p>No video tutorials yet.</p>\n".to_string()
    } else {
      cards
    };

    self.shell.render(
      "Videos",
      "Video tutorials",
      &grid_page("Video Tutorials", "article-grid", &cards),
    )
  }

  /// `js/search-index.js`: a global array of searchable article entries.
  pub fn search_index_script(&self, articles: &[Article]) -> serde_json::Result<String> {
    let entries: Vec<SearchEntry<'_>> = articles
      .iter()
      .map(|article| {
        let lineage = self.resolver.lineage(article);
        SearchEntry {
          title: &article.title,
          href: article.page_name(),
          category: lineage.category_name(),
          section: lineage.section_name(),
        }
      })
      .collect();

    Ok(format!(
      "window.HELP_CENTER_INDEX = {};\n",
      serde_json::to_string_pretty(&entries)?
    ))
  }

  fn article_card(&self, article: &Article) -> String {
    let lineage = self.resolver.lineage(article);
    format!(
      r#"                    <a href="{href}" class="article-card">
                        <h3>{title}</h3>
                        <div class="article-meta">
                            {meta}
                        </div>
                    </a>
"#,
      href = article.page_name(),
      title = escape_html(&article.title),
      meta = lineage_label(&lineage),
    )
  }

  fn related_html(&self, article: &Article) -> String {
    let related = self.resolver.related(article, self.config.related_limit);
    if related.is_empty() {
      return "                        <li>No related articles</li>\n".to_string();
    }

    link_list(
      related
        .iter()
        .map(|article| (article.page_name(), article.title.as_str())),
    )
  }

  fn navigation_html(&self, article: &Article) -> String {
    let Some(neighbours) = self.resolver.neighbours(article) else {
      return String::new();
    };

    let prev = match neighbours.prev {
      Some(prev) => format!(
        r#"
                    <a href="{href}" class="article-nav-prev">
                        <span class="article-nav-label">&larr; Previous</span>
                        <span class="article-nav-title">{title}</span>
                    </a>"#,
        href = prev.page_name(),
        title = escape_html(&prev.title),
      ),
      None => r#"<div class="article-nav-prev"></div>"#.to_string(),
    };
    let next = match neighbours.next {
      Some(next) => format!(
        r#"
                    <a href="{href}" class="article-nav-next">
                        <span class="article-nav-label">Next &rarr;</span>
                        <span class="article-nav-title">{title}</span>
                    </a>"#,
        href = next.page_name(),
        title = escape_html(&next.title),
      ),
      None => r#"<div class="article-nav-next"></div>"#.to_string(),
    };

    format!("\n                <div class=\"article-nav\">{prev}{next}</div>")
  }
}

/// File name of a category page.
pub fn category_page(id: u64) -> String {
  format!("category_{id}.html")
}

/// File name of a section page.
pub fn section_page(id: u64) -> String {
  format!("section_{id}.html")
}

fn lineage_label(lineage: &Lineage<'_>) -> String {
  format!(
    "{} &rarr; {}",
    escape_html(lineage.category_name()),
    escape_html(lineage.section_name())
  )
}

fn category_crumb(category: Option<&Category>) -> String {
  match category {
    Some(category) => format!(
      r#"<a href="{}">{}</a>"#,
      category_page(category.id),
      escape_html(&category.name)
    ),
    None => format!("<span>{}</span>", crate::models::UNKNOWN_LABEL),
  }
}

fn section_crumb(section: Option<&Section>) -> String {
  match section {
    Some(section) => format!(
      r#"<a href="{}">{}</a>"#,
      section_page(section.id),
      escape_html(&section.name)
    ),
    None => format!("<span>{}</span>", crate::models::UNKNOWN_LABEL),
  }
}

fn link_list<'t>(links: impl Iterator<Item = (String, &'t str)>) -> String {
  links
    .map(|(href, label)| {
      format!(
        "                    <li><a href=\"{}\">{}</a></li>\n",
        href,
        escape_html(label)
      )
    })
    .collect()
}

fn grid_page(heading: &str, grid_class: &str, cards: &str) -> String {
  format!(
    r#"            <div class="content">
                <h1>{heading}</h1>
                <div class="{grid_class}">
{cards}                </div>
            </div>"#
  )
}
