//! Selector-driven extractor for ordinary HTML job boards.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::http::fetch_text;
use crate::domains::scraping::{ExtractionCandidate, ExtractionError, ExtractionResult};
use crate::domains::source::{Selectors, WebsiteSource};

pub struct GenericExtractor {
    client: reqwest::Client,
}

impl GenericExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn extract(
        &self,
        source: &WebsiteSource,
        selectors: &Selectors,
    ) -> ExtractionResult<Vec<ExtractionCandidate>> {
        if !selectors.is_configured() {
            info!(source = %source.name, "No container selector configured, skipping");
            return Ok(Vec::new());
        }

        let html = fetch_text(&self.client, &source.url).await?;
        parse_listings(&html, &source.name, &source.url, selectors)
    }
}

/// Field selectors compiled once per page.
struct CompiledSelectors {
    container: Selector,
    title: Option<Selector>,
    company: Option<Selector>,
    location: Option<Selector>,
    salary: Option<Selector>,
    link: Option<Selector>,
    description: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(selectors: &Selectors) -> ExtractionResult<Self> {
        let container = selectors
            .container
            .as_deref()
            .ok_or_else(|| ExtractionError::InvalidSelector {
                selector: String::new(),
                reason: "container selector is required".into(),
            })?;

        Ok(Self {
            container: compile(container)?,
            title: compile_optional(&selectors.title)?,
            company: compile_optional(&selectors.company)?,
            location: compile_optional(&selectors.location)?,
            salary: compile_optional(&selectors.salary)?,
            link: compile_optional(&selectors.link)?,
            description: compile_optional(&selectors.description)?,
        })
    }
}

fn compile(selector: &str) -> ExtractionResult<Selector> {
    Selector::parse(selector).map_err(|e| ExtractionError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

fn compile_optional(selector: &Option<String>) -> ExtractionResult<Option<Selector>> {
    match selector.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => compile(s).map(Some),
        _ => Ok(None),
    }
}

/// Text of every match of `selector` inside `element`. Text nodes within a
/// match are concatenated as-is, so inline markup never splits a word;
/// separate matches are joined with a space.
fn text_of(element: &ElementRef<'_>, selector: Option<&Selector>) -> String {
    let Some(selector) = selector else {
        return String::new();
    };
    element
        .select(selector)
        .map(|node| node.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `href` of the first link match, or of the container itself when no link
/// selector is configured.
fn href_of<'a>(element: &ElementRef<'a>, selector: Option<&Selector>) -> Option<&'a str> {
    let href = match selector {
        Some(selector) => element
            .select(selector)
            .find_map(|node| node.value().attr("href")),
        None => element.value().attr("href"),
    }?;

    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        None
    } else {
        Some(href)
    }
}

/// Absolute links are kept; anything else is joined onto the source origin.
pub fn resolve_link(link: &str, source_url: &str) -> ExtractionResult<String> {
    if link.starts_with("http://") || link.starts_with("https://") {
        return Ok(link.to_string());
    }

    let invalid = || ExtractionError::InvalidUrl {
        url: link.to_string(),
    };
    let base = Url::parse(source_url).map_err(|_| ExtractionError::InvalidUrl {
        url: source_url.to_string(),
    })?;
    let origin = Url::parse(&base.origin().ascii_serialization()).map_err(|_| invalid())?;

    origin.join(link).map(String::from).map_err(|_| invalid())
}

/// Parse one page of listings. Containers without a title or link are
/// dropped; missing company, location and salary take their defaults.
pub fn parse_listings(
    html: &str,
    source_name: &str,
    source_url: &str,
    selectors: &Selectors,
) -> ExtractionResult<Vec<ExtractionCandidate>> {
    let compiled = CompiledSelectors::compile(selectors)?;
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for element in document.select(&compiled.container) {
        let title = text_of(&element, compiled.title.as_ref());
        let Some(link) = href_of(&element, compiled.link.as_ref()) else {
            debug!(source = %source_name, "Listing without link, skipping");
            continue;
        };
        if title.trim().is_empty() {
            debug!(source = %source_name, "Listing without title, skipping");
            continue;
        }

        let apply_url = match resolve_link(link, source_url) {
            Ok(url) => url,
            Err(e) => {
                debug!(source = %source_name, error = %e, "Unresolvable link, skipping");
                continue;
            }
        };

        let candidate = ExtractionCandidate::new(
            title,
            text_of(&element, compiled.company.as_ref()),
            apply_url,
            source_name,
            source_url,
        )
        .with_location(&text_of(&element, compiled.location.as_ref()))
        .with_salary(&text_of(&element, compiled.salary.as_ref()))
        .with_description(&text_of(&element, compiled.description.as_ref()));

        candidates.push(candidate);
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
        <html><body>
          <div class="job">
            <h2 class="title">Solidity   Dev</h2>
            <span class="company">Acme</span>
            <span class="location">Berlin</span>
            <span class="salary">$150k</span>
            <a class="apply" href="/jobs/1">Apply</a>
            <p class="desc">Full-time protocol work.</p>
          </div>
          <div class="job">
            <h2 class="title">Rust Engineer</h2>
            <a class="apply" href="https://other.example.com/rust">Apply</a>
          </div>
          <div class="job">
            <h2 class="title">No Link Role</h2>
          </div>
          <div class="job">
            <a class="apply" href="/jobs/untitled">Apply</a>
          </div>
        </body></html>
    "#;

    fn selectors() -> Selectors {
        Selectors {
            container: Some(".job".into()),
            title: Some(".title".into()),
            company: Some(".company".into()),
            location: Some(".location".into()),
            salary: Some(".salary".into()),
            link: Some("a.apply".into()),
            description: Some(".desc".into()),
        }
    }

    #[test]
    fn test_parse_listings_extracts_fields() {
        let candidates =
            parse_listings(BOARD, "Acme Board", "https://jobs.acme.xyz/careers?page=2", &selectors())
                .unwrap();

        assert_eq!(candidates.len(), 2);
        let first = &candidates[0];
        assert_eq!(first.title, "Solidity Dev");
        assert_eq!(first.company, "Acme");
        assert_eq!(first.location, "Berlin");
        assert_eq!(first.salary, "$150k");
        assert_eq!(first.apply_url, "https://jobs.acme.xyz/jobs/1");
        assert_eq!(first.source, "Acme Board");
        assert_eq!(first.description, "Full-time protocol work.");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let candidates =
            parse_listings(BOARD, "Acme Board", "https://jobs.acme.xyz", &selectors()).unwrap();

        let second = &candidates[1];
        assert_eq!(second.apply_url, "https://other.example.com/rust");
        assert_eq!(second.company, "Unknown");
        assert_eq!(second.location, "Remote");
        assert_eq!(second.salary, "Not specified");
    }

    #[test]
    fn test_container_link_used_without_link_selector() {
        let html = r#"<a class="card" href="jobs/7"><h3>Protocol Engineer</h3></a>"#;
        let selectors = Selectors {
            container: Some("a.card".into()),
            title: Some("h3".into()),
            ..Default::default()
        };

        let candidates = parse_listings(html, "Board", "https://board.io/list", &selectors).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].apply_url, "https://board.io/jobs/7");
    }

    #[test]
    fn test_inline_markup_does_not_split_words() {
        let html = r#"
            <div class="job">
              <h2 class="title">Block<b>chain</b> Engineer</h2>
              <span class="salary">$120<small>k</small></span>
              <a class="apply" href="/jobs/9">Apply</a>
            </div>
        "#;

        let candidates = parse_listings(html, "Board", "https://board.io", &selectors()).unwrap();

        assert_eq!(candidates[0].title, "Blockchain Engineer");
        assert_eq!(candidates[0].salary, "$120k");
        assert_eq!(
            candidates[0].fingerprint,
            crate::common::utils::job_fingerprint(
                "Blockchain Engineer",
                "Unknown",
                "https://board.io/jobs/9"
            )
        );
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let selectors = Selectors {
            container: Some("div[".into()),
            ..Default::default()
        };
        assert!(matches!(
            parse_listings("<div></div>", "Board", "https://board.io", &selectors),
            Err(ExtractionError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_no_matches_is_empty() {
        let candidates =
            parse_listings("<html></html>", "Board", "https://board.io", &selectors()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("/a/b", "https://x.io/deep/path").unwrap(),
            "https://x.io/a/b"
        );
        assert_eq!(
            resolve_link("https://y.io/job", "https://x.io").unwrap(),
            "https://y.io/job"
        );
        assert!(resolve_link("/a", "not a url").is_err());
    }
}
