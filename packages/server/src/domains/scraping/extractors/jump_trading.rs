//! Jump Trading careers page. The listings are rendered client-side, so the
//! page is loaded in headless Chromium through a Playwright script run by
//! Node, which prints the listings as JSON on stdout.

use std::collections::HashSet;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use super::generic::resolve_link;
use crate::domains::scraping::{ExtractionCandidate, ExtractionError, ExtractionResult};
use crate::domains::source::WebsiteSource;

pub const JUMP_TRADING_CAREERS_URL: &str = "https://www.jumptrading.com/hr/experienced-candidates";
pub const JUMP_TRADING_COMPANY: &str = "Jump Trading";

pub struct JumpTradingExtractor {
    node_binary: String,
    timeout: Duration,
}

impl JumpTradingExtractor {
    pub fn new(node_binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            node_binary: node_binary.into(),
            timeout,
        }
    }

    pub async fn extract(&self, source: &WebsiteSource) -> ExtractionResult<Vec<ExtractionCandidate>> {
        let stdout = self.render(JUMP_TRADING_CAREERS_URL).await?;
        parse_browser_output(&stdout, &source.name, JUMP_TRADING_CAREERS_URL)
    }

    /// Run the page script. The child is killed if the deadline passes.
    async fn render(&self, page_url: &str) -> ExtractionResult<String> {
        let script = listing_script(page_url);

        let child = Command::new(&self.node_binary)
            .arg("-e")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExtractionError::Browser(format!("failed to start {}: {}", self.node_binary, e))
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ExtractionError::Browser(e.to_string()))?,
            Err(_) => {
                warn!(url = %page_url, timeout = ?self.timeout, "Headless browser timed out");
                return Err(ExtractionError::BrowserTimeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Browser(format!(
                "script exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Playwright script printing `[{title, location, link}]` for every listing
/// element on the page.
fn listing_script(page_url: &str) -> String {
    // A JSON string literal is a valid JS string literal.
    let url_literal = serde_json::Value::String(page_url.to_string()).to_string();

    format!(
        r#"
        const {{ chromium }} = require('playwright');
        (async () => {{
            const browser = await chromium.launch({{ headless: true }});
            try {{
                const page = await browser.newPage();
                await page.goto({url}, {{ waitUntil: 'networkidle', timeout: 30000 }});
                const jobs = await page.$$eval(
                    '.job-listing, .position, .opening, [class*="job"]',
                    (elements) => elements.map((el) => {{
                        const text = (selector) => {{
                            const node = el.querySelector(selector);
                            return node ? node.textContent : '';
                        }};
                        const anchor = el.tagName === 'A' ? el : el.querySelector('a');
                        return {{
                            title: text('h3, h4, .title, [class*="title"]'),
                            location: text('.location, [class*="location"]'),
                            link: anchor ? anchor.getAttribute('href') : null,
                        }};
                    }})
                );
                process.stdout.write(JSON.stringify(jobs));
            }} finally {{
                await browser.close();
            }}
        }})().catch((err) => {{
            console.error(err && err.message ? err.message : String(err));
            process.exit(1);
        }});
        "#,
        url = url_literal
    )
}

#[derive(Debug, Deserialize)]
struct BrowserListing {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// The listing selectors overlap (a `.position` inside a `[class*="job"]`
/// card matches twice), so repeated listings are collapsed here.
pub fn parse_browser_output(
    stdout: &str,
    source_name: &str,
    page_url: &str,
) -> ExtractionResult<Vec<ExtractionCandidate>> {
    let listings: Vec<BrowserListing> = serde_json::from_str(stdout.trim())
        .map_err(|e| ExtractionError::Format(format!("browser output is not a listing array: {}", e)))?;

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for listing in listings {
        let title = listing.title.unwrap_or_default();
        let link = listing.link.unwrap_or_default();
        if title.trim().is_empty() || link.trim().is_empty() {
            continue;
        }

        let apply_url = match resolve_link(link.trim(), page_url) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "Unresolvable Jump Trading link, skipping");
                continue;
            }
        };

        let candidate =
            ExtractionCandidate::new(title, JUMP_TRADING_COMPANY, apply_url, source_name, page_url)
                .with_location(listing.location.as_deref().unwrap_or_default());

        if seen.insert(candidate.fingerprint.clone()) {
            candidates.push(candidate);
        }
    }

    Ok(candidates)
}
