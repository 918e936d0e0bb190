//! RemoteOK public API, filtered to web3 roles.

use scraper::Html;
use serde::Deserialize;
use tracing::debug;

use super::http::fetch_text;
use crate::domains::scraping::{ExtractionCandidate, ExtractionError, ExtractionResult};
use crate::domains::source::WebsiteSource;

pub const REMOTEOK_API_URL: &str = "https://remoteok.com/api";
pub const REMOTEOK_BASE_URL: &str = "https://remoteok.com";

const WEB3_TAGS: &[&str] = &[
    "web3",
    "blockchain",
    "crypto",
    "ethereum",
    "solidity",
    "defi",
    "nft",
];
const WEB3_TITLE_TERMS: &[&str] = &["web3", "blockchain", "crypto"];

pub struct RemoteOkExtractor {
    client: reqwest::Client,
    api_url: String,
}

impl RemoteOkExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            api_url: REMOTEOK_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub async fn extract(&self, source: &WebsiteSource) -> ExtractionResult<Vec<ExtractionCandidate>> {
        let body = fetch_text(&self.client, &self.api_url).await?;
        parse_listings(&body, &source.name, &source.url)
    }
}

#[derive(Debug, Deserialize)]
struct RemoteOkListing {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    salary_min: Option<f64>,
    #[serde(default)]
    salary_max: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tags: Vec<Option<String>>,
}

impl RemoteOkListing {
    fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().flatten().map(String::as_str)
    }

    fn is_web3(&self) -> bool {
        let tagged = self
            .tags()
            .any(|tag| WEB3_TAGS.contains(&tag.to_lowercase().as_str()));
        let position = self.position.as_deref().unwrap_or_default().to_lowercase();

        tagged || WEB3_TITLE_TERMS.iter().any(|term| position.contains(term))
    }

    /// `$min-max` when both bounds are positive.
    fn salary(&self) -> Option<String> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) if min > 0.0 && max > 0.0 => {
                Some(format!("${:.0}-{:.0}", min, max))
            }
            _ => None,
        }
    }

    fn apply_url(&self) -> Option<String> {
        let url = self.url.as_deref()?.trim();
        if url.is_empty() {
            None
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Some(url.to_string())
        } else {
            Some(format!("{}{}", REMOTEOK_BASE_URL, url))
        }
    }
}

/// RemoteOK descriptions are HTML fragments.
fn strip_html(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The first array element is API metadata and is skipped. Entries that fail
/// to parse, are not web3, or lack a position or URL are dropped.
pub fn parse_listings(
    body: &str,
    source_name: &str,
    source_url: &str,
) -> ExtractionResult<Vec<ExtractionCandidate>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| ExtractionError::Format(format!("RemoteOK response is not a JSON array: {}", e)))?;

    let candidates = entries
        .into_iter()
        .skip(1)
        .filter_map(|entry| match serde_json::from_value::<RemoteOkListing>(entry) {
            Ok(listing) => Some(listing),
            Err(e) => {
                debug!(error = %e, "Skipping malformed RemoteOK entry");
                None
            }
        })
        .filter(RemoteOkListing::is_web3)
        .filter_map(|listing| {
            let title = listing.position.clone().filter(|p| !p.trim().is_empty())?;
            let apply_url = listing.apply_url()?;

            let mut candidate = ExtractionCandidate::new(
                title,
                listing.company.clone().unwrap_or_default(),
                apply_url,
                source_name,
                source_url,
            )
            .with_location(listing.location.as_deref().unwrap_or_default())
            .with_description(&strip_html(listing.description.as_deref().unwrap_or_default()))
            .with_tags(listing.tags());

            if let Some(salary) = listing.salary() {
                candidate = candidate.with_salary(&salary);
            }
            Some(candidate)
        })
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"[
        {"legal": "API terms of service"},
        {
            "position": "Senior Solidity Engineer",
            "company": "ChainCo",
            "location": "",
            "salary_min": 120000,
            "salary_max": 180000,
            "description": "<p>Build <b>DeFi</b> protocols</p>",
            "url": "/remote-jobs/123",
            "tags": ["solidity", "ethereum", null]
        },
        {
            "position": "Frontend Developer",
            "company": "WebCo",
            "url": "https://remoteok.com/remote-jobs/124",
            "tags": ["react"]
        },
        {
            "position": "Crypto Analyst",
            "company": "TradeCo",
            "location": "Singapore",
            "salary_min": 0,
            "salary_max": 0,
            "url": "https://remoteok.com/remote-jobs/125",
            "tags": []
        },
        {
            "company": "NoTitle",
            "url": "/remote-jobs/126",
            "tags": ["web3"]
        }
    ]"#;

    #[test]
    fn test_filters_to_web3_and_maps_fields() {
        let candidates = parse_listings(RESPONSE, "RemoteOK", "https://remoteok.com").unwrap();
        assert_eq!(candidates.len(), 2);

        let solidity = &candidates[0];
        assert_eq!(solidity.title, "Senior Solidity Engineer");
        assert_eq!(solidity.company, "ChainCo");
        assert_eq!(solidity.location, "Remote");
        assert_eq!(solidity.salary, "$120000-180000");
        assert_eq!(solidity.apply_url, "https://remoteok.com/remote-jobs/123");
        assert_eq!(solidity.description, "Build DeFi protocols");
        assert_eq!(solidity.tags, vec!["solidity", "ethereum"]);

        let analyst = &candidates[1];
        assert_eq!(analyst.title, "Crypto Analyst");
        assert_eq!(analyst.location, "Singapore");
        assert_eq!(analyst.salary, "Not specified");
    }

    #[test]
    fn test_metadata_only_response_is_empty() {
        let candidates =
            parse_listings(r#"[{"legal": "terms"}]"#, "RemoteOK", "https://remoteok.com").unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_non_array_is_format_error() {
        assert!(matches!(
            parse_listings(r#"{"error": "rate limited"}"#, "RemoteOK", "https://remoteok.com"),
            Err(ExtractionError::Format(_))
        ));
    }
}
