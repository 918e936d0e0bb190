//! Which extraction strategy a source uses.
//!
//! Resolution order: an explicitly configured custom extractor wins, then a
//! known host, then the generic selector-driven extractor.

use serde::{Deserialize, Serialize};
use url::Url;

/// CSS selectors for the generic extractor. Field selectors are evaluated
/// inside each matched container. Keys accept both snake_case and the
/// camelCase used by older source configs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    #[serde(alias = "jobContainer", alias = "job_container")]
    pub container: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

impl Selectors {
    pub fn is_configured(&self) -> bool {
        self.container
            .as_deref()
            .is_some_and(|container| !container.trim().is_empty())
    }
}

/// Site-specific extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedExtractor {
    RemoteOk,
    JumpTrading,
}

impl NamedExtractor {
    pub fn id(&self) -> &'static str {
        match self {
            NamedExtractor::RemoteOk => "remoteok",
            NamedExtractor::JumpTrading => "jumptrading",
        }
    }

    /// Match a source URL against the hosts with dedicated extractors.
    pub fn for_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url.trim()).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        match host {
            "remoteok.com" | "remoteok.io" => Some(NamedExtractor::RemoteOk),
            "jumptrading.com" => Some(NamedExtractor::JumpTrading),
            _ => None,
        }
    }
}

impl std::fmt::Display for NamedExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for NamedExtractor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "remoteok" | "remote_ok" => Ok(NamedExtractor::RemoteOk),
            "jumptrading" | "jump_trading" => Ok(NamedExtractor::JumpTrading),
            other => Err(anyhow::anyhow!("Unknown custom scraper: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Generic(Selectors),
    Named(NamedExtractor),
}

impl SourceKind {
    pub fn resolve(url: &str, custom_name: Option<&str>, selectors: Option<&Selectors>) -> Self {
        if let Some(named) = custom_name.and_then(|name| name.parse().ok()) {
            return SourceKind::Named(named);
        }

        if let Some(named) = NamedExtractor::for_url(url) {
            return SourceKind::Named(named);
        }

        SourceKind::Generic(selectors.cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_custom_name_wins() {
        let kind = SourceKind::resolve(
            "https://remoteok.com/remote-web3-jobs",
            Some("jumptrading"),
            None,
        );
        assert_eq!(kind, SourceKind::Named(NamedExtractor::JumpTrading));
    }

    #[test]
    fn test_host_match() {
        assert_eq!(
            SourceKind::resolve("https://remoteok.com/remote-web3-jobs", None, None),
            SourceKind::Named(NamedExtractor::RemoteOk)
        );
        assert_eq!(
            SourceKind::resolve(
                "https://www.jumptrading.com/hr/experienced-candidates",
                None,
                None
            ),
            SourceKind::Named(NamedExtractor::JumpTrading)
        );
    }

    #[test]
    fn test_unknown_custom_name_falls_through() {
        let selectors = Selectors {
            container: Some(".job".into()),
            ..Default::default()
        };
        assert_eq!(
            SourceKind::resolve("https://jobs.example.org", Some("nope"), Some(&selectors)),
            SourceKind::Generic(selectors)
        );
    }

    #[test]
    fn test_lookalike_host_is_generic() {
        assert!(matches!(
            SourceKind::resolve("https://notremoteok.com/jobs", None, None),
            SourceKind::Generic(_)
        ));
    }

    #[test]
    fn test_selectors_accept_camel_case_container() {
        let selectors: Selectors =
            serde_json::from_str(r#"{"jobContainer": ".job-card", "title": "h2"}"#).unwrap();
        assert_eq!(selectors.container.as_deref(), Some(".job-card"));
        assert_eq!(selectors.title.as_deref(), Some("h2"));
        assert!(selectors.is_configured());
        assert!(!Selectors::default().is_configured());
    }
}
