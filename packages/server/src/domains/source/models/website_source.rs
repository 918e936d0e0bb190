use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use super::{Selectors, SourceKind};
use crate::common::WebsiteSourceId;

/// A website configured for scraping.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WebsiteSource {
    pub id: WebsiteSourceId,
    pub name: String,
    pub url: String,
    pub active: bool,
    pub scraper_type: String,
    pub selectors: Option<Json<Selectors>>,
    pub custom_scraper_name: Option<String>,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub jobs_found: i64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScraperType {
    Generic,
    Custom,
}

impl std::fmt::Display for ScraperType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScraperType::Generic => write!(f, "generic"),
            ScraperType::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for ScraperType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "generic" => Ok(ScraperType::Generic),
            "custom" => Ok(ScraperType::Custom),
            _ => Err(anyhow::anyhow!("Invalid scraper type: {}", s)),
        }
    }
}

/// Input for registering a source.
#[derive(Debug, Clone)]
pub struct NewWebsiteSource {
    pub name: String,
    pub url: String,
    pub scraper_type: ScraperType,
    pub selectors: Option<Selectors>,
    pub custom_scraper_name: Option<String>,
    pub notes: String,
}

impl NewWebsiteSource {
    pub fn generic(name: impl Into<String>, url: impl Into<String>, selectors: Selectors) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            scraper_type: ScraperType::Generic,
            selectors: Some(selectors),
            custom_scraper_name: None,
            notes: String::new(),
        }
    }

    pub fn custom(
        name: impl Into<String>,
        url: impl Into<String>,
        scraper_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            scraper_type: ScraperType::Custom,
            selectors: None,
            custom_scraper_name: Some(scraper_name.into()),
            notes: String::new(),
        }
    }

    /// The row an insert would produce, for in-memory registries.
    pub fn into_source(self, created_at: DateTime<Utc>) -> WebsiteSource {
        WebsiteSource {
            id: WebsiteSourceId::new(),
            name: self.name,
            url: self.url,
            active: true,
            scraper_type: self.scraper_type.to_string(),
            selectors: self.selectors.map(Json),
            custom_scraper_name: self.custom_scraper_name,
            last_scraped_at: None,
            jobs_found: 0,
            notes: self.notes,
            created_at,
            updated_at: created_at,
        }
    }
}

impl WebsiteSource {
    pub fn scraper_type(&self) -> ScraperType {
        self.scraper_type.parse().unwrap_or(ScraperType::Generic)
    }

    /// Extraction strategy for this source. The custom scraper name is only
    /// consulted for `custom` sources.
    pub fn kind(&self) -> SourceKind {
        let custom_name = match self.scraper_type() {
            ScraperType::Custom => self.custom_scraper_name.as_deref(),
            ScraperType::Generic => None,
        };
        SourceKind::resolve(
            &self.url,
            custom_name,
            self.selectors.as_ref().map(|json| &json.0),
        )
    }

    pub async fn find_by_id(id: WebsiteSourceId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM website_sources WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM website_sources WHERE active = true ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(input: NewWebsiteSource, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO website_sources (id, name, url, scraper_type, selectors, custom_scraper_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(WebsiteSourceId::new())
        .bind(&input.name)
        .bind(&input.url)
        .bind(input.scraper_type.to_string())
        .bind(input.selectors.map(Json))
        .bind(&input.custom_scraper_name)
        .bind(&input.notes)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_active(id: WebsiteSourceId, active: bool, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE website_sources SET active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Stamp the run time and add this run's candidate count to the total.
    pub async fn record_run(id: WebsiteSourceId, candidates_found: i64, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE website_sources
            SET last_scraped_at = NOW(),
                jobs_found = jobs_found + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(candidates_found)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::source::NamedExtractor;

    #[test]
    fn test_generic_source_uses_selectors() {
        let selectors = Selectors {
            container: Some(".job".into()),
            title: Some("h2".into()),
            ..Default::default()
        };
        let source = NewWebsiteSource::generic("Board", "https://jobs.example.org", selectors.clone())
            .into_source(Utc::now());

        assert_eq!(source.kind(), SourceKind::Generic(selectors));
    }

    #[test]
    fn test_custom_name_ignored_for_generic_sources() {
        let mut source = NewWebsiteSource::generic("Board", "https://jobs.example.org", Selectors::default())
            .into_source(Utc::now());
        source.custom_scraper_name = Some("remoteok".into());

        assert!(matches!(source.kind(), SourceKind::Generic(_)));
    }

    #[test]
    fn test_custom_source_resolves_named_extractor() {
        let source = NewWebsiteSource::custom("Jump", "https://careers.example.com", "jumptrading")
            .into_source(Utc::now());

        assert_eq!(source.scraper_type(), ScraperType::Custom);
        assert_eq!(source.kind(), SourceKind::Named(NamedExtractor::JumpTrading));
    }
}
