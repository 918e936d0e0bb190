use serde::{Deserialize, Serialize};

use crate::common::utils::{clean_or, clean_text, job_fingerprint};
use crate::domains::jobs::JobType;

pub const DEFAULT_COMPANY: &str = "Unknown";
pub const DEFAULT_LOCATION: &str = "Remote";
pub const DEFAULT_SALARY: &str = "Not specified";

/// A listing as read from a source, before persistence.
///
/// The fingerprint is derived from title, company and apply URL in
/// [`ExtractionCandidate::new`] and is not recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub apply_url: String,
    pub source: String,
    pub source_url: String,
    pub tags: Vec<String>,
    pub job_type: JobType,
    pub fingerprint: String,
}

impl ExtractionCandidate {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        apply_url: impl Into<String>,
        source: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        let title = clean_text(&title.into());
        let company = clean_or(&company.into(), DEFAULT_COMPANY);
        let apply_url = apply_url.into().trim().to_string();
        let fingerprint = job_fingerprint(&title, &company, &apply_url);
        let job_type = JobType::classify(&title, "");

        Self {
            title,
            company,
            location: DEFAULT_LOCATION.to_string(),
            salary: DEFAULT_SALARY.to_string(),
            description: String::new(),
            apply_url,
            source: source.into(),
            source_url: source_url.into(),
            tags: Vec::new(),
            job_type,
            fingerprint,
        }
    }

    /// Empty input keeps the default.
    pub fn with_location(mut self, location: &str) -> Self {
        let location = clean_text(location);
        if !location.is_empty() {
            self.location = location;
        }
        self
    }

    /// Empty input keeps the default.
    pub fn with_salary(mut self, salary: &str) -> Self {
        let salary = clean_text(salary);
        if !salary.is_empty() {
            self.salary = salary;
        }
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = clean_text(description);
        self.job_type = JobType::classify(&self.title, &self.description);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags
            .into_iter()
            .map(|tag| clean_text(tag.as_ref()))
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let candidate = ExtractionCandidate::new(
            " Solidity  Dev ",
            "",
            "https://acme.xyz/jobs/1",
            "Acme",
            "https://acme.xyz",
        );

        assert_eq!(candidate.title, "Solidity Dev");
        assert_eq!(candidate.company, DEFAULT_COMPANY);
        assert_eq!(candidate.location, DEFAULT_LOCATION);
        assert_eq!(candidate.salary, DEFAULT_SALARY);
        assert_eq!(candidate.job_type, JobType::Unknown);
    }

    #[test]
    fn test_fingerprint_fixed_at_construction() {
        let candidate =
            ExtractionCandidate::new("Solidity Dev", "Acme", "https://acme.xyz/jobs/1", "Acme", "https://acme.xyz");
        let fingerprint = candidate.fingerprint.clone();

        let enriched = candidate
            .with_location("Lisbon")
            .with_salary("$120k")
            .with_description("Full-time role")
            .with_tags(["solidity", " defi "]);

        assert_eq!(enriched.fingerprint, fingerprint);
        assert_eq!(
            fingerprint,
            job_fingerprint("Solidity Dev", "Acme", "https://acme.xyz/jobs/1")
        );
        assert_eq!(enriched.tags, vec!["solidity", "defi"]);
        assert_eq!(enriched.job_type, JobType::FullTime);
    }

    #[test]
    fn test_blank_location_keeps_default() {
        let candidate = ExtractionCandidate::new("A", "B", "https://b.io/1", "B", "https://b.io")
            .with_location("  ")
            .with_salary("");
        assert_eq!(candidate.location, DEFAULT_LOCATION);
        assert_eq!(candidate.salary, DEFAULT_SALARY);
    }
}
