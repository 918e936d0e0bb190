use serde::Serialize;

/// A failure recorded during a run without aborting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RunError {
    /// A whole source failed; remaining sources still ran.
    Source { source: String, error: String },
    /// One posting failed; the rest of its source still ran.
    Job { job: String, error: String },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Source { source, error } => write!(f, "source {}: {}", source, error),
            RunError::Job { job, error } => write!(f, "job {}: {}", job, error),
        }
    }
}

/// Counters for one complete run over all active sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Candidates returned by extractors, before dedup.
    pub total_scraped: usize,
    /// Postings that were not already stored.
    pub new_jobs: usize,
    /// New postings the channel accepted.
    pub delivered: usize,
    pub errors: Vec<RunError>,
}

impl RunSummary {
    pub fn record_source_error(&mut self, source: &str, error: impl Into<String>) {
        self.errors.push(RunError::Source {
            source: source.to_string(),
            error: error.into(),
        });
    }

    pub fn record_job_error(&mut self, job: &str, error: impl Into<String>) {
        self.errors.push(RunError::Job {
            job: job.to_string(),
            error: error.into(),
        });
    }

    pub fn source_errors(&self) -> impl Iterator<Item = &RunError> {
        self.errors
            .iter()
            .filter(|e| matches!(e, RunError::Source { .. }))
    }

    pub fn job_errors(&self) -> impl Iterator<Item = &RunError> {
        self.errors.iter().filter(|e| matches!(e, RunError::Job { .. }))
    }
}

/// How a call to run all sources ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Another run was in progress; nothing was done.
    Skipped,
    NoSources,
    Completed(RunSummary),
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Skipped => write!(f, "skipped: a run is already in progress"),
            RunOutcome::NoSources => write!(f, "no active sources"),
            RunOutcome::Completed(summary) => write!(
                f,
                "scraped {} jobs, {} new, {} delivered, {} errors",
                summary.total_scraped,
                summary.new_jobs,
                summary.delivered,
                summary.errors.len()
            ),
        }
    }
}

/// Answer to a fire-and-forget trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Started,
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetryOutcome {
    pub attempted: usize,
    pub succeeded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_error_scopes() {
        let mut summary = RunSummary::default();
        summary.record_source_error("Broken Board", "HTTP 500");
        summary.record_job_error("Solidity Dev", "Telegram API error (400): bad request");

        assert_eq!(summary.source_errors().count(), 1);
        assert_eq!(summary.job_errors().count(), 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["errors"][0]["scope"], "source");
        assert_eq!(json["errors"][0]["source"], "Broken Board");
        assert_eq!(json["errors"][1]["scope"], "job");
    }

    #[test]
    fn test_run_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RunStatus::Started).unwrap(), "started");
        assert_eq!(serde_json::to_value(RunStatus::Skipped).unwrap(), "skipped");
    }
}
