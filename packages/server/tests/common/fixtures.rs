//! Candidate and source builders shared by the integration tests.

use server_core::domains::scraping::ExtractionCandidate;

pub fn candidate(title: &str, company: &str, apply_url: &str) -> ExtractionCandidate {
    ExtractionCandidate::new(title, company, apply_url, "Test Board", "https://board.test")
}

/// The listing every dedup test revolves around.
pub fn solidity_dev() -> ExtractionCandidate {
    candidate("Solidity Dev", "Acme", "https://acme.xyz/jobs/1")
}

/// `count` distinct candidates named `"{prefix} {n}"`.
pub fn candidates(prefix: &str, count: usize) -> Vec<ExtractionCandidate> {
    (1..=count)
        .map(|n| {
            candidate(
                &format!("{} {}", prefix, n),
                "Acme",
                &format!("https://acme.xyz/jobs/{}-{}", prefix.to_lowercase().replace(' ', "-"), n),
            )
        })
        .collect()
}
