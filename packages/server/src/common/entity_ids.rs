//! Typed ids for persisted entities.

pub use super::id::Id;

/// Entity marker types. Kept in their own module so they never shadow the
/// model structs of the same name.
pub mod markers {
    /// Rows of `job_postings`.
    pub struct JobPosting;

    /// Rows of `website_sources`.
    pub struct WebsiteSource;
}

pub type JobPostingId = Id<markers::JobPosting>;

pub type WebsiteSourceId = Id<markers::WebsiteSource>;
