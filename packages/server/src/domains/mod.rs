// Business domains
pub mod delivery;
pub mod ingestion;
pub mod jobs;
pub mod scraping;
pub mod source;
