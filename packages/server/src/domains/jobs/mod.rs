//! Job postings domain - persisted, deduplicated job listings

pub mod models;

pub use models::{DeliveryStatus, JobPosting, JobType};
