//! Scraping domain - turns a configured source into extraction candidates.

pub mod candidate;
pub mod error;
pub mod extractors;
pub mod source_extractor;

pub use candidate::ExtractionCandidate;
pub use error::{ExtractionError, ExtractionResult};
pub use source_extractor::{ExtractorConfig, SourceExtractor};
