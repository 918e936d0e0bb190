pub mod source_kind;
pub mod website_source;

pub use source_kind::{NamedExtractor, Selectors, SourceKind};
pub use website_source::{NewWebsiteSource, ScraperType, WebsiteSource};
