//! Source domain - websites configured for scraping

pub mod models;

pub use models::{NamedExtractor, ScraperType, Selectors, SourceKind, WebsiteSource};
