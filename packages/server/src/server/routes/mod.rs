// HTTP routes
pub mod health;
pub mod scraper;

pub use health::*;
pub use scraper::*;
