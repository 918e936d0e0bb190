pub mod deliver_posting;
pub mod ingest_source;
pub mod retry_unposted;

pub use deliver_posting::{deliver_posting, DeliveryOutcome};
pub use ingest_source::ingest_source;
pub use retry_unposted::retry_unposted;
