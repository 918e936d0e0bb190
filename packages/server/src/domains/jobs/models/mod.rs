pub mod job_posting;
pub mod job_type;

pub use job_posting::{DeliveryStatus, JobPosting};
pub use job_type::JobType;
