//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use scheduled_tasks::start_scheduler;
pub use stores::{PgJobStore, PgSourceRegistry};
pub use test_dependencies::TestDependencies;
pub use traits::*;
