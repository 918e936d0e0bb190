pub mod content;
pub mod fingerprint;

pub use content::*;
pub use fingerprint::*;
