pub mod generic;
pub mod http;
pub mod jump_trading;
pub mod remoteok;

pub use generic::GenericExtractor;
pub use jump_trading::JumpTradingExtractor;
pub use remoteok::RemoteOkExtractor;
