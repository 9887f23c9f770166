pub mod bridge_config;
pub mod channel;
pub mod failed_message;
pub mod fee_sponsor;
pub mod token_config;

pub use bridge_config::*;
pub use channel::*;
pub use failed_message::*;
pub use fee_sponsor::*;
pub use token_config::*;
