pub mod admin;
pub mod channel_registry;
pub mod delivery;
pub mod estimate_fee;
pub mod initialize;
pub mod receive_packet;
pub mod retry_message;
pub mod send;
pub mod sponsor;
pub mod token_registry;

pub use admin::*;
pub use channel_registry::*;
pub use estimate_fee::*;
pub use initialize::*;
pub use receive_packet::*;
pub use retry_message::*;
pub use send::*;
pub use sponsor::*;
pub use token_registry::*;
