//! Account-independent bridge protocol.
//!
//! Instruction handlers bind these pieces to Solana accounts; everything here
//! works on plain values so it can be exercised without a validator.

pub mod fee;
pub mod inbound;
pub mod outbound;
pub mod packet;

#[cfg(test)]
mod simulation;

pub use fee::{FeeSchedule, RelayParams};
pub use inbound::{AssetTransfer, Delivery, MessageKey, ReleaseHandler, ReleasePlan, RetryStore};
pub use outbound::BridgeRequest;
pub use packet::{DecodeError, Identity, Packet, PacketKind};
