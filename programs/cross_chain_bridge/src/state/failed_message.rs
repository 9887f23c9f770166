use anchor_lang::prelude::*;

use crate::constants::MAX_PAYLOAD_SIZE;
use crate::protocol::MessageKey;

/// Retry record for an inbound packet that failed after authentication.
/// Created on failure, closed by the first successful retry.
#[account]
pub struct FailedMessage {
    pub src_chain_id: u16,
    pub src_peer: [u8; 32],
    pub nonce: u64,

    /// keccak256 of `payload`
    pub payload_hash: [u8; 32],

    /// Exact bytes delivered by the transport
    pub payload: Vec<u8>,

    /// Error code of the last failure
    pub reason: u32,

    pub failed_at: i64,

    /// Funded the record; receives the rent back on close
    pub payer: Pubkey,

    /// PDA bump seed
    pub bump: u8,
}

impl FailedMessage {
    pub const SIZE: usize = 2   // src_chain_id
        + 32                    // src_peer
        + 8                     // nonce
        + 32                    // payload_hash
        + 4 + MAX_PAYLOAD_SIZE  // payload
        + 4                     // reason
        + 8                     // failed_at
        + 32                    // payer
        + 1;                    // bump

    pub fn message_key(&self) -> MessageKey {
        MessageKey {
            src_chain_id: self.src_chain_id,
            src_peer: self.src_peer,
            nonce: self.nonce,
        }
    }
}
