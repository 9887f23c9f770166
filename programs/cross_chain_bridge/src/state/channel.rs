use anchor_lang::prelude::*;

use crate::errors::BridgeError;
use crate::protocol::FeeSchedule;

/// Link to one remote chain: trusted peer, sequence counters and relay pricing
#[account]
pub struct Channel {
    /// Remote chain identifier
    pub remote_chain_id: u16,

    /// Only peer accepted as a source on this channel
    pub trusted_remote: Option<[u8; 32]>,

    /// Packets dispatched to the remote chain
    pub outbound_nonce: u64,

    /// Last sequence number accepted from the remote chain; the next
    /// delivery must carry exactly one more
    pub inbound_nonce: u64,

    pub fee: FeeSchedule,

    /// PDA bump seed
    pub bump: u8,
}

impl Channel {
    pub const SIZE: usize = 2   // remote_chain_id
        + 1 + 32                // trusted_remote
        + 8                     // outbound_nonce
        + 8                     // inbound_nonce
        + FeeSchedule::SIZE     // fee
        + 1;                    // bump

    /// Claim the next outbound sequence number.
    pub fn next_outbound_nonce(&mut self) -> Result<u64> {
        self.outbound_nonce = self
            .outbound_nonce
            .checked_add(1)
            .ok_or(BridgeError::ArithmeticOverflow)?;
        Ok(self.outbound_nonce)
    }
}
