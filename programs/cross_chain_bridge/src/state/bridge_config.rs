use anchor_lang::prelude::*;

use crate::constants::{BRIDGE_SEED, MAX_TEXT_LEN};

/// Bridge instance configuration. The PDA also owns the asset vaults and is
/// mint authority for bridged assets.
#[account]
pub struct BridgeConfig {
    /// Admin authority that can modify bridge settings
    pub authority: Pubkey,

    /// Transport account allowed to deliver inbound packets
    pub endpoint: Pubkey,

    /// Receives relay fees paid on outbound sends
    pub fee_collector: Pubkey,

    /// Chain identifier for this bridge instance
    pub chain_id: u16,

    /// System enable flag for emergency stops
    pub system_enabled: bool,

    /// Last text delivered by a remote peer
    pub message: String,

    /// PDA bump seed
    pub bump: u8,
}

impl BridgeConfig {
    pub const SIZE: usize = 32  // authority
        + 32                    // endpoint
        + 32                    // fee_collector
        + 2                     // chain_id
        + 1                     // system_enabled
        + 4 + MAX_TEXT_LEN      // message
        + 1;                    // bump

    pub fn chain_id_seed(&self) -> [u8; 2] {
        self.chain_id.to_le_bytes()
    }

    /// Signer seeds for CPIs where the bridge PDA is the authority.
    pub fn signer_seeds<'a>(&self, chain_id_seed: &'a [u8; 2], bump: &'a [u8; 1]) -> [&'a [u8]; 3] {
        [BRIDGE_SEED, chain_id_seed.as_ref(), bump.as_ref()]
    }
}
