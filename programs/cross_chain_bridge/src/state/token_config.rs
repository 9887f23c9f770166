use anchor_lang::prelude::*;

/// Local asset to remote asset mapping for one channel
#[account]
pub struct TokenConfig {
    /// Bridge config this entry belongs to
    pub bridge: Pubkey,

    pub remote_chain_id: u16,

    /// SPL mint for fungible tokens, collection key for NFT / FT ids
    pub local_asset: Pubkey,

    /// Asset identity on the remote chain
    pub remote_asset: [u8; 32],

    /// Whether the bridge may mint this asset when its vault runs short
    pub mint_enabled: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl TokenConfig {
    pub const SIZE: usize = 32  // bridge
        + 2                     // remote_chain_id
        + 32                    // local_asset
        + 32                    // remote_asset
        + 1                     // mint_enabled
        + 1;                    // bump

    /// Whether this entry maps `local_asset` on `remote_chain_id` for `bridge`.
    pub fn maps(&self, bridge: &Pubkey, remote_chain_id: u16, local_asset: &Pubkey) -> bool {
        self.bridge == *bridge && self.remote_chain_id == remote_chain_id && self.local_asset == *local_asset
    }
}
