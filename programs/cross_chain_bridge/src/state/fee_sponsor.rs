use anchor_lang::prelude::*;

use crate::errors::BridgeError;

/// Lamport pool paying relay fees for sponsored text updates
#[account]
pub struct FeeSponsor {
    /// Admin authority that can change the cap
    pub authority: Pubkey,

    /// Largest fee the sponsor pays for a single message
    pub max_fee_per_message: u64,

    /// Lifetime lamports paid out
    pub total_sponsored: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl FeeSponsor {
    pub const SIZE: usize = 32  // authority
        + 8                     // max_fee_per_message
        + 8                     // total_sponsored
        + 1;                    // bump

    pub fn check_cap(&self, fee: u64) -> Result<()> {
        require!(fee <= self.max_fee_per_message, BridgeError::SponsorCapExceeded);
        Ok(())
    }

    pub fn record_payment(&mut self, fee: u64) -> Result<()> {
        self.total_sponsored = self
            .total_sponsored
            .checked_add(fee)
            .ok_or(BridgeError::ArithmeticOverflow)?;
        Ok(())
    }
}
