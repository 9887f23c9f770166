use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::{SystemStatusChanged, TransportUpdated};
use crate::state::BridgeConfig;

pub fn set_system_enabled(ctx: Context<UpdateBridgeConfig>, enabled: bool) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.system_enabled = enabled;

    emit!(SystemStatusChanged { enabled });

    msg!("System {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

/// Rotate the transport endpoint and fee collector
pub fn set_transport(ctx: Context<UpdateBridgeConfig>, endpoint: Pubkey, fee_collector: Pubkey) -> Result<()> {
    let event = rotate_transport(&mut ctx.accounts.config, endpoint, fee_collector);
    emit!(event);

    msg!("Transport set: endpoint={}, fee_collector={}", endpoint, fee_collector);
    Ok(())
}

fn rotate_transport(config: &mut BridgeConfig, endpoint: Pubkey, fee_collector: Pubkey) -> TransportUpdated {
    config.endpoint = endpoint;
    config.fee_collector = fee_collector;
    TransportUpdated {
        endpoint,
        fee_collector,
    }
}

#[derive(Accounts)]
pub struct UpdateBridgeConfig<'info> {
    #[account(
        mut,
        seeds = [BRIDGE_SEED, config.chain_id.to_le_bytes().as_ref()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    pub authority: Signer<'info>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_transport_reports_new_accounts() {
        let mut config = BridgeConfig {
            authority: Pubkey::new_unique(),
            endpoint: Pubkey::new_unique(),
            fee_collector: Pubkey::new_unique(),
            chain_id: 10002,
            system_enabled: true,
            message: String::new(),
            bump: 255,
        };
        let endpoint = Pubkey::new_unique();
        let fee_collector = Pubkey::new_unique();

        let event = rotate_transport(&mut config, endpoint, fee_collector);

        assert_eq!(config.endpoint, endpoint);
        assert_eq!(config.fee_collector, fee_collector);
        assert_eq!(event.endpoint, endpoint);
        assert_eq!(event.fee_collector, fee_collector);
    }
}
