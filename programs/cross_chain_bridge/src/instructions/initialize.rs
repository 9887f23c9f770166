use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::BridgeInitialized;
use crate::state::BridgeConfig;

pub fn handler(
    ctx: Context<InitializeBridge>,
    chain_id: u16,
    endpoint: Pubkey,
    fee_collector: Pubkey,
) -> Result<()> {
    let config = &mut ctx.accounts.config;

    // Set bridge configuration
    config.authority = ctx.accounts.authority.key();
    config.endpoint = endpoint;
    config.fee_collector = fee_collector;
    config.chain_id = chain_id;
    config.system_enabled = true;
    config.message = String::new();
    config.bump = ctx.bumps.config;

    emit!(BridgeInitialized {
        chain_id,
        authority: config.authority,
        endpoint,
    });

    msg!("Bridge initialized for chain: {}", chain_id);
    Ok(())
}

#[derive(Accounts)]
#[instruction(chain_id: u16)]
pub struct InitializeBridge<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + BridgeConfig::SIZE,
        seeds = [BRIDGE_SEED, chain_id.to_le_bytes().as_ref()],
        bump
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}
