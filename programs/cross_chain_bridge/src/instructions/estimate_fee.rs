use anchor_lang::prelude::*;

use crate::constants::*;
use crate::instructions::send::resolve_remote_asset;
use crate::protocol::{outbound, BridgeRequest, RelayParams};
use crate::state::{BridgeConfig, Channel, TokenConfig};

/// Quote the relay fee for `request` without touching any state. Builds the
/// same payload the send instructions would, so the quote is exact.
pub fn handler(
    ctx: Context<EstimateFee>,
    _remote_chain_id: u16,
    request: BridgeRequest,
    recipient: Option<[u8; 32]>,
    params: RelayParams,
) -> Result<u64> {
    let channel = &ctx.accounts.channel;
    let remote_asset = request.local_asset().and_then(|local_asset| {
        resolve_remote_asset(
            ctx.accounts.token_config.as_deref(),
            &ctx.accounts.config.key(),
            channel.remote_chain_id,
            &local_asset,
        )
    });

    // Identities are fixed width, so the recipient value never changes the quote
    let dispatch = outbound::quote_request(
        &request,
        remote_asset,
        recipient.unwrap_or_default(),
        &channel.fee,
        &params,
    )?;

    msg!("Estimated fee {} for chain {}", dispatch.fee, channel.remote_chain_id);
    Ok(dispatch.fee)
}

#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct EstimateFee<'info> {
    #[account(
        seeds = [BRIDGE_SEED, config.chain_id.to_le_bytes().as_ref()],
        bump = config.bump
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        seeds = [CHANNEL_SEED, config.key().as_ref(), remote_chain_id.to_le_bytes().as_ref()],
        bump = channel.bump
    )]
    pub channel: Account<'info, Channel>,

    /// Mapping for the request's asset; omitted for text or when unconfigured
    pub token_config: Option<Account<'info, TokenConfig>>,
}
