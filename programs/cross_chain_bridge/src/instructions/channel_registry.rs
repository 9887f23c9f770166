use anchor_lang::prelude::*;
use crate::{
    constants::{BRIDGE_SEED, CHANNEL_SEED},
    errors::BridgeError,
    events::{ChannelOpened, FeeScheduleUpdated, TrustedRemoteSet},
    protocol::FeeSchedule,
    state::{BridgeConfig, Channel},
};

/// Open a channel to a remote chain. The trusted remote starts unset, so the
/// channel neither sends nor accepts packets until it is configured.
#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct OpenChannel<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        init,
        payer = authority,
        space = 8 + Channel::SIZE,
        seeds = [CHANNEL_SEED, config.key().as_ref(), &remote_chain_id.to_le_bytes()],
        bump
    )]
    pub channel: Account<'info, Channel>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn open_channel(
    ctx: Context<OpenChannel>,
    remote_chain_id: u16,
    fee_schedule: FeeSchedule,
) -> Result<()> {
    let channel = &mut ctx.accounts.channel;
    channel.remote_chain_id = remote_chain_id;
    channel.trusted_remote = None;
    channel.outbound_nonce = 0;
    channel.inbound_nonce = 0;
    channel.fee = fee_schedule;
    channel.bump = ctx.bumps.channel;

    emit!(ChannelOpened { remote_chain_id });

    msg!("Opened channel to chain {}", remote_chain_id);
    Ok(())
}

/// Privileged access to an existing channel
#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct ConfigureChannel<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHANNEL_SEED, config.key().as_ref(), &remote_chain_id.to_le_bytes()],
        bump = channel.bump
    )]
    pub channel: Account<'info, Channel>,

    pub authority: Signer<'info>,
}

/// Replace the trusted remote. Any previous peer is forgotten.
pub fn set_trusted_remote(
    ctx: Context<ConfigureChannel>,
    remote_chain_id: u16,
    peer: [u8; 32],
) -> Result<()> {
    let channel = &mut ctx.accounts.channel;

    if let Some(previous) = channel.trusted_remote {
        msg!("Replacing trusted remote {:?} on chain {}", previous, remote_chain_id);
    }
    channel.trusted_remote = Some(peer);

    emit!(TrustedRemoteSet {
        remote_chain_id,
        peer,
    });

    msg!("Trusted remote set for chain {}", remote_chain_id);
    Ok(())
}

pub fn set_fee_schedule(
    ctx: Context<ConfigureChannel>,
    remote_chain_id: u16,
    fee_schedule: FeeSchedule,
) -> Result<()> {
    ctx.accounts.channel.fee = fee_schedule;

    emit!(FeeScheduleUpdated {
        remote_chain_id,
        base_fee: fee_schedule.base_fee,
        fee_per_byte: fee_schedule.fee_per_byte,
        gas_price: fee_schedule.gas_price,
        default_gas_limit: fee_schedule.default_gas_limit,
    });

    msg!("Fee schedule updated for chain {}", remote_chain_id);
    Ok(())
}

/// Read-only channel lookup
#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct ReadChannel<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        seeds = [CHANNEL_SEED, config.key().as_ref(), &remote_chain_id.to_le_bytes()],
        bump = channel.bump
    )]
    pub channel: Account<'info, Channel>,
}

pub fn get_trusted_remote(ctx: Context<ReadChannel>, _remote_chain_id: u16) -> Result<Option<[u8; 32]>> {
    Ok(ctx.accounts.channel.trusted_remote)
}
