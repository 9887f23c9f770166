use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};
use crate::{
    constants::{BRIDGE_SEED, CHANNEL_SEED, SPONSOR_SEED},
    errors::BridgeError,
    events::{SponsorConfigured, SponsorFunded},
    instructions::send::publish,
    protocol::{outbound, BridgeRequest, RelayParams},
    state::{BridgeConfig, Channel, FeeSponsor},
    utils::lamports,
};

/// Create or reconfigure the fee sponsor
#[derive(Accounts)]
pub struct ConfigureSponsor<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + FeeSponsor::SIZE,
        seeds = [SPONSOR_SEED, config.key().as_ref()],
        bump
    )]
    pub sponsor: Account<'info, FeeSponsor>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn configure_sponsor(ctx: Context<ConfigureSponsor>, max_fee_per_message: u64) -> Result<()> {
    let sponsor = &mut ctx.accounts.sponsor;
    sponsor.authority = ctx.accounts.authority.key();
    sponsor.max_fee_per_message = max_fee_per_message;
    sponsor.bump = ctx.bumps.sponsor;

    emit!(SponsorConfigured {
        authority: sponsor.authority,
        max_fee_per_message,
    });

    msg!("Sponsor cap set to {} lamports per message", max_fee_per_message);
    Ok(())
}

/// Top up the sponsor pool. Open to anyone.
#[derive(Accounts)]
pub struct FundSponsor<'info> {
    #[account(
        seeds = [BRIDGE_SEED, config.chain_id.to_le_bytes().as_ref()],
        bump = config.bump
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [SPONSOR_SEED, config.key().as_ref()],
        bump = sponsor.bump
    )]
    pub sponsor: Account<'info, FeeSponsor>,

    #[account(mut)]
    pub funder: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn fund_sponsor(ctx: Context<FundSponsor>, amount: u64) -> Result<()> {
    require!(amount > 0, BridgeError::InvalidAmount);

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder.to_account_info(),
                to: ctx.accounts.sponsor.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(SponsorFunded {
        funder: ctx.accounts.funder.key(),
        amount,
    });

    msg!("Sponsor funded with {} lamports", amount);
    Ok(())
}

/// Text update whose relay fee is paid from the sponsor pool
#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct SponsoredText<'info> {
    #[account(
        seeds = [BRIDGE_SEED, config.chain_id.to_le_bytes().as_ref()],
        bump = config.bump
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHANNEL_SEED, config.key().as_ref(), remote_chain_id.to_le_bytes().as_ref()],
        bump = channel.bump
    )]
    pub channel: Account<'info, Channel>,

    #[account(
        mut,
        seeds = [SPONSOR_SEED, config.key().as_ref()],
        bump = sponsor.bump
    )]
    pub sponsor: Account<'info, FeeSponsor>,

    pub sender: Signer<'info>,

    /// CHECK: lamport destination only, pinned to the configured collector
    #[account(mut, address = config.fee_collector)]
    pub fee_collector: UncheckedAccount<'info>,
}

pub fn sponsored_update_text(
    ctx: Context<SponsoredText>,
    _remote_chain_id: u16,
    text: String,
    params: RelayParams,
) -> Result<()> {
    let accounts = ctx.accounts;
    require!(accounts.config.system_enabled, BridgeError::SystemDisabled);

    require!(
        accounts.channel.trusted_remote.is_some(),
        BridgeError::UntrustedChannel
    );

    // The sponsor pays exactly the quote
    let dispatch = outbound::quote_request(
        &BridgeRequest::Text { text },
        None,
        accounts.sender.key().to_bytes(),
        &accounts.channel.fee,
        &params,
    )?;
    accounts.sponsor.check_cap(dispatch.fee)?;

    let reserve = Rent::get()?.minimum_balance(8 + FeeSponsor::SIZE);
    lamports::transfer_from_program_account(
        &accounts.sponsor.to_account_info(),
        &accounts.fee_collector.to_account_info(),
        dispatch.fee,
        reserve,
    )?;
    accounts.sponsor.record_payment(dispatch.fee)?;

    msg!("Sponsor paid {} lamports for {}", dispatch.fee, accounts.sender.key());
    publish(&mut accounts.channel, accounts.sender.key(), dispatch, &params)
}
