use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::BridgeError;
use crate::instructions::delivery::{report_delivery, AccountReleaser, NewRecordStore};
use crate::protocol::{inbound, MessageKey};
use crate::state::{BridgeConfig, Channel, TokenConfig};

/// Deliver one packet from the transport. Authentication, replay and size
/// failures revert; anything later is stored under a `FailedMessage` PDA
/// and the call still succeeds.
pub fn handler(
    ctx: Context<ReceivePacket>,
    src_chain_id: u16,
    src_peer: [u8; 32],
    nonce: u64,
    payload: Vec<u8>,
) -> Result<()> {
    let accounts = ctx.accounts;

    // Paused bridges reject so the transport delivers again later
    require!(accounts.config.system_enabled, BridgeError::SystemDisabled);

    let key = MessageKey {
        src_chain_id,
        src_peer,
        nonce,
    };

    let failed_message = accounts.failed_message.to_account_info();
    let endpoint = accounts.endpoint.to_account_info();
    let system_program = accounts.system_program.to_account_info();
    let mut store = NewRecordStore {
        bridge: accounts.config.key(),
        account: &failed_message,
        payer: &endpoint,
        system_program: &system_program,
        bump: ctx.bumps.failed_message,
        now: Clock::get()?.unix_timestamp,
    };
    let mut releaser = AccountReleaser {
        config: &mut accounts.config,
        src_chain_id,
        token_config: accounts.token_config.as_ref(),
        asset_mint: accounts.asset_mint.as_ref(),
        vault: accounts.vault.as_ref(),
        recipient_token_account: accounts.recipient_token_account.as_ref(),
        token_program: accounts.token_program.as_ref(),
    };

    let channel = &mut accounts.channel;
    let mut inbound_nonce = channel.inbound_nonce;
    let delivery = inbound::receive(
        channel.trusted_remote,
        &mut inbound_nonce,
        &key,
        &payload,
        &mut store,
        &mut releaser,
    )?;
    channel.inbound_nonce = inbound_nonce;

    report_delivery(&key, &payload, &delivery);
    Ok(())
}

#[derive(Accounts)]
#[instruction(src_chain_id: u16, src_peer: [u8; 32], nonce: u64)]
pub struct ReceivePacket<'info> {
    #[account(
        mut,
        seeds = [BRIDGE_SEED, config.chain_id.to_le_bytes().as_ref()],
        bump = config.bump,
        has_one = endpoint @ BridgeError::UnauthorizedEndpoint
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHANNEL_SEED, config.key().as_ref(), src_chain_id.to_le_bytes().as_ref()],
        bump = channel.bump
    )]
    pub channel: Account<'info, Channel>,

    /// CHECK: address of the retry record for this key; only created if the
    /// packet fails
    #[account(
        mut,
        seeds = [
            FAILED_MESSAGE_SEED,
            config.key().as_ref(),
            src_chain_id.to_le_bytes().as_ref(),
            src_peer.as_ref(),
            nonce.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub failed_message: UncheckedAccount<'info>,

    /// Transport authority; pays rent for retry records
    #[account(mut)]
    pub endpoint: Signer<'info>,

    // Release accounts. Omitting or mismatching them stores the packet
    // instead of reverting, so a relayer cannot block the channel.
    pub token_config: Option<Account<'info, TokenConfig>>,

    #[account(mut)]
    pub asset_mint: Option<Account<'info, Mint>>,

    #[account(mut)]
    pub vault: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub recipient_token_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Option<Program<'info, Token>>,

    pub system_program: Program<'info, System>,
}
