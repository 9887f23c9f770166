use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::MessageRetried;
use crate::instructions::delivery::{report_delivery, AccountReleaser, ExistingRecordStore};
use crate::protocol::{inbound, MessageKey};
use crate::state::{BridgeConfig, TokenConfig};

/// Re-run a stored packet. Open to any caller. Success closes the record and
/// refunds its rent to whoever paid for it; another failure rewrites it.
pub fn handler(
    ctx: Context<RetryMessage>,
    src_chain_id: u16,
    src_peer: [u8; 32],
    nonce: u64,
    payload: Vec<u8>,
) -> Result<()> {
    let accounts = ctx.accounts;
    require!(accounts.config.system_enabled, BridgeError::SystemDisabled);

    let key = MessageKey {
        src_chain_id,
        src_peer,
        nonce,
    };

    let failed_message = accounts.failed_message.to_account_info();
    let mut store = ExistingRecordStore::load(&failed_message, Clock::get()?.unix_timestamp);
    let mut releaser = AccountReleaser {
        config: &mut accounts.config,
        src_chain_id,
        token_config: accounts.token_config.as_ref(),
        asset_mint: accounts.asset_mint.as_ref(),
        vault: accounts.vault.as_ref(),
        recipient_token_account: accounts.recipient_token_account.as_ref(),
        token_program: accounts.token_program.as_ref(),
    };

    let delivery = inbound::retry(&key, &payload, &mut store, &mut releaser)?;
    let closed = store.finish(&accounts.rent_receiver.to_account_info())?;

    emit!(MessageRetried {
        src_chain_id,
        src_peer,
        nonce,
        caller: accounts.caller.key(),
    });
    report_delivery(&key, &payload, &delivery);

    if closed {
        msg!("Retry record closed for chain {} nonce {}", src_chain_id, nonce);
    }
    Ok(())
}

#[derive(Accounts)]
#[instruction(src_chain_id: u16, src_peer: [u8; 32], nonce: u64)]
pub struct RetryMessage<'info> {
    #[account(
        mut,
        seeds = [BRIDGE_SEED, config.chain_id.to_le_bytes().as_ref()],
        bump = config.bump
    )]
    pub config: Account<'info, BridgeConfig>,

    /// CHECK: retry record for this key; a missing record is reported as
    /// `NoStoredMessage` rather than rejected during account validation
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

    pub caller: Signer<'info>,

    /// CHECK: must be the record's payer; checked before the rent is refunded
    #[account(mut)]
    pub rent_receiver: UncheckedAccount<'info>,

    pub token_config: Option<Account<'info, TokenConfig>>,

    #[account(mut)]
    pub asset_mint: Option<Account<'info, Mint>>,

    #[account(mut)]
    pub vault: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub recipient_token_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Option<Program<'info, Token>>,
}
