use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::PacketSent;
use crate::protocol::outbound::{self, Dispatch};
use crate::protocol::{BridgeRequest, RelayParams};
use crate::state::{BridgeConfig, Channel, TokenConfig};
use crate::utils::{lamports, token};

pub fn update_text(
    ctx: Context<SendText>,
    _remote_chain_id: u16,
    text: String,
    params: RelayParams,
    native_fee: u64,
) -> Result<()> {
    let accounts = ctx.accounts;
    require!(accounts.config.system_enabled, BridgeError::SystemDisabled);

    let dispatch = outbound::prepare_dispatch(
        accounts.channel.trusted_remote,
        &BridgeRequest::Text { text },
        None,
        accounts.sender.key().to_bytes(),
        &accounts.channel.fee,
        &params,
        native_fee,
    )?;

    hand_off(
        &mut accounts.channel,
        &accounts.sender.to_account_info(),
        &accounts.fee_collector.to_account_info(),
        &accounts.system_program.to_account_info(),
        dispatch,
        &params,
    )
}

pub fn swap_token(
    ctx: Context<SwapToken>,
    _remote_chain_id: u16,
    amount: u64,
    recipient: Option<[u8; 32]>,
    params: RelayParams,
    native_fee: u64,
) -> Result<()> {
    let accounts = ctx.accounts;
    require!(accounts.config.system_enabled, BridgeError::SystemDisabled);

    let local_asset = accounts.mint.key();
    let remote_asset = resolve_remote_asset(
        accounts.token_config.as_deref(),
        &accounts.config.key(),
        accounts.channel.remote_chain_id,
        &local_asset,
    );

    // Fee and mapping are checked before anything moves
    let dispatch = outbound::prepare_dispatch(
        accounts.channel.trusted_remote,
        &BridgeRequest::SwapToken {
            local_asset,
            amount,
        },
        remote_asset,
        recipient.unwrap_or_else(|| accounts.sender.key().to_bytes()),
        &accounts.channel.fee,
        &params,
        native_fee,
    )?;

    token::escrow_to_vault(
        &accounts.sender_token_account.to_account_info(),
        &accounts.vault.to_account_info(),
        &accounts.sender.to_account_info(),
        amount,
        &accounts.token_program,
    )?;

    hand_off(
        &mut accounts.channel,
        &accounts.sender.to_account_info(),
        &accounts.fee_collector.to_account_info(),
        &accounts.system_program.to_account_info(),
        dispatch,
        &params,
    )
}

pub fn swap_nft(
    ctx: Context<SwapCollectible>,
    _remote_chain_id: u16,
    collection: Pubkey,
    asset_id: u64,
    recipient: Option<[u8; 32]>,
    params: RelayParams,
    native_fee: u64,
) -> Result<()> {
    swap_collectible(
        ctx.accounts,
        BridgeRequest::SwapNft {
            collection,
            asset_id,
        },
        1,
        recipient,
        params,
        native_fee,
    )
}

pub fn swap_ft(
    ctx: Context<SwapCollectible>,
    _remote_chain_id: u16,
    collection: Pubkey,
    asset_id: u64,
    amount: u64,
    recipient: Option<[u8; 32]>,
    params: RelayParams,
    native_fee: u64,
) -> Result<()> {
    swap_collectible(
        ctx.accounts,
        BridgeRequest::SwapFt {
            collection,
            asset_id,
            amount,
        },
        amount,
        recipient,
        params,
        native_fee,
    )
}

fn swap_collectible(
    accounts: &mut SwapCollectible,
    request: BridgeRequest,
    units: u64,
    recipient: Option<[u8; 32]>,
    params: RelayParams,
    native_fee: u64,
) -> Result<()> {
    require!(accounts.config.system_enabled, BridgeError::SystemDisabled);

    let collection = request.local_asset().ok_or(BridgeError::UnconfiguredAsset)?;
    let remote_asset = resolve_remote_asset(
        accounts.token_config.as_deref(),
        &accounts.config.key(),
        accounts.channel.remote_chain_id,
        &collection,
    );

    let dispatch = outbound::prepare_dispatch(
        accounts.channel.trusted_remote,
        &request,
        remote_asset,
        recipient.unwrap_or_else(|| accounts.sender.key().to_bytes()),
        &accounts.channel.fee,
        &params,
        native_fee,
    )?;

    token::escrow_to_vault(
        &accounts.sender_token_account.to_account_info(),
        &accounts.vault.to_account_info(),
        &accounts.sender.to_account_info(),
        units,
        &accounts.token_program,
    )?;

    hand_off(
        &mut accounts.channel,
        &accounts.sender.to_account_info(),
        &accounts.fee_collector.to_account_info(),
        &accounts.system_program.to_account_info(),
        dispatch,
        &params,
    )
}

/// Remote identity of `local_asset`, if the supplied entry belongs to `bridge`
/// and maps the asset on this channel.
pub fn resolve_remote_asset(
    token_config: Option<&TokenConfig>,
    bridge: &Pubkey,
    remote_chain_id: u16,
    local_asset: &Pubkey,
) -> Option<[u8; 32]> {
    token_config
        .filter(|entry| entry.maps(bridge, remote_chain_id, local_asset))
        .map(|entry| entry.remote_asset)
}

/// Pay the relay fee and publish the packet. Last step of every send.
fn hand_off<'info>(
    channel: &mut Account<'info, Channel>,
    payer: &AccountInfo<'info>,
    fee_collector: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    dispatch: Dispatch,
    params: &RelayParams,
) -> Result<()> {
    lamports::pay_native_fee(payer, fee_collector, system_program, dispatch.fee)?;
    publish(channel, payer.key(), dispatch, params)
}

/// Claim the outbound nonce and emit the packet for relayers.
pub(crate) fn publish(
    channel: &mut Account<Channel>,
    sender: Pubkey,
    dispatch: Dispatch,
    params: &RelayParams,
) -> Result<()> {
    let nonce = channel.next_outbound_nonce()?;

    emit!(PacketSent {
        dst_chain_id: channel.remote_chain_id,
        nonce,
        sender,
        payload: dispatch.payload,
        fee: dispatch.fee,
        gas_limit: params.gas_limit(&channel.fee),
    });

    msg!(
        "Packet sent: kind={:?}, dst_chain={}, nonce={}, fee={}",
        dispatch.packet.kind(),
        channel.remote_chain_id,
        nonce,
        dispatch.fee
    );
    Ok(())
}

#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct SendText<'info> {
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

    #[account(mut)]
    pub sender: Signer<'info>,

    /// CHECK: lamport destination only, pinned to the configured collector
    #[account(mut, address = config.fee_collector)]
    pub fee_collector: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(remote_chain_id: u16)]
pub struct SwapToken<'info> {
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

    /// Mapping for `mint` on this channel; omitted when unconfigured
    pub token_config: Option<Account<'info, TokenConfig>>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = sender
    )]
    pub sender_token_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = sender,
        associated_token::mint = mint,
        associated_token::authority = config
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub sender: Signer<'info>,

    /// CHECK: lamport destination only, pinned to the configured collector
    #[account(mut, address = config.fee_collector)]
    pub fee_collector: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Shared by NFT and semi-fungible swaps: one SPL mint per collection id
#[derive(Accounts)]
#[instruction(remote_chain_id: u16, collection: Pubkey, asset_id: u64)]
pub struct SwapCollectible<'info> {
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

    /// Mapping for `collection` on this channel; omitted when unconfigured
    pub token_config: Option<Account<'info, TokenConfig>>,

    #[account(
        seeds = [ASSET_MINT_SEED, config.key().as_ref(), collection.as_ref(), asset_id.to_be_bytes().as_ref()],
        bump
    )]
    pub asset_mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = asset_mint,
        token::authority = sender
    )]
    pub sender_token_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = sender,
        associated_token::mint = asset_mint,
        associated_token::authority = config
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub sender: Signer<'info>,

    /// CHECK: lamport destination only, pinned to the configured collector
    #[account(mut, address = config.fee_collector)]
    pub fee_collector: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(bridge: Pubkey, remote_chain_id: u16, local_asset: Pubkey) -> TokenConfig {
        TokenConfig {
            bridge,
            remote_chain_id,
            local_asset,
            remote_asset: [3u8; 32],
            mint_enabled: false,
            bump: 250,
        }
    }

    #[test]
    fn test_resolve_remote_asset() {
        let bridge = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let config = entry(bridge, 10002, mint);

        assert_eq!(resolve_remote_asset(Some(&config), &bridge, 10002, &mint), Some([3u8; 32]));
        assert_eq!(resolve_remote_asset(None, &bridge, 10002, &mint), None);
    }

    #[test]
    fn test_resolve_rejects_foreign_entry() {
        let bridge = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let config = entry(bridge, 10002, mint);

        // Entry for another channel or another asset does not count
        assert_eq!(resolve_remote_asset(Some(&config), &bridge, 10006, &mint), None);
        assert_eq!(resolve_remote_asset(Some(&config), &bridge, 10002, &Pubkey::new_unique()), None);
    }

    #[test]
    fn test_resolve_rejects_entry_of_another_bridge() {
        let mint = Pubkey::new_unique();
        let rogue = entry(Pubkey::new_unique(), 10002, mint);

        assert_eq!(resolve_remote_asset(Some(&rogue), &Pubkey::new_unique(), 10002, &mint), None);
    }
}
