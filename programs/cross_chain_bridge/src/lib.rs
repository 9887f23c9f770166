use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod protocol;
pub mod state;
pub mod utils;

use instructions::*;
use protocol::{BridgeRequest, FeeSchedule, RelayParams};

declare_id!("4hjwz5e8jYyj13wqRsUbvJYyCrsjt3EwSDRmppLJkjYL");

/// Cross-Chain Bridge Program
///
/// Moves text updates, fungible tokens, NFTs and semi-fungible tokens to
/// trusted peer contracts on other chains. Inbound packets that fail after
/// authentication are stored and can be retried exactly once.
#[program]
pub mod cross_chain_bridge {
    use super::*;

    /// Initialize the bridge for a specific chain
    pub fn initialize_bridge(
        ctx: Context<InitializeBridge>,
        chain_id: u16,
        endpoint: Pubkey,
        fee_collector: Pubkey,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, chain_id, endpoint, fee_collector)
    }

    /// Update system enabled status (admin only)
    pub fn set_system_enabled(ctx: Context<UpdateBridgeConfig>, enabled: bool) -> Result<()> {
        instructions::admin::set_system_enabled(ctx, enabled)
    }

    /// Rotate the transport endpoint and fee collector (admin only)
    pub fn set_transport(
        ctx: Context<UpdateBridgeConfig>,
        endpoint: Pubkey,
        fee_collector: Pubkey,
    ) -> Result<()> {
        instructions::admin::set_transport(ctx, endpoint, fee_collector)
    }

    /// Open a channel to a remote chain
    pub fn open_channel(
        ctx: Context<OpenChannel>,
        remote_chain_id: u16,
        fee_schedule: FeeSchedule,
    ) -> Result<()> {
        instructions::channel_registry::open_channel(ctx, remote_chain_id, fee_schedule)
    }

    /// Set the only peer a channel accepts packets from
    pub fn set_trusted_remote(
        ctx: Context<ConfigureChannel>,
        remote_chain_id: u16,
        peer: [u8; 32],
    ) -> Result<()> {
        instructions::channel_registry::set_trusted_remote(ctx, remote_chain_id, peer)
    }

    /// Update relay pricing for a channel
    pub fn set_fee_schedule(
        ctx: Context<ConfigureChannel>,
        remote_chain_id: u16,
        fee_schedule: FeeSchedule,
    ) -> Result<()> {
        instructions::channel_registry::set_fee_schedule(ctx, remote_chain_id, fee_schedule)
    }

    /// Read the trusted remote for a channel
    pub fn get_trusted_remote(
        ctx: Context<ReadChannel>,
        remote_chain_id: u16,
    ) -> Result<Option<[u8; 32]>> {
        instructions::channel_registry::get_trusted_remote(ctx, remote_chain_id)
    }

    /// Map a local asset to its remote counterpart
    pub fn configure_token(
        ctx: Context<ConfigureToken>,
        remote_chain_id: u16,
        local_asset: Pubkey,
        remote_asset: [u8; 32],
    ) -> Result<()> {
        instructions::token_registry::configure_token(ctx, remote_chain_id, local_asset, remote_asset)
    }

    /// Grant or revoke mint permission for a configured asset
    pub fn set_mint_permission(
        ctx: Context<SetMintPermission>,
        remote_chain_id: u16,
        local_asset: Pubkey,
        enabled: bool,
    ) -> Result<()> {
        instructions::token_registry::set_mint_permission(ctx, remote_chain_id, local_asset, enabled)
    }

    /// Create the mint representing one id of a collection
    pub fn create_asset_mint(
        ctx: Context<CreateAssetMint>,
        collection: Pubkey,
        asset_id: u64,
    ) -> Result<()> {
        instructions::token_registry::create_asset_mint(ctx, collection, asset_id)
    }

    /// Quote the relay fee for a request
    pub fn estimate_fee(
        ctx: Context<EstimateFee>,
        remote_chain_id: u16,
        request: BridgeRequest,
        recipient: Option<[u8; 32]>,
        params: RelayParams,
    ) -> Result<u64> {
        instructions::estimate_fee::handler(ctx, remote_chain_id, request, recipient, params)
    }

    /// Send a text update
    pub fn update_text(
        ctx: Context<SendText>,
        remote_chain_id: u16,
        text: String,
        params: RelayParams,
        native_fee: u64,
    ) -> Result<()> {
        instructions::send::update_text(ctx, remote_chain_id, text, params, native_fee)
    }

    /// Escrow fungible tokens and send them to a remote chain
    pub fn swap_token(
        ctx: Context<SwapToken>,
        remote_chain_id: u16,
        amount: u64,
        recipient: Option<[u8; 32]>,
        params: RelayParams,
        native_fee: u64,
    ) -> Result<()> {
        instructions::send::swap_token(ctx, remote_chain_id, amount, recipient, params, native_fee)
    }

    /// Escrow an NFT and send it to a remote chain
    pub fn swap_nft(
        ctx: Context<SwapCollectible>,
        remote_chain_id: u16,
        collection: Pubkey,
        asset_id: u64,
        recipient: Option<[u8; 32]>,
        params: RelayParams,
        native_fee: u64,
    ) -> Result<()> {
        instructions::send::swap_nft(
            ctx,
            remote_chain_id,
            collection,
            asset_id,
            recipient,
            params,
            native_fee,
        )
    }

    /// Escrow semi-fungible units and send them to a remote chain
    pub fn swap_ft(
        ctx: Context<SwapCollectible>,
        remote_chain_id: u16,
        collection: Pubkey,
        asset_id: u64,
        amount: u64,
        recipient: Option<[u8; 32]>,
        params: RelayParams,
        native_fee: u64,
    ) -> Result<()> {
        instructions::send::swap_ft(
            ctx,
            remote_chain_id,
            collection,
            asset_id,
            amount,
            recipient,
            params,
            native_fee,
        )
    }

    /// Deliver an inbound packet (endpoint only)
    pub fn receive_packet(
        ctx: Context<ReceivePacket>,
        src_chain_id: u16,
        src_peer: [u8; 32],
        nonce: u64,
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::receive_packet::handler(ctx, src_chain_id, src_peer, nonce, payload)
    }

    /// Retry a stored inbound packet
    pub fn retry_message(
        ctx: Context<RetryMessage>,
        src_chain_id: u16,
        src_peer: [u8; 32],
        nonce: u64,
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::retry_message::handler(ctx, src_chain_id, src_peer, nonce, payload)
    }

    /// Create or reconfigure the fee sponsor
    pub fn configure_sponsor(ctx: Context<ConfigureSponsor>, max_fee_per_message: u64) -> Result<()> {
        instructions::sponsor::configure_sponsor(ctx, max_fee_per_message)
    }

    /// Add lamports to the fee sponsor
    pub fn fund_sponsor(ctx: Context<FundSponsor>, amount: u64) -> Result<()> {
        instructions::sponsor::fund_sponsor(ctx, amount)
    }

    /// Send a text update with the relay fee paid by the sponsor
    pub fn sponsored_update_text(
        ctx: Context<SponsoredText>,
        remote_chain_id: u16,
        text: String,
        params: RelayParams,
    ) -> Result<()> {
        instructions::sponsor::sponsored_update_text(ctx, remote_chain_id, text, params)
    }
}
