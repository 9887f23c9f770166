use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token};
use crate::{
    constants::{ASSET_MINT_DECIMALS, ASSET_MINT_SEED, BRIDGE_SEED, TOKEN_CONFIG_SEED},
    errors::BridgeError,
    events::{AssetMintCreated, MintPermissionChanged, TokenConfigured},
    state::{BridgeConfig, TokenConfig},
};

/// Map a local asset to its identity on a remote chain
#[derive(Accounts)]
#[instruction(remote_chain_id: u16, local_asset: Pubkey)]
pub struct ConfigureToken<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + TokenConfig::SIZE,
        seeds = [
            TOKEN_CONFIG_SEED,
            config.key().as_ref(),
            &remote_chain_id.to_le_bytes(),
            local_asset.as_ref()
        ],
        bump
    )]
    pub token_config: Account<'info, TokenConfig>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Upsert; reconfiguring keeps the existing mint permission.
pub fn configure_token(
    ctx: Context<ConfigureToken>,
    remote_chain_id: u16,
    local_asset: Pubkey,
    remote_asset: [u8; 32],
) -> Result<()> {
    let token_config = &mut ctx.accounts.token_config;

    if token_config.local_asset == Pubkey::default() {
        // Fresh entry
        token_config.bridge = ctx.accounts.config.key();
        token_config.remote_chain_id = remote_chain_id;
        token_config.local_asset = local_asset;
        token_config.mint_enabled = false;
        token_config.bump = ctx.bumps.token_config;
    }
    token_config.remote_asset = remote_asset;

    emit!(TokenConfigured {
        remote_chain_id,
        local_asset,
        remote_asset,
    });

    msg!("Token {} mapped for chain {}", local_asset, remote_chain_id);
    Ok(())
}

/// Grant or revoke the bridge's right to mint a configured asset
#[derive(Accounts)]
#[instruction(remote_chain_id: u16, local_asset: Pubkey)]
pub struct SetMintPermission<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [
            TOKEN_CONFIG_SEED,
            config.key().as_ref(),
            &remote_chain_id.to_le_bytes(),
            local_asset.as_ref()
        ],
        bump = token_config.bump
    )]
    pub token_config: Account<'info, TokenConfig>,

    pub authority: Signer<'info>,
}

pub fn set_mint_permission(
    ctx: Context<SetMintPermission>,
    remote_chain_id: u16,
    local_asset: Pubkey,
    enabled: bool,
) -> Result<()> {
    ctx.accounts.token_config.mint_enabled = enabled;

    emit!(MintPermissionChanged {
        remote_chain_id,
        local_asset,
        enabled,
    });

    msg!(
        "Mint permission for {} on chain {} {}",
        local_asset,
        remote_chain_id,
        if enabled { "granted" } else { "revoked" }
    );
    Ok(())
}

/// Create the decimals-0 mint that represents one id of a collection
#[derive(Accounts)]
#[instruction(collection: Pubkey, asset_id: u64)]
pub struct CreateAssetMint<'info> {
    #[account(
        seeds = [BRIDGE_SEED, &config.chain_id.to_le_bytes()],
        bump = config.bump,
        has_one = authority @ BridgeError::UnauthorizedAuthority
    )]
    pub config: Account<'info, BridgeConfig>,

    #[account(
        init,
        payer = authority,
        seeds = [ASSET_MINT_SEED, config.key().as_ref(), collection.as_ref(), &asset_id.to_be_bytes()],
        bump,
        mint::decimals = ASSET_MINT_DECIMALS,
        mint::authority = config,
    )]
    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn create_asset_mint(ctx: Context<CreateAssetMint>, collection: Pubkey, asset_id: u64) -> Result<()> {
    let mint = ctx.accounts.asset_mint.key();

    emit!(AssetMintCreated {
        collection,
        asset_id,
        mint,
    });

    msg!("Asset mint {} created for {} id {}", mint, collection, asset_id);
    Ok(())
}

/// Address of the mint `bridge` uses for `asset_id` of `collection`.
pub fn asset_mint_address(bridge: &Pubkey, collection: &Pubkey, asset_id: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[ASSET_MINT_SEED, bridge.as_ref(), collection.as_ref(), &asset_id.to_be_bytes()],
        &crate::ID,
    )
    .0
}
