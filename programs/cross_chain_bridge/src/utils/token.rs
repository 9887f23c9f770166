//! SPL token CPIs for escrow and release.
//!
//! The bridge config PDA owns the vault token accounts and is the mint
//! authority for every asset the bridge may mint.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, MintTo, Token, Transfer};

use crate::errors::BridgeError;

/// Move `amount` from the sender's token account into the bridge vault.
pub fn escrow_to_vault<'info>(
    from: &AccountInfo<'info>,
    vault: &AccountInfo<'info>,
    owner: &AccountInfo<'info>,
    amount: u64,
    token_program: &Program<'info, Token>,
) -> Result<()> {
    token::transfer(
        CpiContext::new(
            token_program.to_account_info(),
            Transfer {
                from: from.clone(),
                to: vault.clone(),
                authority: owner.clone(),
            },
        ),
        amount,
    )
    .map_err(|_| error!(BridgeError::AssetEscrowFailed))
}

/// Release previously escrowed units from the vault, signed by the bridge PDA.
pub fn unlock_from_vault<'info>(
    vault: &AccountInfo<'info>,
    recipient: &AccountInfo<'info>,
    bridge: &AccountInfo<'info>,
    amount: u64,
    bridge_seeds: &[&[u8]],
    token_program: &Program<'info, Token>,
) -> Result<()> {
    let signer_seeds: &[&[&[u8]]] = &[bridge_seeds];

    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            Transfer {
                from: vault.clone(),
                to: recipient.clone(),
                authority: bridge.clone(),
            },
            signer_seeds,
        ),
        amount,
    )
    .map_err(|_| error!(BridgeError::AssetReleaseFailed))
}

/// Mint fresh units to the recipient, signed by the bridge PDA.
pub fn mint_to_recipient<'info>(
    mint: &AccountInfo<'info>,
    recipient: &AccountInfo<'info>,
    bridge: &AccountInfo<'info>,
    amount: u64,
    bridge_seeds: &[&[u8]],
    token_program: &Program<'info, Token>,
) -> Result<()> {
    let signer_seeds: &[&[&[u8]]] = &[bridge_seeds];

    token::mint_to(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            MintTo {
                mint: mint.clone(),
                to: recipient.clone(),
                authority: bridge.clone(),
            },
            signer_seeds,
        ),
        amount,
    )
    .map_err(|_| error!(BridgeError::AssetReleaseFailed))
}
