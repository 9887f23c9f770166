//! Account-backed implementations of the inbound protocol seams, shared by
//! `receive_packet` and `retry_message`.
//!
//! A failed token CPI aborts the whole transaction, so a packet whose release
//! would fail could not be stored for retry. [`validate_release`] rejects
//! those releases before any CPI is issued.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::{FtReceived, MessageFailed, NftReceived, TextReceived, TokenReceived};
use crate::instructions::token_registry::asset_mint_address;
use crate::protocol::inbound::{plan_release, FailedRecord};
use crate::protocol::{AssetTransfer, Delivery, MessageKey, Packet, PacketKind, ReleaseHandler, ReleasePlan, RetryStore};
use crate::state::{BridgeConfig, FailedMessage, TokenConfig};
use crate::utils::hash::payload_hash;
use crate::utils::{pda, token};

type ProtocolResult<T> = std::result::Result<T, BridgeError>;

/// Token account fields the release checks read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub frozen: bool,
}

impl From<&TokenAccount> for TokenAccountState {
    fn from(account: &TokenAccount) -> Self {
        TokenAccountState {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
            frozen: account.is_frozen(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintState {
    pub address: Pubkey,
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
}

impl MintState {
    pub fn of(address: Pubkey, mint: &Mint) -> Self {
        let mint_authority = match mint.mint_authority {
            COption::Some(authority) => Some(authority),
            COption::None => None,
        };
        MintState {
            address,
            mint_authority,
            supply: mint.supply,
        }
    }
}

/// Decide how `transfer` is paid out, or why it cannot be.
///
/// Covers every condition under which the unlock or mint CPI would fail, so
/// a release that passes here does not abort the transaction.
pub fn validate_release(
    bridge: &Pubkey,
    src_chain_id: u16,
    token_config: &TokenConfig,
    mint: &MintState,
    vault: Option<&TokenAccountState>,
    recipient: &TokenAccountState,
    transfer: &AssetTransfer,
) -> ProtocolResult<ReleasePlan> {
    // Fungible packets name the mint itself, collectibles name the collection
    let local_asset = Pubkey::new_from_array(transfer.asset);
    let expected_mint = match transfer.kind {
        PacketKind::SwapToken => local_asset,
        _ => asset_mint_address(bridge, &local_asset, transfer.asset_id),
    };
    if mint.address != expected_mint {
        return Err(BridgeError::AssetMintMismatch);
    }
    if !token_config.maps(bridge, src_chain_id, &local_asset) {
        return Err(BridgeError::UnconfiguredAsset);
    }

    if recipient.mint != expected_mint {
        return Err(BridgeError::AssetMintMismatch);
    }
    if recipient.owner.to_bytes() != transfer.recipient {
        return Err(BridgeError::RecipientMismatch);
    }
    if recipient.frozen || recipient.amount.checked_add(transfer.amount).is_none() {
        return Err(BridgeError::AssetReleaseFailed);
    }

    let held = match vault {
        Some(vault) if vault.mint == expected_mint && vault.owner == *bridge && !vault.frozen => vault.amount,
        Some(_) => return Err(BridgeError::AssetMintMismatch),
        None => 0,
    };
    let can_mint = token_config.mint_enabled
        && mint.mint_authority == Some(*bridge)
        && mint.supply.checked_add(transfer.amount).is_some();

    plan_release(held, transfer.amount, can_mint)
}

/// Releases assets and updates text on behalf of an inbound packet.
pub struct AccountReleaser<'a, 'info> {
    pub config: &'a mut Account<'info, BridgeConfig>,
    pub src_chain_id: u16,
    pub token_config: Option<&'a Account<'info, TokenConfig>>,
    pub asset_mint: Option<&'a Account<'info, Mint>>,
    pub vault: Option<&'a Account<'info, TokenAccount>>,
    pub recipient_token_account: Option<&'a Account<'info, TokenAccount>>,
    pub token_program: Option<&'a Program<'info, Token>>,
}

impl<'info> ReleaseHandler for AccountReleaser<'_, 'info> {
    fn update_text(&mut self, text: &str) -> ProtocolResult<()> {
        self.config.message = text.to_string();
        Ok(())
    }

    fn release(&mut self, transfer: &AssetTransfer) -> ProtocolResult<()> {
        let (Some(token_config), Some(mint), Some(recipient), Some(token_program)) = (
            self.token_config,
            self.asset_mint,
            self.recipient_token_account,
            self.token_program,
        ) else {
            return Err(BridgeError::AssetAccountsMissing);
        };

        let bridge = self.config.key();
        let vault_state = self.vault.map(|vault| TokenAccountState::from(&**vault));
        let plan = validate_release(
            &bridge,
            self.src_chain_id,
            token_config,
            &MintState::of(mint.key(), mint),
            vault_state.as_ref(),
            &TokenAccountState::from(&**recipient),
            transfer,
        )?;

        let chain_id_seed = self.config.chain_id_seed();
        let bump = [self.config.bump];
        let seeds = self.config.signer_seeds(&chain_id_seed, &bump);
        let bridge_info = self.config.to_account_info();

        let released = match plan {
            ReleasePlan::Unlock => {
                let vault = self.vault.ok_or(BridgeError::AssetAccountsMissing)?;
                token::unlock_from_vault(
                    &vault.to_account_info(),
                    &recipient.to_account_info(),
                    &bridge_info,
                    transfer.amount,
                    &seeds,
                    token_program,
                )
            }
            ReleasePlan::Mint => token::mint_to_recipient(
                &mint.to_account_info(),
                &recipient.to_account_info(),
                &bridge_info,
                transfer.amount,
                &seeds,
                token_program,
            ),
        };
        released.map_err(|_| BridgeError::AssetReleaseFailed)?;

        msg!("Released {} unit(s) via {:?}", transfer.amount, plan);
        Ok(())
    }
}

/// Retry store for a first delivery: the record PDA does not exist yet and
/// is only created when the packet fails.
pub struct NewRecordStore<'a, 'info> {
    pub bridge: Pubkey,
    pub account: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub bump: u8,
    pub now: i64,
}

impl RetryStore for NewRecordStore<'_, '_> {
    fn stored_hash(&self, key: &MessageKey) -> Option<[u8; 32]> {
        read_record(self.account)
            .filter(|record| record.message_key() == *key)
            .map(|record| record.payload_hash)
    }

    fn remove(&mut self, _key: &MessageKey) -> ProtocolResult<()> {
        Err(BridgeError::NoStoredMessage)
    }

    fn save(&mut self, record: FailedRecord<'_>) -> ProtocolResult<()> {
        let key = record.key;
        let chain_id_seed = key.src_chain_id.to_le_bytes();
        let nonce_seed = key.nonce.to_le_bytes();
        let bump = [self.bump];
        let seeds: [&[u8]; 6] = [
            FAILED_MESSAGE_SEED,
            self.bridge.as_ref(),
            chain_id_seed.as_ref(),
            key.src_peer.as_ref(),
            nonce_seed.as_ref(),
            bump.as_ref(),
        ];

        pda::create_pda_account(
            self.account,
            self.payer,
            self.system_program,
            8 + FailedMessage::SIZE,
            &seeds,
        )
        .map_err(|_| BridgeError::RetryStoreUnavailable)?;

        let failed = FailedMessage {
            src_chain_id: key.src_chain_id,
            src_peer: key.src_peer,
            nonce: key.nonce,
            payload_hash: record.payload_hash,
            payload: record.payload.to_vec(),
            reason: record.reason.stored_code(),
            failed_at: self.now,
            payer: self.payer.key(),
            bump: self.bump,
        };
        write_record(self.account, &failed).map_err(|_| BridgeError::RetryStoreUnavailable)
    }
}

/// Retry store backed by an existing record, loaded up front and written
/// back by [`ExistingRecordStore::finish`].
pub struct ExistingRecordStore<'a, 'info> {
    account: &'a AccountInfo<'info>,
    record: Option<FailedMessage>,
    removed: bool,
    now: i64,
}

impl<'a, 'info> ExistingRecordStore<'a, 'info> {
    pub fn load(account: &'a AccountInfo<'info>, now: i64) -> Self {
        ExistingRecordStore {
            account,
            record: read_record(account),
            removed: false,
            now,
        }
    }

    /// Close the record if the retry consumed it, otherwise persist the
    /// rewritten record. Returns whether the record was closed.
    pub fn finish(self, rent_receiver: &AccountInfo<'info>) -> Result<bool> {
        let Some(record) = self.record else {
            return Ok(false);
        };

        if self.removed {
            require_keys_eq!(rent_receiver.key(), record.payer, BridgeError::RentReceiverMismatch);
            pda::close_program_account(self.account, rent_receiver)?;
            return Ok(true);
        }

        write_record(self.account, &record)?;
        Ok(false)
    }
}

impl RetryStore for ExistingRecordStore<'_, '_> {
    fn stored_hash(&self, key: &MessageKey) -> Option<[u8; 32]> {
        self.record
            .as_ref()
            .filter(|record| !self.removed && record.message_key() == *key)
            .map(|record| record.payload_hash)
    }

    fn remove(&mut self, key: &MessageKey) -> ProtocolResult<()> {
        if self.stored_hash(key).is_none() {
            return Err(BridgeError::NoStoredMessage);
        }
        self.removed = true;
        Ok(())
    }

    fn save(&mut self, failed: FailedRecord<'_>) -> ProtocolResult<()> {
        let record = self.record.as_mut().ok_or(BridgeError::RetryStoreUnavailable)?;
        if record.message_key() != failed.key {
            return Err(BridgeError::RetryStoreUnavailable);
        }

        // Same key, so the same PDA: overwrite in place as a fresh record
        record.payload_hash = failed.payload_hash;
        record.payload = failed.payload.to_vec();
        record.reason = failed.reason.stored_code();
        record.failed_at = self.now;
        self.removed = false;
        Ok(())
    }
}

fn write_record(account: &AccountInfo, record: &FailedMessage) -> Result<()> {
    let mut data = account.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    record.try_serialize(&mut writer)
}

fn read_record(account: &AccountInfo) -> Option<FailedMessage> {
    if account.owner != &crate::ID || account.data_is_empty() {
        return None;
    }
    let data = account.try_borrow_data().ok()?;
    FailedMessage::try_deserialize(&mut &data[..]).ok()
}

/// Emit the settlement or failure event for a finished delivery.
pub fn report_delivery(key: &MessageKey, payload: &[u8], delivery: &Delivery) {
    match delivery {
        Delivery::Settled(packet) => report_settled(key, packet),
        Delivery::Stored { reason } => {
            emit!(MessageFailed {
                src_chain_id: key.src_chain_id,
                src_peer: key.src_peer,
                nonce: key.nonce,
                payload_hash: payload_hash(payload),
                reason: reason.stored_code(),
            });
            msg!(
                "Packet from chain {} nonce {} stored for retry: {}",
                key.src_chain_id,
                key.nonce,
                reason
            );
        }
    }
}

fn report_settled(key: &MessageKey, packet: &Packet) {
    let src_chain_id = key.src_chain_id;
    let nonce = key.nonce;

    match packet {
        Packet::Text { text } => emit!(TextReceived {
            src_chain_id,
            nonce,
            text: text.clone(),
        }),
        Packet::SwapToken {
            remote_asset,
            recipient,
            amount,
        } => emit!(TokenReceived {
            src_chain_id,
            nonce,
            mint: Pubkey::new_from_array(*remote_asset),
            recipient: Pubkey::new_from_array(*recipient),
            amount: *amount,
        }),
        Packet::SwapNft {
            remote_asset,
            recipient,
            asset_id,
        } => emit!(NftReceived {
            src_chain_id,
            nonce,
            collection: Pubkey::new_from_array(*remote_asset),
            recipient: Pubkey::new_from_array(*recipient),
            asset_id: *asset_id,
        }),
        Packet::SwapFt {
            remote_asset,
            recipient,
            asset_id,
            amount,
        } => emit!(FtReceived {
            src_chain_id,
            nonce,
            collection: Pubkey::new_from_array(*remote_asset),
            recipient: Pubkey::new_from_array(*recipient),
            asset_id: *asset_id,
            amount: *amount,
        }),
    }

    msg!(
        "Packet from chain {} nonce {} settled: {:?}",
        src_chain_id,
        nonce,
        packet.kind()
    );
}
