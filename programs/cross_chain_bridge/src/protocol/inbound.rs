//! Inbound delivery and retry.
//!
//! A delivery moves through `authenticate -> decode -> dispatch` and ends
//! either settled or stored. Authentication, replay and size failures abort
//! the call. Anything that goes wrong after authentication is captured into
//! the [`RetryStore`] so later sequence numbers on the channel keep flowing.

use crate::constants::{MAX_PAYLOAD_SIZE, MAX_TEXT_LEN};
use crate::errors::BridgeError;
use crate::protocol::packet::{Identity, Packet, PacketKind};
use crate::utils::hash::{matches_stored_hash, payload_hash};

type ProtocolResult<T> = std::result::Result<T, BridgeError>;

/// Retry store key: (channel, source peer, sequence number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub src_chain_id: u16,
    pub src_peer: Identity,
    pub nonce: u64,
}

/// Asset movement requested by a decoded swap packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetTransfer {
    pub kind: PacketKind,
    /// Asset identity on this chain (the packet's remote asset)
    pub asset: Identity,
    pub recipient: Identity,
    /// Zero for fungible tokens
    pub asset_id: u64,
    /// Units to release; always 1 for NFTs
    pub amount: u64,
}

impl AssetTransfer {
    pub fn from_packet(packet: &Packet) -> Option<Self> {
        let kind = packet.kind();
        match *packet {
            Packet::Text { .. } => None,
            Packet::SwapToken {
                remote_asset,
                recipient,
                amount,
            } => Some(AssetTransfer {
                kind,
                asset: remote_asset,
                recipient,
                asset_id: 0,
                amount,
            }),
            Packet::SwapNft {
                remote_asset,
                recipient,
                asset_id,
            } => Some(AssetTransfer {
                kind,
                asset: remote_asset,
                recipient,
                asset_id,
                amount: 1,
            }),
            Packet::SwapFt {
                remote_asset,
                recipient,
                asset_id,
                amount,
            } => Some(AssetTransfer {
                kind,
                asset: remote_asset,
                recipient,
                asset_id,
                amount,
            }),
        }
    }
}

/// Destination-side effects of a settled packet. Implementations must leave
/// no partial effect behind when they return an error.
pub trait ReleaseHandler {
    fn update_text(&mut self, text: &str) -> ProtocolResult<()>;

    fn release(&mut self, transfer: &AssetTransfer) -> ProtocolResult<()>;
}

/// A failed delivery as persisted for retry.
#[derive(Clone, Debug)]
pub struct FailedRecord<'a> {
    pub key: MessageKey,
    pub payload: &'a [u8],
    pub payload_hash: [u8; 32],
    pub reason: BridgeError,
}

pub trait RetryStore {
    fn stored_hash(&self, key: &MessageKey) -> Option<[u8; 32]>;

    fn remove(&mut self, key: &MessageKey) -> ProtocolResult<()>;

    fn save(&mut self, record: FailedRecord<'_>) -> ProtocolResult<()>;
}

#[derive(Clone, Debug)]
pub enum Delivery {
    Settled(Packet),
    Stored { reason: BridgeError },
}

impl Delivery {
    pub fn is_settled(&self) -> bool {
        matches!(self, Delivery::Settled(_))
    }
}

pub fn authenticate(trusted_remote: Option<Identity>, src_peer: &Identity) -> ProtocolResult<()> {
    match trusted_remote {
        Some(trusted) if trusted == *src_peer => Ok(()),
        _ => Err(BridgeError::Unauthenticated),
    }
}

/// Handle one transport delivery. `inbound_nonce` is the last sequence
/// number accepted on the channel. Deliveries are accepted strictly in
/// order, and the counter advances whether the packet settles or is stored,
/// so every sequence number ends up either settled or in the store.
pub fn receive<S: RetryStore, H: ReleaseHandler>(
    trusted_remote: Option<Identity>,
    inbound_nonce: &mut u64,
    key: &MessageKey,
    payload: &[u8],
    store: &mut S,
    handler: &mut H,
) -> ProtocolResult<Delivery> {
    authenticate(trusted_remote, &key.src_peer)?;
    if key.nonce <= *inbound_nonce {
        return Err(BridgeError::NonceAlreadyProcessed);
    }
    let expected = inbound_nonce.checked_add(1).ok_or(BridgeError::ArithmeticOverflow)?;
    if key.nonce != expected {
        return Err(BridgeError::NonceOutOfOrder);
    }
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(BridgeError::PayloadTooLarge);
    }

    *inbound_nonce = key.nonce;
    dispatch(key, payload, store, handler)
}

/// Re-run a stored delivery. The record is consumed before dispatch, so a
/// second failure leaves exactly one fresh record and a success leaves none.
pub fn retry<S: RetryStore, H: ReleaseHandler>(
    key: &MessageKey,
    payload: &[u8],
    store: &mut S,
    handler: &mut H,
) -> ProtocolResult<Delivery> {
    let stored = store.stored_hash(key).ok_or(BridgeError::NoStoredMessage)?;
    if !matches_stored_hash(&stored, payload) {
        return Err(BridgeError::PayloadMismatch);
    }

    store.remove(key)?;
    dispatch(key, payload, store, handler)
}

fn dispatch<S: RetryStore, H: ReleaseHandler>(
    key: &MessageKey,
    payload: &[u8],
    store: &mut S,
    handler: &mut H,
) -> ProtocolResult<Delivery> {
    match settle(payload, handler) {
        Ok(packet) => Ok(Delivery::Settled(packet)),
        Err(reason) => {
            store.save(FailedRecord {
                key: *key,
                payload,
                payload_hash: payload_hash(payload),
                reason,
            })?;
            Ok(Delivery::Stored { reason })
        }
    }
}

fn settle<H: ReleaseHandler>(payload: &[u8], handler: &mut H) -> ProtocolResult<Packet> {
    let packet = Packet::decode(payload)?;

    match &packet {
        Packet::Text { text } => {
            if text.len() > MAX_TEXT_LEN {
                return Err(BridgeError::TextTooLong);
            }
            handler.update_text(text)?;
        }
        swap => {
            let transfer = AssetTransfer::from_packet(swap).ok_or(BridgeError::UnknownPacketKind)?;
            handler.release(&transfer)?;
        }
    }

    Ok(packet)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleasePlan {
    /// Pay out of units the bridge already holds
    Unlock,
    Mint,
}

/// Unlock when the bridge holds enough of the asset, otherwise mint if permitted.
pub fn plan_release(held: u64, amount: u64, can_mint: bool) -> ProtocolResult<ReleasePlan> {
    if held >= amount {
        Ok(ReleasePlan::Unlock)
    } else if can_mint {
        Ok(ReleasePlan::Mint)
    } else {
        Err(BridgeError::MissingMintPermission)
    }
}
