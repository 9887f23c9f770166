use anchor_lang::prelude::*;

/// Event emitted when a bridge instance is initialized
#[event]
pub struct BridgeInitialized {
    pub chain_id: u16,
    pub authority: Pubkey,
    pub endpoint: Pubkey,
}

/// Event emitted when system status changes
#[event]
pub struct SystemStatusChanged {
    pub enabled: bool,
}

#[event]
pub struct TransportUpdated {
    pub endpoint: Pubkey,
    pub fee_collector: Pubkey,
}

#[event]
pub struct ChannelOpened {
    pub remote_chain_id: u16,
}

/// Event emitted when a channel's trusted peer is replaced
#[event]
pub struct TrustedRemoteSet {
    pub remote_chain_id: u16,
    pub peer: [u8; 32],
}

#[event]
pub struct FeeScheduleUpdated {
    pub remote_chain_id: u16,
    pub base_fee: u64,
    pub fee_per_byte: u64,
    pub gas_price: u64,
    pub default_gas_limit: u64,
}

#[event]
pub struct TokenConfigured {
    pub remote_chain_id: u16,
    pub local_asset: Pubkey,
    pub remote_asset: [u8; 32],
}

#[event]
pub struct MintPermissionChanged {
    pub remote_chain_id: u16,
    pub local_asset: Pubkey,
    pub enabled: bool,
}

#[event]
pub struct AssetMintCreated {
    pub collection: Pubkey,
    pub asset_id: u64,
    pub mint: Pubkey,
}

/// Event emitted when a packet is handed to the transport.
/// Relayers pick up `payload` from here.
#[event]
pub struct PacketSent {
    pub dst_chain_id: u16,
    pub nonce: u64,
    pub sender: Pubkey,
    pub payload: Vec<u8>,
    pub fee: u64,
    pub gas_limit: u64,
}

#[event]
pub struct TextReceived {
    pub src_chain_id: u16,
    pub nonce: u64,
    pub text: String,
}

#[event]
pub struct TokenReceived {
    pub src_chain_id: u16,
    pub nonce: u64,
    pub mint: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
}

#[event]
pub struct NftReceived {
    pub src_chain_id: u16,
    pub nonce: u64,
    pub collection: Pubkey,
    pub recipient: Pubkey,
    pub asset_id: u64,
}

#[event]
pub struct FtReceived {
    pub src_chain_id: u16,
    pub nonce: u64,
    pub collection: Pubkey,
    pub recipient: Pubkey,
    pub asset_id: u64,
    pub amount: u64,
}

/// Event emitted when an inbound packet is stored for retry.
/// Operators watch for this to know a retry is needed.
#[event]
pub struct MessageFailed {
    pub src_chain_id: u16,
    pub src_peer: [u8; 32],
    pub nonce: u64,
    pub payload_hash: [u8; 32],
    pub reason: u32,
}

#[event]
pub struct MessageRetried {
    pub src_chain_id: u16,
    pub src_peer: [u8; 32],
    pub nonce: u64,
    pub caller: Pubkey,
}

#[event]
pub struct SponsorConfigured {
    pub authority: Pubkey,
    pub max_fee_per_message: u64,
}

#[event]
pub struct SponsorFunded {
    pub funder: Pubkey,
    pub amount: u64,
}
