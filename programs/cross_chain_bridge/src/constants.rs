/// PDA seeds
pub const BRIDGE_SEED: &[u8] = b"bridge";
pub const CHANNEL_SEED: &[u8] = b"channel";
pub const TOKEN_CONFIG_SEED: &[u8] = b"token_config";
pub const FAILED_MESSAGE_SEED: &[u8] = b"failed_message";
pub const ASSET_MINT_SEED: &[u8] = b"asset_mint";
pub const SPONSOR_SEED: &[u8] = b"sponsor";

/// Maximum sizes for DOS protection
pub const MAX_TEXT_LEN: usize = 256;
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Identity width on the wire (EVM addresses are left-padded)
pub const IDENTITY_SIZE: usize = 32;

/// Per-id asset mints carry no fractional units
pub const ASSET_MINT_DECIMALS: u8 = 0;
