//! Wire codec for bridge packets.
//!
//! The layout is a fixed, versionless concatenation with big-endian integers:
//!
//! | kind         | layout                                                        |
//! |--------------|---------------------------------------------------------------|
//! | `TEXT`       | tag `u16`, length `u32`, UTF-8 text                           |
//! | `SWAP_*`     | tag `u16`, remote asset `[32]`, recipient `[32]`, asset id `u64`, amount `u64` |
//!
//! Fields a kind does not use are written as zero and ignored when decoding.

use std::fmt;

use crate::constants::IDENTITY_SIZE;
use crate::errors::BridgeError;

/// Chain-agnostic 32-byte account or contract identity.
pub type Identity = [u8; IDENTITY_SIZE];

pub const TAG_SIZE: usize = 2;
pub const TEXT_HEADER_SIZE: usize = TAG_SIZE + 4;
pub const SWAP_PACKET_SIZE: usize = TAG_SIZE + IDENTITY_SIZE + IDENTITY_SIZE + 8 + 8;

/// Packet kind tags. Values are part of the cross-chain wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PacketKind {
    Text = 0,
    SwapToken = 1,
    SwapNft = 2,
    SwapFt = 3,
}

impl PacketKind {
    pub fn tag(self) -> u16 {
        self as u16
    }

    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(PacketKind::Text),
            1 => Some(PacketKind::SwapToken),
            2 => Some(PacketKind::SwapNft),
            3 => Some(PacketKind::SwapFt),
            _ => None,
        }
    }
}

/// A decoded cross-chain request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    Text {
        text: String,
    },
    SwapToken {
        remote_asset: Identity,
        recipient: Identity,
        amount: u64,
    },
    SwapNft {
        remote_asset: Identity,
        recipient: Identity,
        asset_id: u64,
    },
    SwapFt {
        remote_asset: Identity,
        recipient: Identity,
        asset_id: u64,
        amount: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload length does not match the layout of its kind.
    MalformedLength { expected: usize, actual: usize },
    UnknownKind(u16),
    InvalidText,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedLength { expected, actual } => {
                write!(f, "malformed length: expected {expected} bytes, got {actual}")
            }
            DecodeError::UnknownKind(tag) => write!(f, "unknown packet kind {tag}"),
            DecodeError::InvalidText => write!(f, "text is not valid UTF-8"),
        }
    }
}

impl From<DecodeError> for BridgeError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MalformedLength { .. } => BridgeError::MalformedLength,
            DecodeError::UnknownKind(_) => BridgeError::UnknownPacketKind,
            DecodeError::InvalidText => BridgeError::InvalidText,
        }
    }
}

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Text { .. } => PacketKind::Text,
            Packet::SwapToken { .. } => PacketKind::SwapToken,
            Packet::SwapNft { .. } => PacketKind::SwapNft,
            Packet::SwapFt { .. } => PacketKind::SwapFt,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Packet::Text { text } => TEXT_HEADER_SIZE + text.len(),
            _ => SWAP_PACKET_SIZE,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.kind().tag().to_be_bytes());

        match self {
            Packet::Text { text } => {
                out.extend_from_slice(&(text.len() as u32).to_be_bytes());
                out.extend_from_slice(text.as_bytes());
            }
            Packet::SwapToken {
                remote_asset,
                recipient,
                amount,
            } => encode_swap(&mut out, remote_asset, recipient, 0, *amount),
            Packet::SwapNft {
                remote_asset,
                recipient,
                asset_id,
            } => encode_swap(&mut out, remote_asset, recipient, *asset_id, 0),
            Packet::SwapFt {
                remote_asset,
                recipient,
                asset_id,
                amount,
            } => encode_swap(&mut out, remote_asset, recipient, *asset_id, *amount),
        }

        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let tag = read_u16(bytes, 0).ok_or(DecodeError::MalformedLength {
            expected: TAG_SIZE,
            actual: bytes.len(),
        })?;
        let kind = PacketKind::from_tag(tag).ok_or(DecodeError::UnknownKind(tag))?;

        if kind == PacketKind::Text {
            return decode_text(bytes);
        }

        expect_len(bytes, SWAP_PACKET_SIZE)?;
        let mut cursor = TAG_SIZE;
        let remote_asset = read_identity(bytes, &mut cursor);
        let recipient = read_identity(bytes, &mut cursor);
        let asset_id = read_u64(bytes, cursor).unwrap_or_default();
        let amount = read_u64(bytes, cursor + 8).unwrap_or_default();

        Ok(match kind {
            PacketKind::SwapToken => Packet::SwapToken {
                remote_asset,
                recipient,
                amount,
            },
            PacketKind::SwapNft => Packet::SwapNft {
                remote_asset,
                recipient,
                asset_id,
            },
            PacketKind::SwapFt => Packet::SwapFt {
                remote_asset,
                recipient,
                asset_id,
                amount,
            },
            PacketKind::Text => unreachable!("text handled above"),
        })
    }
}

fn encode_swap(out: &mut Vec<u8>, remote_asset: &Identity, recipient: &Identity, asset_id: u64, amount: u64) {
    out.extend_from_slice(remote_asset);
    out.extend_from_slice(recipient);
    out.extend_from_slice(&asset_id.to_be_bytes());
    out.extend_from_slice(&amount.to_be_bytes());
}

fn decode_text(bytes: &[u8]) -> Result<Packet, DecodeError> {
    let declared = read_u32(bytes, TAG_SIZE).ok_or(DecodeError::MalformedLength {
        expected: TEXT_HEADER_SIZE,
        actual: bytes.len(),
    })?;
    let expected = TEXT_HEADER_SIZE.saturating_add(declared as usize);
    expect_len(bytes, expected)?;

    let text = std::str::from_utf8(&bytes[TEXT_HEADER_SIZE..])
        .map_err(|_| DecodeError::InvalidText)?
        .to_string();
    Ok(Packet::Text { text })
}

fn expect_len(bytes: &[u8], expected: usize) -> Result<(), DecodeError> {
    if bytes.len() != expected {
        return Err(DecodeError::MalformedLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(at..at + 2)?.try_into().ok()?;
    Some(u16::from_be_bytes(raw))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(raw))
}

fn read_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(at..at + 8)?.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

// Callers check the total length first.
fn read_identity(bytes: &[u8], cursor: &mut usize) -> Identity {
    let mut id = [0u8; IDENTITY_SIZE];
    id.copy_from_slice(&bytes[*cursor..*cursor + IDENTITY_SIZE]);
    *cursor += IDENTITY_SIZE;
    id
}
