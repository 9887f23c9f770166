use anchor_lang::prelude::*;

use crate::constants::{MAX_PAYLOAD_SIZE, MAX_TEXT_LEN};
use crate::errors::BridgeError;
use crate::protocol::fee::{self, FeeSchedule, RelayParams};
use crate::protocol::packet::{Identity, Packet};

/// Outbound request as submitted by a caller, before remote asset resolution.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum BridgeRequest {
    Text {
        text: String,
    },
    SwapToken {
        local_asset: Pubkey,
        amount: u64,
    },
    SwapNft {
        collection: Pubkey,
        asset_id: u64,
    },
    SwapFt {
        collection: Pubkey,
        asset_id: u64,
        amount: u64,
    },
}

impl BridgeRequest {
    /// Key of the token configuration entry this request resolves through.
    pub fn local_asset(&self) -> Option<Pubkey> {
        match self {
            BridgeRequest::Text { .. } => None,
            BridgeRequest::SwapToken { local_asset, .. } => Some(*local_asset),
            BridgeRequest::SwapNft { collection, .. } | BridgeRequest::SwapFt { collection, .. } => {
                Some(*collection)
            }
        }
    }
}

/// Everything the send path needs once validation has passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub packet: Packet,
    pub payload: Vec<u8>,
    pub fee: u64,
}

pub fn build_packet(
    request: &BridgeRequest,
    remote_asset: Option<Identity>,
    recipient: Identity,
) -> std::result::Result<Packet, BridgeError> {
    if let BridgeRequest::Text { text } = request {
        if text.len() > MAX_TEXT_LEN {
            return Err(BridgeError::TextTooLong);
        }
        return Ok(Packet::Text { text: text.clone() });
    }

    let remote_asset = remote_asset.ok_or(BridgeError::UnconfiguredAsset)?;
    let packet = match *request {
        BridgeRequest::SwapToken { amount, .. } => {
            require_amount(amount)?;
            Packet::SwapToken {
                remote_asset,
                recipient,
                amount,
            }
        }
        BridgeRequest::SwapNft { asset_id, .. } => Packet::SwapNft {
            remote_asset,
            recipient,
            asset_id,
        },
        BridgeRequest::SwapFt {
            asset_id, amount, ..
        } => {
            require_amount(amount)?;
            Packet::SwapFt {
                remote_asset,
                recipient,
                asset_id,
                amount,
            }
        }
        BridgeRequest::Text { .. } => unreachable!("text handled above"),
    };
    Ok(packet)
}

/// Builds the payload and its fee without requiring a trusted remote.
/// Quotes and sends share this path so the quoted bytes are the sent bytes.
pub fn quote_request(
    request: &BridgeRequest,
    remote_asset: Option<Identity>,
    recipient: Identity,
    schedule: &FeeSchedule,
    params: &RelayParams,
) -> std::result::Result<Dispatch, BridgeError> {
    let packet = build_packet(request, remote_asset, recipient)?;
    let payload = packet.encode();
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(BridgeError::PayloadTooLarge);
    }
    let fee = fee::quote(schedule, payload.len(), params)?;

    Ok(Dispatch {
        packet,
        payload,
        fee,
    })
}

/// Validates an outbound request in full. Nothing has been escrowed or paid
/// when this returns an error.
pub fn prepare_dispatch(
    trusted_remote: Option<Identity>,
    request: &BridgeRequest,
    remote_asset: Option<Identity>,
    recipient: Identity,
    schedule: &FeeSchedule,
    params: &RelayParams,
    attached_fee: u64,
) -> std::result::Result<Dispatch, BridgeError> {
    if trusted_remote.is_none() {
        return Err(BridgeError::UntrustedChannel);
    }
    let dispatch = quote_request(request, remote_asset, recipient, schedule, params)?;
    fee::check_attached_fee(attached_fee, dispatch.fee)?;
    Ok(dispatch)
}

fn require_amount(amount: u64) -> std::result::Result<(), BridgeError> {
    if amount == 0 {
        return Err(BridgeError::InvalidAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::PacketKind;

    const PEER: Identity = [7u8; 32];
    const REMOTE_ASSET: Identity = [9u8; 32];
    const RECIPIENT: Identity = [4u8; 32];

    fn schedule() -> FeeSchedule {
        FeeSchedule {
            base_fee: 1_000,
            fee_per_byte: 1,
            gas_price: 0,
            default_gas_limit: 0,
        }
    }

    fn token_request(amount: u64) -> BridgeRequest {
        BridgeRequest::SwapToken {
            local_asset: Pubkey::new_unique(),
            amount,
        }
    }

    #[test]
    fn test_local_asset_key() {
        let collection = Pubkey::new_unique();
        let nft = BridgeRequest::SwapNft {
            collection,
            asset_id: 1,
        };
        assert_eq!(nft.local_asset(), Some(collection));
        assert_eq!(
            BridgeRequest::Text {
                text: "x".to_string()
            }
            .local_asset(),
            None
        );
    }

    #[test]
    fn test_swap_token_packet() {
        let packet = build_packet(&token_request(1_000), Some(REMOTE_ASSET), RECIPIENT).unwrap();
        assert_eq!(
            packet,
            Packet::SwapToken {
                remote_asset: REMOTE_ASSET,
                recipient: RECIPIENT,
                amount: 1_000,
            }
        );
    }

    #[test]
    fn test_unconfigured_asset_fails_fast() {
        let err = build_packet(&token_request(1), None, RECIPIENT).unwrap_err();
        assert!(matches!(err, BridgeError::UnconfiguredAsset));
    }

    #[test]
    fn test_text_needs_no_asset_mapping() {
        let request = BridgeRequest::Text {
            text: "Hello from Solana".to_string(),
        };
        let packet = build_packet(&request, None, RECIPIENT).unwrap();
        assert_eq!(packet.kind(), PacketKind::Text);
    }

    #[test]
    fn test_text_too_long() {
        let request = BridgeRequest::Text {
            text: "x".repeat(MAX_TEXT_LEN + 1),
        };
        assert!(matches!(
            build_packet(&request, None, RECIPIENT),
            Err(BridgeError::TextTooLong)
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(matches!(
            build_packet(&token_request(0), Some(REMOTE_ASSET), RECIPIENT),
            Err(BridgeError::InvalidAmount)
        ));
        let ft = BridgeRequest::SwapFt {
            collection: Pubkey::new_unique(),
            asset_id: 10,
            amount: 0,
        };
        assert!(matches!(
            build_packet(&ft, Some(REMOTE_ASSET), RECIPIENT),
            Err(BridgeError::InvalidAmount)
        ));
    }

    #[test]
    fn test_quote_matches_sent_payload() {
        let request = token_request(500);
        let quoted = quote_request(&request, Some(REMOTE_ASSET), RECIPIENT, &schedule(), &RelayParams::default())
            .unwrap();
        let sent = prepare_dispatch(
            Some(PEER),
            &request,
            Some(REMOTE_ASSET),
            RECIPIENT,
            &schedule(),
            &RelayParams::default(),
            quoted.fee,
        )
        .unwrap();

        assert_eq!(quoted, sent);
        assert_eq!(sent.fee, 1_000 + sent.payload.len() as u64);
    }

    #[test]
    fn test_untrusted_channel_rejected() {
        let err = prepare_dispatch(
            None,
            &token_request(1),
            Some(REMOTE_ASSET),
            RECIPIENT,
            &schedule(),
            &RelayParams::default(),
            u64::MAX,
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::UntrustedChannel));
    }

    #[test]
    fn test_fee_one_below_estimate() {
        let request = token_request(1);
        let quoted = quote_request(&request, Some(REMOTE_ASSET), RECIPIENT, &schedule(), &RelayParams::default())
            .unwrap();
        let err = prepare_dispatch(
            Some(PEER),
            &request,
            Some(REMOTE_ASSET),
            RECIPIENT,
            &schedule(),
            &RelayParams::default(),
            quoted.fee - 1,
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::InsufficientFee));
    }
}
