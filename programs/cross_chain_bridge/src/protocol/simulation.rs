//! Two-chain, in-memory run of the protocol.
//!
//! Each chain is a plain ledger. Every call runs against a clone that is only
//! committed on `Ok`, mirroring transaction atomicity on Solana.

use std::collections::{HashMap, HashSet};

use anchor_lang::prelude::Pubkey;

use crate::errors::BridgeError;
use crate::protocol::fee::{FeeSchedule, RelayParams};
use crate::protocol::inbound::tests::MemoryStore;
use crate::protocol::inbound::{self, plan_release, AssetTransfer, Delivery, MessageKey, ReleaseHandler, ReleasePlan};
use crate::protocol::outbound::{self, BridgeRequest};
use crate::protocol::packet::Identity;

type SimResult<T> = std::result::Result<T, BridgeError>;

/// (asset, asset id, owner)
type Holding = (Identity, u64, Identity);

#[derive(Clone, Debug)]
struct Sent {
    dst_chain_id: u16,
    nonce: u64,
    payload: Vec<u8>,
}

#[derive(Clone, Default)]
struct Chain {
    chain_id: u16,
    bridge: Identity,
    fee_collector: Identity,
    schedule: FeeSchedule,
    trusted: HashMap<u16, Identity>,
    token_configs: HashMap<(u16, Identity), Identity>,
    mintable: HashSet<Identity>,
    lamports: HashMap<Identity, u64>,
    balances: HashMap<Holding, u64>,
    text: String,
    outbound_nonce: HashMap<u16, u64>,
    inbound_nonce: HashMap<u16, u64>,
    failed: MemoryStore,
    outbox: Vec<Sent>,
}

struct Releaser<'a> {
    bridge: Identity,
    balances: &'a mut HashMap<Holding, u64>,
    mintable: &'a HashSet<Identity>,
    text: &'a mut String,
}

impl ReleaseHandler for Releaser<'_> {
    fn update_text(&mut self, text: &str) -> SimResult<()> {
        *self.text = text.to_string();
        Ok(())
    }

    fn release(&mut self, transfer: &AssetTransfer) -> SimResult<()> {
        let vault = (transfer.asset, transfer.asset_id, self.bridge);
        let held = self.balances.get(&vault).copied().unwrap_or_default();
        let plan = plan_release(held, transfer.amount, self.mintable.contains(&transfer.asset))?;

        if plan == ReleasePlan::Unlock {
            *self.balances.entry(vault).or_default() -= transfer.amount;
        }
        *self
            .balances
            .entry((transfer.asset, transfer.asset_id, transfer.recipient))
            .or_default() += transfer.amount;
        Ok(())
    }
}

impl Chain {
    fn new(chain_id: u16) -> Self {
        Chain {
            chain_id,
            bridge: [chain_id as u8; 32],
            fee_collector: [0xFC; 32],
            schedule: FeeSchedule {
                base_fee: 5_000,
                fee_per_byte: 10,
                gas_price: 1,
                default_gas_limit: 200_000,
            },
            ..Default::default()
        }
    }

    fn transact<T>(&mut self, op: impl FnOnce(&mut Chain) -> SimResult<T>) -> SimResult<T> {
        let mut staged = self.clone();
        let out = op(&mut staged)?;
        *self = staged;
        Ok(out)
    }

    fn balance(&self, asset: Identity, asset_id: u64, owner: Identity) -> u64 {
        self.balances
            .get(&(asset, asset_id, owner))
            .copied()
            .unwrap_or_default()
    }

    fn credit(&mut self, asset: Identity, asset_id: u64, owner: Identity, amount: u64) {
        *self.balances.entry((asset, asset_id, owner)).or_default() += amount;
    }

    fn remote_asset(&self, dst: u16, request: &BridgeRequest) -> Option<Identity> {
        let local = request.local_asset()?.to_bytes();
        self.token_configs.get(&(dst, local)).copied()
    }

    fn estimate(&self, caller: Identity, dst: u16, request: &BridgeRequest) -> SimResult<u64> {
        let remote = self.remote_asset(dst, request);
        outbound::quote_request(request, remote, caller, &self.schedule, &RelayParams::default())
            .map(|dispatch| dispatch.fee)
    }

    /// Validate fee, then escrow, then hand off.
    fn send(&mut self, caller: Identity, dst: u16, request: BridgeRequest, fee: u64) -> SimResult<u64> {
        self.transact(|chain| {
            let dispatch = outbound::prepare_dispatch(
                chain.trusted.get(&dst).copied(),
                &request,
                chain.remote_asset(dst, &request),
                caller,
                &chain.schedule,
                &RelayParams::default(),
                fee,
            )?;

            if let Some((asset, asset_id, amount)) = escrow_of(&request) {
                let from = chain.balances.entry((asset, asset_id, caller)).or_default();
                *from = from.checked_sub(amount).ok_or(BridgeError::AssetEscrowFailed)?;
                chain.credit(asset, asset_id, chain.bridge, amount);
            }

            let paid = chain.lamports.entry(caller).or_default();
            *paid = paid.checked_sub(dispatch.fee).ok_or(BridgeError::InsufficientFee)?;
            *chain.lamports.entry(chain.fee_collector).or_default() += dispatch.fee;

            let nonce = chain.outbound_nonce.entry(dst).or_default();
            *nonce += 1;
            let nonce = *nonce;
            chain.outbox.push(Sent {
                dst_chain_id: dst,
                nonce,
                payload: dispatch.payload,
            });
            Ok(nonce)
        })
    }

    fn receive(&mut self, key: MessageKey, payload: &[u8]) -> SimResult<Delivery> {
        self.transact(|chain| {
            let trusted = chain.trusted.get(&key.src_chain_id).copied();
            let mut last = chain.inbound_nonce.get(&key.src_chain_id).copied().unwrap_or_default();
            let mut releaser = Releaser {
                bridge: chain.bridge,
                balances: &mut chain.balances,
                mintable: &chain.mintable,
                text: &mut chain.text,
            };
            let delivery = inbound::receive(trusted, &mut last, &key, payload, &mut chain.failed, &mut releaser)?;
            chain.inbound_nonce.insert(key.src_chain_id, last);
            Ok(delivery)
        })
    }

    fn retry(&mut self, key: MessageKey, payload: &[u8]) -> SimResult<Delivery> {
        self.transact(|chain| {
            let mut releaser = Releaser {
                bridge: chain.bridge,
                balances: &mut chain.balances,
                mintable: &chain.mintable,
                text: &mut chain.text,
            };
            inbound::retry(&key, payload, &mut chain.failed, &mut releaser)
        })
    }
}

fn escrow_of(request: &BridgeRequest) -> Option<(Identity, u64, u64)> {
    match *request {
        BridgeRequest::Text { .. } => None,
        BridgeRequest::SwapToken { local_asset, amount } => Some((local_asset.to_bytes(), 0, amount)),
        BridgeRequest::SwapNft { collection, asset_id } => Some((collection.to_bytes(), asset_id, 1)),
        BridgeRequest::SwapFt {
            collection,
            asset_id,
            amount,
        } => Some((collection.to_bytes(), asset_id, amount)),
    }
}

const CHAIN_A: u16 = 10102;
const CHAIN_B: u16 = 10002;
const BOB: Identity = [0xB0; 32];
const TOKEN_A: Identity = [0x0A; 32];
const TOKEN_B: Identity = [0x0B; 32];
const COLLECTION_A: Identity = [0xCA; 32];
const COLLECTION_B: Identity = [0xCB; 32];

/// A and B trusting each other, with token and collection mappings both ways.
fn linked_chains() -> (Chain, Chain) {
    let mut a = Chain::new(CHAIN_A);
    let mut b = Chain::new(CHAIN_B);

    a.trusted.insert(CHAIN_B, b.bridge);
    b.trusted.insert(CHAIN_A, a.bridge);

    a.token_configs.insert((CHAIN_B, TOKEN_A), TOKEN_B);
    b.token_configs.insert((CHAIN_A, TOKEN_B), TOKEN_A);
    a.token_configs.insert((CHAIN_B, COLLECTION_A), COLLECTION_B);
    b.token_configs.insert((CHAIN_A, COLLECTION_B), COLLECTION_A);

    a.lamports.insert(BOB, 10_000_000);
    b.lamports.insert(BOB, 10_000_000);
    (a, b)
}

/// Deliver everything in `src`'s outbox to `dst`, in order.
fn relay(src: &mut Chain, dst: &mut Chain) -> Vec<SimResult<Delivery>> {
    let sent: Vec<Sent> = src.outbox.drain(..).collect();
    let dst_chain_id = dst.chain_id;
    sent.into_iter()
        .filter(|packet| packet.dst_chain_id == dst_chain_id)
        .map(|packet| {
            let key = MessageKey {
                src_chain_id: src.chain_id,
                src_peer: src.bridge,
                nonce: packet.nonce,
            };
            dst.receive(key, &packet.payload)
        })
        .collect()
}

fn pubkey(id: Identity) -> Pubkey {
    Pubkey::new_from_array(id)
}

#[test]
fn test_token_swap_happy_path() {
    let (mut a, mut b) = linked_chains();
    a.credit(TOKEN_A, 0, BOB, 1_000);
    b.mintable.insert(TOKEN_B);

    let request = BridgeRequest::SwapToken {
        local_asset: pubkey(TOKEN_A),
        amount: 1_000,
    };
    let fee = a.estimate(BOB, CHAIN_B, &request).unwrap();
    a.send(BOB, CHAIN_B, request, fee).unwrap();

    let results = relay(&mut a, &mut b);
    assert!(results[0].as_ref().unwrap().is_settled());

    assert_eq!(a.balance(TOKEN_A, 0, BOB), 0);
    assert_eq!(a.balance(TOKEN_A, 0, a.bridge), 1_000);
    assert_eq!(b.balance(TOKEN_B, 0, BOB), 1_000);
    assert_eq!(a.lamports[&a.fee_collector], fee);
}

#[test]
fn test_return_trip_unlocks_escrow() {
    let (mut a, mut b) = linked_chains();
    a.credit(TOKEN_A, 0, BOB, 1_000);
    b.mintable.insert(TOKEN_B);

    let out = BridgeRequest::SwapToken {
        local_asset: pubkey(TOKEN_A),
        amount: 1_000,
    };
    let fee = a.estimate(BOB, CHAIN_B, &out).unwrap();
    a.send(BOB, CHAIN_B, out, fee).unwrap();
    relay(&mut a, &mut b);

    // A never gets mint permission; the escrowed units come back instead
    let back = BridgeRequest::SwapToken {
        local_asset: pubkey(TOKEN_B),
        amount: 400,
    };
    let fee = b.estimate(BOB, CHAIN_A, &back).unwrap();
    b.send(BOB, CHAIN_A, back, fee).unwrap();
    let results = relay(&mut b, &mut a);

    assert!(results[0].as_ref().unwrap().is_settled());
    assert_eq!(a.balance(TOKEN_A, 0, BOB), 400);
    assert_eq!(a.balance(TOKEN_A, 0, a.bridge), 600);
    assert_eq!(b.balance(TOKEN_B, 0, BOB), 600);
}

#[test]
fn test_blocked_then_retried_ft_swap() {
    let (mut a, mut b) = linked_chains();
    a.credit(COLLECTION_A, 10, BOB, 1);

    let request = BridgeRequest::SwapFt {
        collection: pubkey(COLLECTION_A),
        asset_id: 10,
        amount: 1,
    };
    let fee = a.estimate(BOB, CHAIN_B, &request).unwrap();
    a.send(BOB, CHAIN_B, request, fee).unwrap();
    let payload = a.outbox[0].payload.clone();

    let results = relay(&mut a, &mut b);
    assert!(matches!(
        results[0],
        Ok(Delivery::Stored {
            reason: BridgeError::MissingMintPermission
        })
    ));
    assert_eq!(a.balance(COLLECTION_A, 10, BOB), 0);
    assert_eq!(a.balance(COLLECTION_A, 10, a.bridge), 1);
    assert_eq!(b.balance(COLLECTION_B, 10, BOB), 0);

    let key = MessageKey {
        src_chain_id: CHAIN_A,
        src_peer: a.bridge,
        nonce: 1,
    };

    // Still blocked: the record is replaced, not duplicated
    let again = b.retry(key, &payload).unwrap();
    assert!(!again.is_settled());
    assert_eq!(b.failed.records.len(), 1);

    b.mintable.insert(COLLECTION_B);
    let settled = b.retry(key, &payload).unwrap();
    assert!(settled.is_settled());
    assert_eq!(b.balance(COLLECTION_B, 10, BOB), 1);

    let err = b.retry(key, &payload).unwrap_err();
    assert!(matches!(err, BridgeError::NoStoredMessage));
    assert_eq!(b.balance(COLLECTION_B, 10, BOB), 1);
}

#[test]
fn test_sequence_independence() {
    let (mut a, mut b) = linked_chains();
    a.credit(COLLECTION_A, 10, BOB, 5);

    let ft = BridgeRequest::SwapFt {
        collection: pubkey(COLLECTION_A),
        asset_id: 10,
        amount: 5,
    };
    let fee = a.estimate(BOB, CHAIN_B, &ft).unwrap();
    a.send(BOB, CHAIN_B, ft, fee).unwrap();

    let text = BridgeRequest::Text {
        text: "Hello from Solana".to_string(),
    };
    let fee = a.estimate(BOB, CHAIN_B, &text).unwrap();
    a.send(BOB, CHAIN_B, text, fee).unwrap();

    let results = relay(&mut a, &mut b);
    assert!(!results[0].as_ref().unwrap().is_settled());
    assert!(results[1].as_ref().unwrap().is_settled());
    assert_eq!(b.text, "Hello from Solana");
    assert_eq!(b.inbound_nonce[&CHAIN_A], 2);
}

#[test]
fn test_authentication_gate() {
    let (_, mut b) = linked_chains();
    b.mintable.insert(TOKEN_B);
    let forged = MessageKey {
        src_chain_id: CHAIN_A,
        src_peer: [0x66; 32],
        nonce: 1,
    };
    let payload = crate::protocol::packet::Packet::SwapToken {
        remote_asset: TOKEN_B,
        recipient: BOB,
        amount: 1_000_000,
    }
    .encode();

    let err = b.receive(forged, &payload).unwrap_err();

    assert!(matches!(err, BridgeError::Unauthenticated));
    assert!(b.failed.records.is_empty());
    assert_eq!(b.balance(TOKEN_B, 0, BOB), 0);
    assert!(b.inbound_nonce.is_empty());
}

#[test]
fn test_fee_below_estimate_escrows_nothing() {
    let (mut a, _) = linked_chains();
    a.credit(TOKEN_A, 0, BOB, 1_000);
    let request = BridgeRequest::SwapToken {
        local_asset: pubkey(TOKEN_A),
        amount: 1_000,
    };
    let fee = a.estimate(BOB, CHAIN_B, &request).unwrap();

    let err = a.send(BOB, CHAIN_B, request, fee - 1).unwrap_err();

    assert!(matches!(err, BridgeError::InsufficientFee));
    assert_eq!(a.balance(TOKEN_A, 0, BOB), 1_000);
    assert_eq!(a.lamports[&BOB], 10_000_000);
    assert!(a.outbox.is_empty());
    assert!(a.outbound_nonce.is_empty());
}

#[test]
fn test_failed_handoff_restores_escrow() {
    let (mut a, _) = linked_chains();
    a.credit(TOKEN_A, 0, BOB, 1_000);
    a.lamports.insert(BOB, 1);
    let request = BridgeRequest::SwapToken {
        local_asset: pubkey(TOKEN_A),
        amount: 1_000,
    };
    let fee = a.estimate(BOB, CHAIN_B, &request).unwrap();

    // Fee covers the estimate but the payer cannot fund it after escrow
    assert!(a.send(BOB, CHAIN_B, request, fee).is_err());

    assert_eq!(a.balance(TOKEN_A, 0, BOB), 1_000);
    assert_eq!(a.balance(TOKEN_A, 0, a.bridge), 0);
    assert!(a.outbox.is_empty());
}

#[test]
fn test_unconfigured_asset_fails_before_escrow() {
    let (mut a, _) = linked_chains();
    let unknown = [0x99; 32];
    a.credit(unknown, 0, BOB, 10);

    let err = a
        .send(
            BOB,
            CHAIN_B,
            BridgeRequest::SwapToken {
                local_asset: pubkey(unknown),
                amount: 10,
            },
            u64::MAX,
        )
        .unwrap_err();

    assert!(matches!(err, BridgeError::UnconfiguredAsset));
    assert_eq!(a.balance(unknown, 0, BOB), 10);
}

#[test]
fn test_estimate_needs_no_ownership() {
    let (a, _) = linked_chains();
    let request = BridgeRequest::SwapNft {
        collection: pubkey(COLLECTION_A),
        asset_id: 7,
    };

    // BOB holds no unit of id 7
    let fee = a.estimate(BOB, CHAIN_B, &request).unwrap();
    assert!(fee > 0);
    assert!(a.outbox.is_empty());
}

#[test]
fn test_nft_round_trip() {
    let (mut a, mut b) = linked_chains();
    a.credit(COLLECTION_A, 7, BOB, 1);
    b.mintable.insert(COLLECTION_B);

    let request = BridgeRequest::SwapNft {
        collection: pubkey(COLLECTION_A),
        asset_id: 7,
    };
    let fee = a.estimate(BOB, CHAIN_B, &request).unwrap();
    a.send(BOB, CHAIN_B, request, fee).unwrap();
    relay(&mut a, &mut b);
    assert_eq!(b.balance(COLLECTION_B, 7, BOB), 1);

    let back = BridgeRequest::SwapNft {
        collection: pubkey(COLLECTION_B),
        asset_id: 7,
    };
    let fee = b.estimate(BOB, CHAIN_A, &back).unwrap();
    b.send(BOB, CHAIN_A, back, fee).unwrap();
    relay(&mut b, &mut a);

    assert_eq!(a.balance(COLLECTION_A, 7, BOB), 1);
    assert_eq!(a.balance(COLLECTION_A, 7, a.bridge), 0);
}
