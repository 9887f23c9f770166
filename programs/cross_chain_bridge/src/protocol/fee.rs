use anchor_lang::prelude::*;

use crate::errors::BridgeError;
use crate::protocol::packet::Packet;

/// Relay pricing for one channel, denominated in lamports.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Flat charge per relayed packet
    pub base_fee: u64,

    /// Charge per payload byte
    pub fee_per_byte: u64,

    /// Price of one unit of destination gas
    pub gas_price: u64,

    /// Destination gas budgeted when the caller does not ask for more
    pub default_gas_limit: u64,
}

impl FeeSchedule {
    pub const SIZE: usize = 8   // base_fee
        + 8                     // fee_per_byte
        + 8                     // gas_price
        + 8;                    // default_gas_limit
}

/// Caller-supplied adapter parameters forwarded to the relay.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayParams {
    /// Destination gas limit override
    pub gas_limit: Option<u64>,
}

impl RelayParams {
    pub fn gas_limit(&self, schedule: &FeeSchedule) -> u64 {
        self.gas_limit.unwrap_or(schedule.default_gas_limit)
    }
}

/// Native fee for relaying `payload_len` bytes across a channel.
pub fn quote(
    schedule: &FeeSchedule,
    payload_len: usize,
    params: &RelayParams,
) -> std::result::Result<u64, BridgeError> {
    let byte_cost = schedule
        .fee_per_byte
        .checked_mul(payload_len as u64)
        .ok_or(BridgeError::ArithmeticOverflow)?;
    let gas_cost = params
        .gas_limit(schedule)
        .checked_mul(schedule.gas_price)
        .ok_or(BridgeError::ArithmeticOverflow)?;

    schedule
        .base_fee
        .checked_add(byte_cost)
        .and_then(|fee| fee.checked_add(gas_cost))
        .ok_or(BridgeError::ArithmeticOverflow)
}

/// Quote for the exact bytes `packet` encodes to.
pub fn estimate(
    packet: &Packet,
    schedule: &FeeSchedule,
    params: &RelayParams,
) -> std::result::Result<u64, BridgeError> {
    quote(schedule, packet.encoded_len(), params)
}

pub fn check_attached_fee(attached: u64, quoted: u64) -> std::result::Result<(), BridgeError> {
    if attached < quoted {
        return Err(BridgeError::InsufficientFee);
    }
    Ok(())
}
