//! Lamport movement for relay fees and the fee sponsor.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

use crate::errors::BridgeError;

/// Pay a relay fee from a system-owned signer through the system program.
pub fn pay_native_fee<'info>(
    payer: &AccountInfo<'info>,
    fee_collector: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    system_program::transfer(
        CpiContext::new(
            system_program.clone(),
            Transfer {
                from: payer.clone(),
                to: fee_collector.clone(),
            },
        ),
        amount,
    )
}

/// Move lamports out of an account owned by this program, leaving at least
/// `reserve` behind so the account stays rent exempt.
pub fn transfer_from_program_account<'info>(
    from: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    amount: u64,
    reserve: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let spendable = from.lamports().saturating_sub(reserve);
    require!(amount <= spendable, BridgeError::InsufficientSponsorFunds);

    **from.try_borrow_mut_lamports()? = from
        .lamports()
        .checked_sub(amount)
        .ok_or(BridgeError::ArithmeticOverflow)?;
    **to.try_borrow_mut_lamports()? = to
        .lamports()
        .checked_add(amount)
        .ok_or(BridgeError::ArithmeticOverflow)?;
    Ok(())
}
