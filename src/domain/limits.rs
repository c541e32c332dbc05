use crate::domain::account::Amount;
use crate::error::{BankError, Result};

/// Maximum CKB per single withdrawal, enforced both client- and server-side.
pub const PER_TRANSACTION_CEILING: u32 = 10;

/// Maximum cumulative CKB withdrawn per customer per calendar day. Enforced
/// authoritatively server-side; listed here for display and simulation only.
pub const DAILY_CEILING: u32 = 25;

/// Maximum withdrawal count per customer per calendar day. Server-side only.
pub const DAILY_WITHDRAWAL_COUNT: usize = 3;

/// Pre-checks a withdrawal request before any network call is issued.
///
/// Only the cheap, stateless violations are caught here: non-positive amounts
/// and the per-transaction ceiling. The daily ceiling needs server-held
/// history, so its verdict is the authority's alone.
pub fn validate_withdrawal(amount: u32) -> Result<Amount> {
    let amount = Amount::new(amount)?;
    if amount.value() > PER_TRANSACTION_CEILING {
        return Err(BankError::validation(format!(
            "Max {PER_TRANSACTION_CEILING} CKB per transaction"
        )));
    }
    Ok(amount)
}

/// Pre-checks a deposit. Deposits carry no client-side ceiling; any positive
/// amount is deferred to the authority.
pub fn validate_deposit(amount: u32) -> Result<Amount> {
    Amount::new(amount)
}

/// Gates a PIN reset: the new PIN must be exactly four ASCII digits and match
/// its re-entered confirmation. Nothing is sent to the authority otherwise.
pub fn validate_new_pin(new_pin: &str, confirm_pin: &str) -> Result<()> {
    if new_pin.len() != 4 || !new_pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(BankError::validation("PIN must be exactly four digits"));
    }
    if new_pin != confirm_pin {
        return Err(BankError::validation("PINs do not match"));
    }
    Ok(())
}
