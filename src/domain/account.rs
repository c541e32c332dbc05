use crate::error::BankError;
use serde::{Deserialize, Serialize};

/// Represents a positive CKB amount for transactions.
///
/// Ensures that transaction amounts are always positive; balances themselves
/// are plain non-negative integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(u32);

impl Amount {
    pub fn new(value: u32) -> Result<Self, BankError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(BankError::validation("Amount must be positive"))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Amount {
    type Error = BankError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for u32 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Account standing as reported by the authority.
///
/// Anything other than `Active` signals that the customer needs a PIN reset
/// before they can withdraw again.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum CustomerStatus {
    Active,
    Disabled,
    CreditOnly,
}

impl CustomerStatus {
    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }
}

/// A customer record as served by the transaction authority.
///
/// The `card_name` doubles as the login credential; `balance` is the
/// authoritative CKB balance at the time of the snapshot.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Customer {
    pub id: u32,
    pub name: String,
    pub card_name: String,
    pub balance: u32,
    pub status: CustomerStatus,
}

/// A kiosk terminal, identified by its unique location name.
///
/// An ATM is also a login principal in its own right (the admin role), with
/// credentials held by the authority.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Atm {
    pub id: u32,
    pub location: String,
    pub current_cash: u32,
}
