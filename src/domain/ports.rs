use crate::domain::account::{Amount, Atm, Customer};
use crate::domain::logs::AtmLogEntry;
use crate::error::Result;
use async_trait::async_trait;

/// Role-tagged payload returned by a successful login.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LoginPayload {
    Customer { customer: Customer, atm_id: u32 },
    AtmAdmin { atm: Atm },
}

/// Authoritative outcome of a settled withdrawal or deposit.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Receipt {
    pub new_balance: u32,
    pub atm_cash: u32,
    pub message: String,
}

/// The external transaction authority, the engine's sole collaborator.
///
/// All account, ledger and credential state lives behind this port; the
/// engine only caches snapshots of it. Implementations must not retry on
/// their own, so every failure surfaces exactly once per user action.
#[async_trait]
pub trait TransactionAuthority: Send + Sync {
    async fn login(&self, atm_location: &str, card_name: &str, pin: &str) -> Result<LoginPayload>;
    async fn list_customers(&self) -> Result<Vec<Customer>>;
    async fn list_atms(&self) -> Result<Vec<Atm>>;
    async fn withdraw(&self, customer_id: u32, atm_id: u32, amount: Amount) -> Result<Receipt>;
    async fn deposit(&self, customer_id: u32, atm_id: u32, amount: Amount) -> Result<Receipt>;
    /// Also flips the customer back to `Active` and decrements their daily
    /// withdrawal counter, per the authority's documented side effect.
    async fn reset_customer_pin(&self, customer_id: u32, new_pin: &str) -> Result<String>;
    async fn reset_atm_pin(&self, atm_id: u32, new_pin: &str) -> Result<()>;
    async fn atm_logs(&self, atm_id: u32) -> Result<Vec<AtmLogEntry>>;
}

pub type AuthorityBox = Box<dyn TransactionAuthority>;
