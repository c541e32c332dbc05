use crate::domain::account::{Amount, Atm, Customer, CustomerStatus};
use crate::domain::limits::{DAILY_CEILING, DAILY_WITHDRAWAL_COUNT, PER_TRANSACTION_CEILING};
use crate::domain::logs::AtmLogEntry;
use crate::domain::ports::{LoginPayload, Receipt, TransactionAuthority};
use crate::error::{BankError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

struct CustomerRecord {
    customer: Customer,
    pin: String,
}

struct AtmRecord {
    atm: Atm,
    card_name: String,
    pin: String,
}

struct LedgerRow {
    atm_id: u32,
    entry: AtmLogEntry,
}

#[derive(Default)]
struct State {
    customers: Vec<CustomerRecord>,
    atms: Vec<AtmRecord>,
    ledger: Vec<LedgerRow>,
}

/// A complete in-process simulation of the transaction authority.
///
/// Implements the authority's full rule set (status checks, both withdrawal
/// ceilings, the daily count, cash-reserve refills and the reset-PIN counter
/// decrement) so engine tests and `--offline` runs exercise the same verdicts
/// a live server would return. Credentials are plaintext seeds; real PIN
/// verification is outside this crate's scope.
#[derive(Clone)]
pub struct InMemoryAuthority {
    state: Arc<RwLock<State>>,
}

impl InMemoryAuthority {
    /// The canonical seeded world: two ATMs and five customers, one disabled
    /// and one credit-only.
    pub fn seeded() -> Self {
        let customers = [
            ("Tom", "tom", 20, CustomerStatus::Active),
            ("Jerry", "jerry", 16, CustomerStatus::Active),
            ("Chhota Bheem", "bheem", 22, CustomerStatus::Active),
            ("Kirmada", "kirmada", 0, CustomerStatus::Disabled),
            ("Little Singham", "little", 0, CustomerStatus::CreditOnly),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, card_name, balance, status))| CustomerRecord {
            customer: Customer {
                id: i as u32 + 1,
                name: name.to_string(),
                card_name: card_name.to_string(),
                balance,
                status,
            },
            pin: "1234".to_string(),
        })
        .collect();

        let atms = [("Indiranagar", "INDIRA"), ("Malnad", "MALNAD")]
            .into_iter()
            .enumerate()
            .map(|(i, (location, card_name))| AtmRecord {
                atm: Atm {
                    id: i as u32 + 1,
                    location: location.to_string(),
                    current_cash: 5000,
                },
                card_name: card_name.to_string(),
                pin: "0000".to_string(),
            })
            .collect();

        Self {
            state: Arc::new(RwLock::new(State {
                customers,
                atms,
                ledger: Vec::new(),
            })),
        }
    }

    /// Rewrites one ATM's cash reserve. Test hook for out-of-cash scenarios.
    pub async fn set_atm_cash(&self, atm_id: u32, cash: u32) {
        let mut state = self.state.write().await;
        if let Some(record) = state.atms.iter_mut().find(|r| r.atm.id == atm_id) {
            record.atm.current_cash = cash;
        }
    }
}

fn withdrawn_today(state: &State, customer_id: u32) -> (u32, usize) {
    let today = Utc::now().date_naive();
    state
        .ledger
        .iter()
        .filter(|row| {
            row.entry.customer_id == customer_id && row.entry.timestamp.date_naive() == today
        })
        .fold((0, 0), |(total, count), row| {
            (total + row.entry.amount_withdrawn, count + 1)
        })
}

#[async_trait]
impl TransactionAuthority for InMemoryAuthority {
    async fn login(&self, atm_location: &str, card_name: &str, pin: &str) -> Result<LoginPayload> {
        let state = self.state.read().await;
        let atm = state
            .atms
            .iter()
            .find(|r| r.atm.location == atm_location)
            .ok_or_else(|| BankError::rejected("ATM not found"))?;

        // Customer cards take precedence; the ATM's own card is the admin
        // fallback.
        if let Some(customer) = state
            .customers
            .iter()
            .find(|r| r.customer.card_name == card_name && r.pin == pin)
        {
            return Ok(LoginPayload::Customer {
                customer: customer.customer.clone(),
                atm_id: atm.atm.id,
            });
        }

        if atm.card_name == card_name && atm.pin == pin {
            return Ok(LoginPayload::AtmAdmin {
                atm: atm.atm.clone(),
            });
        }

        Err(BankError::rejected("Invalid card or PIN"))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let state = self.state.read().await;
        Ok(state.customers.iter().map(|r| r.customer.clone()).collect())
    }

    async fn list_atms(&self) -> Result<Vec<Atm>> {
        let state = self.state.read().await;
        Ok(state.atms.iter().map(|r| r.atm.clone()).collect())
    }

    async fn withdraw(&self, customer_id: u32, atm_id: u32, amount: Amount) -> Result<Receipt> {
        let mut state = self.state.write().await;
        let amount = amount.value();

        let customer_idx = state
            .customers
            .iter()
            .position(|r| r.customer.id == customer_id)
            .ok_or_else(|| BankError::rejected("User not found"))?;

        match state.customers[customer_idx].customer.status {
            CustomerStatus::Disabled => return Err(BankError::rejected("Access Denied")),
            CustomerStatus::CreditOnly => return Err(BankError::rejected("Only credit")),
            CustomerStatus::Active => {}
        }

        if amount > PER_TRANSACTION_CEILING {
            return Err(BankError::rejected(format!(
                "Max {PER_TRANSACTION_CEILING} CKB per transaction"
            )));
        }

        let (total_today, count_today) = withdrawn_today(&state, customer_id);
        if total_today + amount > DAILY_CEILING {
            return Err(BankError::rejected(format!("Max {DAILY_CEILING} CKB per day")));
        }
        if count_today >= DAILY_WITHDRAWAL_COUNT {
            return Err(BankError::rejected(format!(
                "Max {DAILY_WITHDRAWAL_COUNT} transactions per day"
            )));
        }

        let atm_idx = state
            .atms
            .iter()
            .position(|r| r.atm.id == atm_id)
            .ok_or_else(|| BankError::rejected("ATM not found"))?;

        if state.customers[customer_idx].customer.balance < amount {
            return Err(BankError::rejected("Insufficient funds"));
        }
        if state.atms[atm_idx].atm.current_cash < amount {
            return Err(BankError::rejected("ATM Out of Cash"));
        }

        state.customers[customer_idx].customer.balance -= amount;
        state.atms[atm_idx].atm.current_cash -= amount;

        let entry = AtmLogEntry {
            timestamp: Utc::now(),
            customer_id,
            amount_withdrawn: amount,
            customer_total_balance: state.customers[customer_idx].customer.balance,
            atm_current_cash: state.atms[atm_idx].atm.current_cash,
        };
        state.ledger.push(LedgerRow { atm_id, entry });

        // Reserve refill rules carried over from the authority.
        let atm = &mut state.atms[atm_idx].atm;
        if atm.location == "Indiranagar" && atm.current_cash < 25 {
            atm.current_cash += 75;
        } else if atm.location == "Malnad" && atm.current_cash < 10 {
            atm.current_cash += 40;
        }

        Ok(Receipt {
            new_balance: state.customers[customer_idx].customer.balance,
            atm_cash: state.atms[atm_idx].atm.current_cash,
            message: "Withdrawal successful".to_string(),
        })
    }

    async fn deposit(&self, customer_id: u32, atm_id: u32, amount: Amount) -> Result<Receipt> {
        let mut state = self.state.write().await;
        let amount = amount.value();

        let customer_idx = state
            .customers
            .iter()
            .position(|r| r.customer.id == customer_id)
            .ok_or_else(|| BankError::rejected("User not found"))?;
        if state.customers[customer_idx].customer.status == CustomerStatus::Disabled {
            return Err(BankError::rejected("Access Denied"));
        }

        let atm_idx = state
            .atms
            .iter()
            .position(|r| r.atm.id == atm_id)
            .ok_or_else(|| BankError::rejected("ATM not found"))?;

        // Both credits are checked before either is written, so an oversized
        // deposit cannot be half-applied.
        let new_balance = state.customers[customer_idx]
            .customer
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::rejected("Deposit exceeds account limit"))?;
        let new_cash = state.atms[atm_idx]
            .atm
            .current_cash
            .checked_add(amount)
            .ok_or_else(|| BankError::rejected("Deposit exceeds ATM capacity"))?;
        state.customers[customer_idx].customer.balance = new_balance;
        state.atms[atm_idx].atm.current_cash = new_cash;

        Ok(Receipt {
            new_balance: state.customers[customer_idx].customer.balance,
            atm_cash: state.atms[atm_idx].atm.current_cash,
            message: "Deposit successful".to_string(),
        })
    }

    async fn reset_customer_pin(&self, customer_id: u32, new_pin: &str) -> Result<String> {
        let mut state = self.state.write().await;

        let customer_idx = state
            .customers
            .iter()
            .position(|r| r.customer.id == customer_id)
            .ok_or_else(|| BankError::rejected("User not found"))?;

        state.customers[customer_idx].pin = new_pin.to_string();
        state.customers[customer_idx].customer.status = CustomerStatus::Active;

        // The documented daily-counter decrement: drop the customer's most
        // recent ledger row of the day. The ledger is append-only, so the
        // last matching index is the most recent.
        let today = Utc::now().date_naive();
        let last_today = state.ledger.iter().rposition(|row| {
            row.entry.customer_id == customer_id && row.entry.timestamp.date_naive() == today
        });
        if let Some(idx) = last_today {
            state.ledger.remove(idx);
            Ok("Daily transaction count decremented".to_string())
        } else {
            Ok("No transactions to reset today".to_string())
        }
    }

    async fn reset_atm_pin(&self, atm_id: u32, new_pin: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let atm = state
            .atms
            .iter_mut()
            .find(|r| r.atm.id == atm_id)
            .ok_or_else(|| BankError::rejected("ATM not found"))?;
        atm.pin = new_pin.to_string();
        Ok(())
    }

    async fn atm_logs(&self, atm_id: u32) -> Result<Vec<AtmLogEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<AtmLogEntry> = state
            .ledger
            .iter()
            .filter(|row| row.atm_id == atm_id)
            .map(|row| row.entry.clone())
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}
