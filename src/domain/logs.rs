use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of an ATM's withdrawal ledger, as produced by the authority.
///
/// Balances are snapshots taken right after the withdrawal settled; entries
/// are never mutated locally.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct AtmLogEntry {
    pub timestamp: DateTime<Utc>,
    pub customer_id: u32,
    pub amount_withdrawn: u32,
    pub customer_total_balance: u32,
    pub atm_current_cash: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_deserialization() {
        let json = r#"{
            "timestamp": "2026-08-26T10:15:00Z",
            "customer_id": 1,
            "amount_withdrawn": 5,
            "customer_total_balance": 15,
            "atm_current_cash": 4995
        }"#;
        let entry: AtmLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.customer_id, 1);
        assert_eq!(entry.amount_withdrawn, 5);
        assert_eq!(entry.atm_current_cash, 4995);
    }
}
