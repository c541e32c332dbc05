use crate::domain::account::{Atm, Customer};
use crate::error::{BankError, Result};

/// The role attached to an authenticated session.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    Customer,
    AtmAdmin,
}

/// The session state machine.
///
/// Exactly one snapshot is populated per authenticated state, so the "role
/// and snapshot must agree" invariant holds by construction. There is no
/// direct transition between the two authenticated states; switching roles
/// requires passing through `LoggedOut`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum Session {
    #[default]
    LoggedOut,
    Customer {
        customer: Customer,
        atm_id: u32,
    },
    Admin {
        atm: Atm,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::LoggedOut)
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Self::LoggedOut => None,
            Self::Customer { .. } => Some(Role::Customer),
            Self::Admin { .. } => Some(Role::AtmAdmin),
        }
    }

    /// The ATM terminal this session operates through, regardless of role.
    pub fn atm_of_operation(&self) -> Option<u32> {
        match self {
            Self::LoggedOut => None,
            Self::Customer { atm_id, .. } => Some(*atm_id),
            Self::Admin { atm } => Some(atm.id),
        }
    }

    pub fn customer(&self) -> Option<&Customer> {
        match self {
            Self::Customer { customer, .. } => Some(customer),
            _ => None,
        }
    }

    pub fn admin_atm(&self) -> Option<&Atm> {
        match self {
            Self::Admin { atm } => Some(atm),
            _ => None,
        }
    }

    /// LoggedOut → CustomerSession. Rejected from any authenticated state.
    pub fn begin_customer(&mut self, customer: Customer, atm_id: u32) -> Result<()> {
        self.ensure_logged_out()?;
        *self = Self::Customer { customer, atm_id };
        Ok(())
    }

    /// LoggedOut → AdminSession. Rejected from any authenticated state.
    pub fn begin_admin(&mut self, atm: Atm) -> Result<()> {
        self.ensure_logged_out()?;
        *self = Self::Admin { atm };
        Ok(())
    }

    /// The sole terminal-to-initial transition: unconditionally clears every
    /// session field, whatever the prior role.
    pub fn end(&mut self) {
        *self = Self::LoggedOut;
    }

    /// Writes an authoritative balance into the cached customer snapshot,
    /// but only when the response still belongs to the active session.
    ///
    /// A response that lands after a logout or a role switch must not clobber
    /// whoever is logged in now; the customer id comparison is that guard.
    /// Returns whether the write was applied.
    pub fn apply_balance(&mut self, customer_id: u32, new_balance: u32) -> bool {
        match self {
            Self::Customer { customer, .. } if customer.id == customer_id => {
                customer.balance = new_balance;
                true
            }
            _ => false,
        }
    }

    fn ensure_logged_out(&self) -> Result<()> {
        if self.is_authenticated() {
            Err(BankError::validation(
                "A session is already active; log out first",
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::CustomerStatus;

    fn tom() -> Customer {
        Customer {
            id: 1,
            name: "Tom".to_string(),
            card_name: "tom".to_string(),
            balance: 20,
            status: CustomerStatus::Active,
        }
    }

    fn indiranagar() -> Atm {
        Atm {
            id: 1,
            location: "Indiranagar".to_string(),
            current_cash: 5000,
        }
    }

    #[test]
    fn test_customer_login_populates_only_customer_snapshot() {
        let mut session = Session::default();
        session.begin_customer(tom(), 1).unwrap();
        assert_eq!(session.role(), Some(Role::Customer));
        assert!(session.customer().is_some());
        assert!(session.admin_atm().is_none());
        assert_eq!(session.atm_of_operation(), Some(1));
    }

    #[test]
    fn test_admin_login_populates_only_atm_snapshot() {
        let mut session = Session::default();
        session.begin_admin(indiranagar()).unwrap();
        assert_eq!(session.role(), Some(Role::AtmAdmin));
        assert!(session.customer().is_none());
        assert!(session.admin_atm().is_some());
        assert_eq!(session.atm_of_operation(), Some(1));
    }

    #[test]
    fn test_no_direct_role_switch() {
        let mut session = Session::default();
        session.begin_customer(tom(), 1).unwrap();
        assert!(session.begin_admin(indiranagar()).is_err());
        // Must pass through LoggedOut.
        session.end();
        assert!(session.begin_admin(indiranagar()).is_ok());
    }

    #[test]
    fn test_logout_always_clears() {
        let mut session = Session::default();
        session.begin_admin(indiranagar()).unwrap();
        session.end();
        assert_eq!(session, Session::LoggedOut);
        assert!(!session.is_authenticated());
        assert_eq!(session.atm_of_operation(), None);
    }

    #[test]
    fn test_apply_balance_matching_customer() {
        let mut session = Session::default();
        session.begin_customer(tom(), 1).unwrap();
        assert!(session.apply_balance(1, 15));
        assert_eq!(session.customer().unwrap().balance, 15);
    }

    #[test]
    fn test_apply_balance_discards_stale_response() {
        let mut session = Session::default();
        session.begin_customer(tom(), 1).unwrap();
        // A response tagged with a different customer id must not land.
        assert!(!session.apply_balance(2, 999));
        assert_eq!(session.customer().unwrap().balance, 20);

        // Nor may it land after logout.
        session.end();
        assert!(!session.apply_balance(1, 999));
        assert_eq!(session, Session::LoggedOut);
    }
}
