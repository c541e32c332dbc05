use crate::application::feedback::Feedback;
use crate::domain::account::{Atm, Customer};
use crate::domain::limits;
use crate::domain::logs::AtmLogEntry;
use crate::domain::ports::{AuthorityBox, LoginPayload};
use crate::domain::session::Session;
use crate::error::{BankError, Result};

/// Read-only snapshot of every customer and ATM record, refreshed on demand.
///
/// A failed refresh leaves the previous snapshot in place: stale-but-available
/// beats empty for a kiosk selection view.
#[derive(Debug, Default, Clone)]
pub struct Directory {
    pub customers: Vec<Customer>,
    pub atms: Vec<Atm>,
}

/// The session & transaction state engine behind a kiosk terminal.
///
/// `KioskEngine` owns the authenticated session, the display caches and the
/// port to the external transaction authority. It is the single writer of all
/// of them; handlers call its `&mut self` methods one at a time, so no lock is
/// needed. Optimistic local updates are reconciled against authoritative
/// responses, with a customer-id guard discarding responses that outlive the
/// session they were issued for.
pub struct KioskEngine {
    authority: AuthorityBox,
    session: Session,
    directory: Directory,
    atm_logs: Vec<AtmLogEntry>,
}

impl KioskEngine {
    pub fn new(authority: AuthorityBox) -> Self {
        Self {
            authority,
            session: Session::default(),
            directory: Directory::default(),
            atm_logs: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Cached ATM ledger for the admin role, newest entry first.
    pub fn atm_logs(&self) -> &[AtmLogEntry] {
        &self.atm_logs
    }

    /// Authenticates at an ATM terminal as either a customer or the ATM
    /// itself (admin role). The authority decides which; the session is
    /// populated from its role-tagged payload.
    pub async fn login(
        &mut self,
        atm_location: &str,
        card_name: &str,
        pin: &str,
    ) -> Result<Feedback> {
        if atm_location.is_empty() || card_name.is_empty() || pin.is_empty() {
            return Err(BankError::validation(
                "Location, card name and PIN are all required",
            ));
        }
        if self.session.is_authenticated() {
            return Err(BankError::validation(
                "A session is already active; log out first",
            ));
        }

        match self.authority.login(atm_location, card_name, pin).await? {
            LoginPayload::Customer { customer, atm_id } => {
                let name = customer.name.clone();
                self.session.begin_customer(customer, atm_id)?;
                Ok(Feedback::success(format!("Welcome back, {name}!")))
            }
            LoginPayload::AtmAdmin { atm } => {
                let location = atm.location.clone();
                self.session.begin_admin(atm)?;
                Ok(Feedback::success(format!(
                    "ATM admin session open at {location}"
                )))
            }
        }
    }

    /// Unconditionally returns the session to its initial state, clearing the
    /// role, both snapshots and the cached ledger view.
    pub fn logout(&mut self) -> Feedback {
        self.session.end();
        self.atm_logs.clear();
        Feedback::info("Logged out")
    }

    /// Withdraws CKB at the session's terminal.
    ///
    /// The validator gates the request locally before the authority is asked;
    /// on success the reported `new_balance` is written back through the
    /// session's stale-response guard.
    pub async fn withdraw(&mut self, amount: u32) -> Result<Feedback> {
        let (customer_id, atm_id) = self.customer_context()?;
        let amount = limits::validate_withdrawal(amount)?;

        let receipt = self.authority.withdraw(customer_id, atm_id, amount).await?;
        if !self.session.apply_balance(customer_id, receipt.new_balance) {
            tracing::warn!(customer_id, "discarding withdrawal response for ended session");
            return Ok(Feedback::info("Session changed; result discarded"));
        }
        Ok(Feedback::success(format!(
            "Withdrew {} CKB. New balance: {} CKB",
            amount.value(),
            receipt.new_balance
        )))
    }

    /// Deposits CKB. No client-side ceiling; any positive amount is deferred
    /// to the authority.
    pub async fn deposit(&mut self, amount: u32) -> Result<Feedback> {
        let (customer_id, atm_id) = self.customer_context()?;
        let amount = limits::validate_deposit(amount)?;

        let receipt = self.authority.deposit(customer_id, atm_id, amount).await?;
        if !self.session.apply_balance(customer_id, receipt.new_balance) {
            tracing::warn!(customer_id, "discarding deposit response for ended session");
            return Ok(Feedback::info("Session changed; result discarded"));
        }
        Ok(Feedback::success(format!(
            "Deposited {} CKB. New balance: {} CKB",
            amount.value(),
            receipt.new_balance
        )))
    }

    /// Resets the logged-in customer's PIN. The four-digit and confirmation
    /// checks run locally; the status flip back to `Active` and the daily
    /// counter decrement are the authority's side effects, observed on the
    /// next directory read rather than re-derived here.
    pub async fn reset_pin(&mut self, new_pin: &str, confirm_pin: &str) -> Result<Feedback> {
        let (customer_id, _) = self.customer_context()?;
        limits::validate_new_pin(new_pin, confirm_pin)?;

        let message = self
            .authority
            .reset_customer_pin(customer_id, new_pin)
            .await?;
        Ok(Feedback::success(message))
    }

    /// Admin counterpart: resets the PIN of the ATM this session logged in
    /// through. Same local gate as the customer flow.
    pub async fn reset_atm_pin(&mut self, new_pin: &str, confirm_pin: &str) -> Result<Feedback> {
        let atm_id = self
            .session
            .admin_atm()
            .map(|atm| atm.id)
            .ok_or_else(|| BankError::validation("Admin session required"))?;
        limits::validate_new_pin(new_pin, confirm_pin)?;

        self.authority.reset_atm_pin(atm_id, new_pin).await?;
        Ok(Feedback::success("ATM PIN updated"))
    }

    /// Unconditional full-snapshot refresh of the customer and ATM rosters.
    /// On failure nothing is written, so callers keep whatever they had.
    pub async fn refresh_directory(&mut self) -> Result<Feedback> {
        let (customers, atms) = match self.fetch_directory().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "directory refresh failed; keeping cached snapshot");
                return Err(err);
            }
        };
        self.directory.customers = customers;
        self.directory.atms = atms;
        Ok(Feedback::info(format!(
            "Directory refreshed: {} customers, {} ATMs",
            self.directory.customers.len(),
            self.directory.atms.len()
        )))
    }

    async fn fetch_directory(&self) -> Result<(Vec<Customer>, Vec<Atm>)> {
        let customers = self.authority.list_customers().await?;
        let atms = self.authority.list_atms().await?;
        Ok((customers, atms))
    }

    /// Fetches the withdrawal ledger of the admin's own ATM, cached newest
    /// first. Admin role only.
    pub async fn refresh_atm_logs(&mut self) -> Result<Feedback> {
        let atm_id = self
            .session
            .admin_atm()
            .map(|atm| atm.id)
            .ok_or_else(|| BankError::validation("Admin session required"))?;

        let mut entries = match self.authority.atm_logs(atm_id).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(atm_id, error = %err, "ledger refresh failed; keeping cached view");
                return Err(err);
            }
        };
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.atm_logs = entries;
        Ok(Feedback::info(format!(
            "{} ledger entries",
            self.atm_logs.len()
        )))
    }

    fn customer_context(&self) -> Result<(u32, u32)> {
        match (self.session.customer(), self.session.atm_of_operation()) {
            (Some(customer), Some(atm_id)) => Ok((customer.id, atm_id)),
            _ => Err(BankError::validation("Customer session required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Role;
    use crate::infrastructure::in_memory::InMemoryAuthority;

    fn engine() -> KioskEngine {
        KioskEngine::new(Box::new(InMemoryAuthority::seeded()))
    }

    #[tokio::test]
    async fn test_login_requires_all_fields() {
        let mut engine = engine();
        let result = engine.login("Indiranagar", "", "1234").await;
        assert!(matches!(result, Err(BankError::Validation(_))));
        assert!(!engine.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_populates_customer_session() {
        let mut engine = engine();
        engine.login("Indiranagar", "tom", "1234").await.unwrap();
        assert_eq!(engine.session().role(), Some(Role::Customer));
        assert_eq!(engine.session().customer().unwrap().balance, 20);
        assert!(engine.session().admin_atm().is_none());
    }

    #[tokio::test]
    async fn test_second_login_needs_logout_first() {
        let mut engine = engine();
        engine.login("Indiranagar", "tom", "1234").await.unwrap();
        let result = engine.login("Indiranagar", "INDIRA", "0000").await;
        assert!(matches!(result, Err(BankError::Validation(_))));

        engine.logout();
        engine.login("Indiranagar", "INDIRA", "0000").await.unwrap();
        assert_eq!(engine.session().role(), Some(Role::AtmAdmin));
    }

    #[tokio::test]
    async fn test_withdraw_updates_cached_balance() {
        let mut engine = engine();
        engine.login("Indiranagar", "tom", "1234").await.unwrap();
        engine.withdraw(5).await.unwrap();
        assert_eq!(engine.session().customer().unwrap().balance, 15);
    }

    #[tokio::test]
    async fn test_withdraw_requires_customer_session() {
        let mut engine = engine();
        assert!(matches!(
            engine.withdraw(5).await,
            Err(BankError::Validation(_))
        ));

        engine.login("Indiranagar", "INDIRA", "0000").await.unwrap();
        assert!(matches!(
            engine.withdraw(5).await,
            Err(BankError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_cached_logs() {
        let mut engine = engine();
        engine.login("Indiranagar", "INDIRA", "0000").await.unwrap();
        engine.refresh_atm_logs().await.unwrap();
        engine.logout();
        assert_eq!(engine.session(), &Session::LoggedOut);
        assert!(engine.atm_logs().is_empty());
    }

    struct DownAuthority;

    #[async_trait::async_trait]
    impl crate::domain::ports::TransactionAuthority for DownAuthority {
        async fn login(
            &self,
            _: &str,
            _: &str,
            _: &str,
        ) -> Result<crate::domain::ports::LoginPayload> {
            Err(BankError::transport("connection refused"))
        }
        async fn list_customers(&self) -> Result<Vec<Customer>> {
            Err(BankError::transport("connection refused"))
        }
        async fn list_atms(&self) -> Result<Vec<Atm>> {
            Err(BankError::transport("connection refused"))
        }
        async fn withdraw(
            &self,
            _: u32,
            _: u32,
            _: crate::domain::account::Amount,
        ) -> Result<crate::domain::ports::Receipt> {
            Err(BankError::transport("connection refused"))
        }
        async fn deposit(
            &self,
            _: u32,
            _: u32,
            _: crate::domain::account::Amount,
        ) -> Result<crate::domain::ports::Receipt> {
            Err(BankError::transport("connection refused"))
        }
        async fn reset_customer_pin(&self, _: u32, _: &str) -> Result<String> {
            Err(BankError::transport("connection refused"))
        }
        async fn reset_atm_pin(&self, _: u32, _: &str) -> Result<()> {
            Err(BankError::transport("connection refused"))
        }
        async fn atm_logs(&self, _: u32) -> Result<Vec<AtmLogEntry>> {
            Err(BankError::transport("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_directory_refresh_failure_keeps_stale_data() {
        let mut engine = engine();
        engine.refresh_directory().await.unwrap();
        let cached = engine.directory().customers.len();
        assert!(cached > 0);

        engine.authority = Box::new(DownAuthority);
        assert!(matches!(
            engine.refresh_directory().await,
            Err(BankError::Transport(_))
        ));
        assert_eq!(engine.directory().customers.len(), cached);
    }

    #[tokio::test]
    async fn test_atm_logs_refresh_failure_keeps_stale_view() {
        let mut engine = engine();
        engine.login("Indiranagar", "tom", "1234").await.unwrap();
        engine.withdraw(5).await.unwrap();
        engine.logout();

        engine.login("Indiranagar", "INDIRA", "0000").await.unwrap();
        engine.refresh_atm_logs().await.unwrap();
        assert_eq!(engine.atm_logs().len(), 1);

        // The authority going away must not empty the cached ledger view.
        engine.authority = Box::new(DownAuthority);
        assert!(matches!(
            engine.refresh_atm_logs().await,
            Err(BankError::Transport(_))
        ));
        assert_eq!(engine.atm_logs().len(), 1);
    }
}
