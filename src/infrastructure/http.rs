use crate::domain::account::{Amount, Atm, Customer};
use crate::domain::logs::AtmLogEntry;
use crate::domain::ports::{LoginPayload, Receipt, TransactionAuthority};
use crate::error::{BankError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct LoginRequest<'a> {
    atm_location: &'a str,
    card_name: &'a str,
    pin: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[allow(dead_code)]
    status: String,
    user_type: String,
    customer: Option<Customer>,
    atm: Option<Atm>,
    atm_id: Option<u32>,
}

#[derive(Serialize)]
struct TransactionRequest {
    customer_id: u32,
    atm_id: u32,
    amount: u32,
}

#[derive(Deserialize)]
struct TransactionResponse {
    #[allow(dead_code)]
    status: String,
    new_balance: u32,
    #[serde(default)]
    atm_balance: u32,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct ResetPinRequest<'a> {
    customer_id: u32,
    new_pin: &'a str,
}

#[derive(Serialize)]
struct ResetAtmPinRequest<'a> {
    atm_id: u32,
    new_pin: &'a str,
}

#[derive(Deserialize)]
struct ResetPinResponse {
    #[allow(dead_code)]
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP adapter for the transaction authority.
///
/// Thin by design: one request per engine operation, no retries, no timeouts.
/// A non-2xx answer with a parseable `detail` body becomes `Rejected` with
/// that detail verbatim; everything else on the wire becomes `Transport`.
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "authority request");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BankError::transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn get_json<Resp>(&self, path: &str) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "authority request");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BankError::transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<Resp>(response: reqwest::Response) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| BankError::transport(format!("malformed authority response: {e}")))
        } else {
            match response.json::<ErrorBody>().await {
                Ok(body) => Err(BankError::rejected(body.detail)),
                Err(_) => Err(BankError::transport(format!("authority returned {status}"))),
            }
        }
    }
}

#[async_trait]
impl TransactionAuthority for HttpAuthority {
    async fn login(&self, atm_location: &str, card_name: &str, pin: &str) -> Result<LoginPayload> {
        let response: LoginResponse = self
            .post_json(
                "/login",
                &LoginRequest {
                    atm_location,
                    card_name,
                    pin,
                },
            )
            .await?;

        match response.user_type.as_str() {
            "customer" => match (response.customer, response.atm_id) {
                (Some(customer), Some(atm_id)) => Ok(LoginPayload::Customer { customer, atm_id }),
                _ => Err(BankError::transport(
                    "malformed authority response: customer payload incomplete",
                )),
            },
            "atm" => match response.atm {
                Some(atm) => Ok(LoginPayload::AtmAdmin { atm }),
                None => Err(BankError::transport(
                    "malformed authority response: atm payload missing",
                )),
            },
            other => Err(BankError::transport(format!(
                "malformed authority response: unknown user_type {other:?}"
            ))),
        }
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.get_json("/customers").await
    }

    async fn list_atms(&self) -> Result<Vec<Atm>> {
        self.get_json("/atms").await
    }

    async fn withdraw(&self, customer_id: u32, atm_id: u32, amount: Amount) -> Result<Receipt> {
        let response: TransactionResponse = self
            .post_json(
                "/withdraw",
                &TransactionRequest {
                    customer_id,
                    atm_id,
                    amount: amount.value(),
                },
            )
            .await?;
        Ok(Receipt {
            new_balance: response.new_balance,
            atm_cash: response.atm_balance,
            message: response.message,
        })
    }

    async fn deposit(&self, customer_id: u32, atm_id: u32, amount: Amount) -> Result<Receipt> {
        let response: TransactionResponse = self
            .post_json(
                "/deposit",
                &TransactionRequest {
                    customer_id,
                    atm_id,
                    amount: amount.value(),
                },
            )
            .await?;
        Ok(Receipt {
            new_balance: response.new_balance,
            atm_cash: response.atm_balance,
            message: response.message,
        })
    }

    async fn reset_customer_pin(&self, customer_id: u32, new_pin: &str) -> Result<String> {
        let response: ResetPinResponse = self
            .post_json(
                "/reset-pin",
                &ResetPinRequest {
                    customer_id,
                    new_pin,
                },
            )
            .await?;
        Ok(response.message)
    }

    async fn reset_atm_pin(&self, atm_id: u32, new_pin: &str) -> Result<()> {
        let _: ResetPinResponse = self
            .post_json("/atm/reset-pin", &ResetAtmPinRequest { atm_id, new_pin })
            .await?;
        Ok(())
    }

    async fn atm_logs(&self, atm_id: u32) -> Result<Vec<AtmLogEntry>> {
        self.get_json(&format!("/atm/{atm_id}/logs")).await
    }
}
