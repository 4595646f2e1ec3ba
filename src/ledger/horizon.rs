//! Horizon REST API Client
//!
//! HTTP client for the Horizon endpoints a vote touches, plus the testnet
//! Friendbot faucet.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::error::{LedgerError, LedgerResult};
use super::{AccountInfo, LedgerApi, PaymentRecord, SubmitResponse, TransactionRecord};

/// Horizon REST API client
pub struct HorizonClient {
    client: Client,
    config: HorizonConfig,
}

/// Configuration for the Horizon client
#[derive(Debug, Clone)]
pub struct HorizonConfig {
    /// Base URL for Horizon (e.g., "https://horizon-testnet.stellar.org")
    pub horizon_url: String,
    /// Friendbot faucet URL, testnet only
    pub friendbot_url: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            horizon_url: "https://horizon-testnet.stellar.org".to_string(),
            friendbot_url: Some("https://friendbot.stellar.org".to_string()),
            request_timeout_ms: 30_000,
        }
    }
}

impl HorizonClient {
    /// Create a new Horizon client with the given configuration
    pub fn new(config: HorizonConfig) -> LedgerResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("MoodPulse/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.horizon_url.trim_end_matches('/'), path)
    }

    /// Create and fund a testnet account through Friendbot
    pub async fn fund_with_friendbot(&self, address: &str) -> LedgerResult<String> {
        let friendbot = self
            .config
            .friendbot_url
            .as_deref()
            .ok_or_else(|| LedgerError::Friendbot("no faucet on this network".to_string()))?;

        let url = format!("{}?addr={}", friendbot, urlencoding::encode(address));
        let response = self.client.get(&url).send().await.map_err(send_error)?;

        if !response.status().is_success() {
            let problem = read_problem(response).await;
            return Err(LedgerError::Friendbot(problem.describe()));
        }

        #[derive(Deserialize)]
        struct Funded {
            #[serde(default)]
            hash: Option<String>,
        }

        let funded: Funded = response
            .json()
            .await
            .map_err(|e| LedgerError::Malformed(e.to_string()))?;

        Ok(funded
            .hash
            .unwrap_or_else(|| "Transaction successful".to_string()))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        not_found: impl FnOnce() -> LedgerError,
    ) -> LedgerResult<T> {
        let response = self.client.get(url).send().await.map_err(send_error)?;

        match response.status() {
            s if s.is_success() => response
                .json()
                .await
                .map_err(|e| LedgerError::Malformed(e.to_string())),
            StatusCode::NOT_FOUND => Err(not_found()),
            status => {
                let problem = read_problem(response).await;
                Err(LedgerError::ApiError {
                    status: status.as_u16(),
                    message: problem.describe(),
                })
            }
        }
    }
}

#[async_trait]
impl LedgerApi for HorizonClient {
    /// Horizon answers its root endpoint
    async fn health_check(&self) -> LedgerResult<()> {
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .map_err(send_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LedgerError::Unavailable)
        }
    }

    async fn load_account(&self, address: &str) -> LedgerResult<AccountInfo> {
        let url = self.url(&format!("/accounts/{}", address));
        self.get_json(&url, || LedgerError::AccountNotFound(address.to_string()))
            .await
    }

    async fn payments_for_account(
        &self,
        address: &str,
        limit: usize,
    ) -> LedgerResult<Vec<PaymentRecord>> {
        let url = self.url(&format!(
            "/accounts/{}/payments?limit={}&order=desc",
            address, limit
        ));
        let page: Page<PaymentRecord> = self
            .get_json(&url, || LedgerError::AccountNotFound(address.to_string()))
            .await?;

        Ok(page.embedded.records)
    }

    async fn transaction(&self, hash: &str) -> LedgerResult<TransactionRecord> {
        let url = self.url(&format!("/transactions/{}", hash));
        self.get_json(&url, || LedgerError::TransactionNotFound(hash.to_string()))
            .await
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> LedgerResult<SubmitResponse> {
        let response = self
            .client
            .post(self.url("/transactions"))
            .form(&[("tx", envelope_xdr)])
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| LedgerError::Malformed(e.to_string()));
        }

        let problem = read_problem(response).await;
        match status {
            StatusCode::GATEWAY_TIMEOUT => Err(LedgerError::Timeout),
            _ => match problem.result_codes() {
                Some((transaction_code, operation_codes)) => Err(LedgerError::Rejected {
                    transaction_code,
                    operation_codes,
                }),
                None => Err(LedgerError::ApiError {
                    status: status.as_u16(),
                    message: problem.describe(),
                }),
            },
        }
    }
}

fn send_error(e: reqwest::Error) -> LedgerError {
    if e.is_timeout() {
        LedgerError::Timeout
    } else if e.is_connect() {
        LedgerError::Unavailable
    } else {
        LedgerError::Request(e)
    }
}

async fn read_problem(response: Response) -> Problem {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| Problem {
        title: None,
        detail: if text.is_empty() { None } else { Some(text) },
        extras: None,
    })
}

// ============================================
// Response DTOs
// ============================================

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
}

#[derive(Debug, Deserialize)]
struct Embedded<T> {
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

/// Horizon problem+json body
#[derive(Debug, Deserialize)]
struct Problem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Deserialize)]
struct ProblemExtras {
    #[serde(default)]
    result_codes: Option<ResultCodes>,
}

#[derive(Debug, Deserialize)]
struct ResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Vec<String>,
}

impl Problem {
    fn result_codes(&self) -> Option<(String, Vec<String>)> {
        let codes = self.extras.as_ref()?.result_codes.as_ref()?;
        Some((
            codes.transaction.clone().unwrap_or_default(),
            codes.operations.clone(),
        ))
    }

    fn describe(&self) -> String {
        match (&self.title, &self.detail) {
            (Some(title), Some(detail)) => format!("{}: {}", title, detail),
            (Some(title), None) => title.clone(),
            (None, Some(detail)) => detail.clone(),
            (None, None) => "no details".to_string(),
        }
    }
}
