//! HTTP trend provider
//!
//! Authenticated JSON client for the remote balance API. Handles bearer
//! auth, query building, response decoding, and sign normalization at
//! ingestion. Pacing and retry live in the fetch layer, not here.

use chrono::NaiveDate;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ApiSettings;
use crate::model::{Account, AccountKind, BalanceEntry, ReportKind, TrendFilter, TrendType};
use crate::windows::Window;

use super::traits::{ProviderError, ProviderResult, TrendProvider};
use async_trait::async_trait;

/// HTTP implementation of [`TrendProvider`].
pub struct HttpTrendProvider {
    client: Client,
    base_url: String,
}

impl HttpTrendProvider {
    /// Create a provider from API settings.
    pub fn new(settings: &ApiSettings) -> ProviderResult<Self> {
        if settings.token.is_empty() {
            return Err(ProviderError::Configuration(
                "API token is not set".to_string(),
            ));
        }

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|e| ProviderError::Configuration(format!("Invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(settings.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} ({} params)", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::Connection(e.to_string())
                } else {
                    ProviderError::Request(e.to_string())
                }
            })?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            return Err(ProviderError::RateLimited(format!(
                "retry after {retry_after}s"
            )));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Authentication(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ProviderError::Request(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("Failed to parse response: {e}")))
    }

    fn report_kind_param(kind: ReportKind) -> &'static str {
        match kind {
            ReportKind::AssetsTime => "ASSETS_TIME",
            ReportKind::DebtsTime => "DEBTS_TIME",
            ReportKind::IncomeTime => "INCOME_TIME",
            ReportKind::SpendingTime => "SPENDING_TIME",
            ReportKind::NetIncome => "NET_INCOME",
            ReportKind::NetWorth => "NET_WORTH",
        }
    }
}

#[async_trait]
impl TrendProvider for HttpTrendProvider {
    async fn fetch_accounts(&self, offset: usize, limit: usize) -> ProviderResult<Vec<Account>> {
        let params = [
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        let response: AccountsResponse = self.get_json("/accounts", &params).await?;

        Ok(response
            .accounts
            .into_iter()
            .map(|a| Account {
                id: a.id,
                name: a.name,
                kind: a.kind,
            })
            .collect())
    }

    async fn fetch_trends(
        &self,
        report_kind: ReportKind,
        filter: &TrendFilter,
        window: &Window,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Option<Vec<BalanceEntry>>> {
        let mut params = vec![
            ("reportType", Self::report_kind_param(report_kind).to_string()),
            ("startDate", window.start.to_string()),
            ("endDate", window.end.to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        if !filter.account_ids.is_empty() {
            params.push(("accountIds", filter.account_ids.join(",")));
        }
        if !filter.deselected_account_ids.is_empty() {
            params.push((
                "deselectedAccountIds",
                filter.deselected_account_ids.join(","),
            ));
        }

        let response: TrendsResponse = self.get_json("/trends", &params).await?;

        Ok(response.trend.map(|entries| {
            entries
                .into_iter()
                .map(|e| BalanceEntry::from_reported(e.amount, e.date, e.trend_type))
                .collect()
        }))
    }
}

// Wire types. Sign conventions are normalized when converting to the domain
// model, never here.

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(rename = "Account", default)]
    accounts: Vec<ApiAccount>,
}

#[derive(Debug, Deserialize)]
struct ApiAccount {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: AccountKind,
}

#[derive(Debug, Deserialize)]
struct TrendsResponse {
    /// Absent when the report kind does not apply to the filter or the
    /// request timed out upstream.
    #[serde(rename = "Trend", default)]
    trend: Option<Vec<ApiTrendEntry>>,
}

#[derive(Debug, Deserialize)]
struct ApiTrendEntry {
    amount: f64,
    date: NaiveDate,
    #[serde(rename = "type")]
    trend_type: TrendType,
}
