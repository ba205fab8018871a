//! Client for the spreadsheet-backed store that persists both lists.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::{
    domain::{ListKind, Record},
    error::ApiError,
    protocol::{StoreRequest, StoreResponse},
};
use tracing::{debug, warn};
use url::Url;

use crate::config::Settings;

// The script host cannot answer a CORS preflight, so JSON goes out as plain text.
const MUTATE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self, kind: ListKind) -> Result<Vec<Record>, ApiError>;
    /// Resolves to `Ok` only when the store confirmed the write with `status: success`.
    async fn mutate(&self, request: &StoreRequest) -> Result<StoreResponse, ApiError>;
}

pub struct StoreClient {
    http: Client,
    endpoint: Url,
}

impl StoreClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_http(Client::new(), endpoint)
    }

    pub fn with_http(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self::with_http(http, settings.store_endpoint()?))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteStore for StoreClient {
    async fn list(&self, kind: ListKind) -> Result<Vec<Record>, ApiError> {
        debug!(sheet = kind.sheet_name(), "fetching list from store");
        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[("sheet", kind.sheet_name())])
            .send()
            .await
            .map_err(|e| ApiError::network(format!("failed to fetch {kind} data: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::network(format!(
                "failed to fetch {kind} data: HTTP {status}"
            )));
        }

        res.json::<Vec<Record>>()
            .await
            .map_err(|e| ApiError::malformed(format!("unreadable {kind} data: {e}")))
    }

    async fn mutate(&self, request: &StoreRequest) -> Result<StoreResponse, ApiError> {
        let body = serde_json::to_string(request)
            .map_err(|e| ApiError::malformed(format!("failed to encode request: {e}")))?;
        debug!(
            action = request.action(),
            record_id = request.record_id().0,
            "posting store mutation"
        );

        let res = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, MUTATE_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::network(format!("store request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res
                .text()
                .await
                .unwrap_or_else(|_| "could not read error response".to_string());
            warn!(action = request.action(), %status, "store rejected request: {error_text}");
            return Err(ApiError::network(format!(
                "database operation failed with status: {}",
                status.as_u16()
            )));
        }

        let raw = res
            .text()
            .await
            .map_err(|e| ApiError::network(format!("failed to read store response: {e}")))?;
        let response: StoreResponse = serde_json::from_str(&raw)
            .map_err(|e| ApiError::malformed(format!("unreadable store response: {e}")))?;

        if !response.is_success() {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| "no message".to_string());
            return Err(ApiError::rejected(format!(
                "database operation reported an error: {message}"
            )));
        }

        Ok(response)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
