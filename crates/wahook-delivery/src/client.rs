// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for webhook POSTs.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use wahook_core::WahookError;

/// Status and body of one webhook response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

/// Transport used by the delivery worker. `Err` means no response was
/// received (connect failure, timeout); any HTTP status is `Ok`.
#[async_trait]
pub trait WebhookClient: Send + Sync + 'static {
    async fn post(&self, url: &str, body: Bytes) -> Result<WebhookResponse, WahookError>;
}

/// `reqwest`-backed client sending `Content-Type: application/json`.
#[derive(Debug, Clone)]
pub struct ReqwestWebhookClient {
    client: reqwest::Client,
}

impl ReqwestWebhookClient {
    pub fn new(timeout: Duration) -> Result<Self, WahookError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| WahookError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookClient for ReqwestWebhookClient {
    async fn post(&self, url: &str, body: Bytes) -> Result<WebhookResponse, WahookError> {
        let response = self
            .client
            .post(url)
            .body(body)
            .send()
            .await
            .map_err(|e| WahookError::Delivery {
                message: format!("failed to send request: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<failed to read response: {e}>"),
        };
        Ok(WebhookResponse { status, body })
    }
}
