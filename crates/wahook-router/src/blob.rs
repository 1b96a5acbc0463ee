// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP blob storage: `PUT <base_url>/<name>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use wahook_core::{BlobStorage, WahookError};

/// Uploads objects with a plain HTTP PUT and returns `<base_url>/<name>`.
///
/// Works with any store that accepts PUT uploads at a public prefix
/// (pre-authorised bucket endpoints, simple object gateways).
#[derive(Debug, Clone)]
pub struct HttpBlobStorage {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpBlobStorage {
    pub fn new(base_url: &str, auth_token: Option<String>, timeout: Duration) -> Result<Self, WahookError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WahookError::Storage {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

#[async_trait]
impl BlobStorage for HttpBlobStorage {
    async fn upload(&self, name: &str, mimetype: &str, bytes: Vec<u8>) -> Result<String, WahookError> {
        let url = self.object_url(name);
        let content_type = if mimetype.is_empty() {
            "application/octet-stream"
        } else {
            mimetype
        };

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| WahookError::Storage {
            message: format!("blob upload failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WahookError::Storage {
                message: format!("blob store returned {status}: {body}"),
                source: None,
            });
        }
        Ok(url)
    }
}
