// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock blob storage that captures uploads.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use wahook_core::{BlobStorage, WahookError};

/// One captured upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

/// Blob storage returning `https://blobs.test/<name>` for every upload.
#[derive(Default)]
pub struct MockBlobStorage {
    uploads: Mutex<Vec<Upload>>,
    failing: AtomicBool,
}

impl MockBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl BlobStorage for MockBlobStorage {
    async fn upload(&self, name: &str, mimetype: &str, bytes: Vec<u8>) -> Result<String, WahookError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WahookError::Storage {
                message: "mock upload failure".into(),
                source: None,
            });
        }
        self.uploads
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Upload {
                name: name.to_string(),
                mimetype: mimetype.to_string(),
                bytes,
            });
        Ok(format!("https://blobs.test/{name}"))
    }
}
