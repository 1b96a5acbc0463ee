// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock session runtime for deterministic testing.
//!
//! `MockSession` implements `SessionRuntime`, records every command it
//! receives, and can be told to fail specific operations.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use wahook_core::event::{MediaMessage, WaMessage};
use wahook_core::types::{
    ChatPresence, ChatPresenceMedia, MediaKind, NumberLookup, Presence, ProfilePicture,
    ReceiptType, SendReceipt, UploadedMedia,
};
use wahook_core::{Jid, SessionRuntime, WahookError};

/// One command observed by a [`MockSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    SendMessage {
        to: String,
        text: Option<String>,
    },
    Upload {
        len: usize,
        kind: MediaKind,
    },
    Download {
        kind: MediaKind,
        url: String,
    },
    MarkRead {
        ids: Vec<String>,
        chat: String,
        sender: String,
        receipt_type: ReceiptType,
    },
    SendPresence(Presence),
    ChatPresence {
        chat: String,
        state: ChatPresence,
        media: ChatPresenceMedia,
    },
    IsOnWhatsapp(Vec<String>),
    SetArchived {
        chat: String,
        archived: bool,
    },
    DeleteChat(String),
    ProfilePicture(String),
    DeleteDevice,
}

/// A mock session runtime.
///
/// Connected and logged in by default. Operation names accepted by
/// [`MockSession::fail`] match the trait method names (`send_presence`,
/// `download_to_file`, `delete_device`, ...).
pub struct MockSession {
    calls: Mutex<Vec<SessionCall>>,
    failing: Mutex<HashSet<String>>,
    connected: AtomicBool,
    logged_in: AtomicBool,
    media: Mutex<Vec<u8>>,
    pictures: Mutex<HashMap<String, String>>,
    lids: Mutex<HashMap<String, String>>,
    registered: Mutex<HashSet<String>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            connected: AtomicBool::new(true),
            logged_in: AtomicBool::new(true),
            media: Mutex::new(Vec::new()),
            pictures: Mutex::new(HashMap::new()),
            lids: Mutex::new(HashMap::new()),
            registered: Mutex::new(HashSet::new()),
        }
    }

    /// Make the named operation return a session error from now on.
    pub fn fail(&self, op: &str) {
        lock(&self.failing).insert(op.to_string());
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::SeqCst);
    }

    /// Bytes written by `download_to_file`.
    pub fn with_media(self, bytes: impl Into<Vec<u8>>) -> Self {
        *lock(&self.media) = bytes.into();
        self
    }

    /// Profile picture URL reported for `jid`.
    pub fn with_profile_picture(self, jid: &str, url: &str) -> Self {
        lock(&self.pictures).insert(jid.to_string(), url.to_string());
        self
    }

    /// Hidden-user id reported by `resolve_jid_lid` for `jid`.
    pub fn with_lid(self, jid: &str, lid: &str) -> Self {
        lock(&self.lids).insert(jid.to_string(), lid.to_string());
        self
    }

    /// Phone number reported as registered by `is_on_whatsapp`.
    pub fn with_registered(self, number: &str) -> Self {
        lock(&self.registered).insert(number.to_string());
        self
    }

    /// All calls observed so far, in order.
    pub fn calls(&self) -> Vec<SessionCall> {
        lock(&self.calls).clone()
    }

    /// Receipts sent via `mark_read`, as `(ids, receipt_type)`.
    pub fn receipts(&self) -> Vec<(Vec<String>, ReceiptType)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SessionCall::MarkRead {
                    ids, receipt_type, ..
                } => Some((ids, receipt_type)),
                _ => None,
            })
            .collect()
    }

    /// Number of `send_presence` calls.
    pub fn presence_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SessionCall::SendPresence(_)))
            .count()
    }

    fn record(&self, call: SessionCall) {
        lock(&self.calls).push(call);
    }

    fn check(&self, op: &str) -> Result<(), WahookError> {
        if lock(&self.failing).contains(op) {
            Err(WahookError::session(format!("mock {op} failure")))
        } else {
            Ok(())
        }
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SessionRuntime for MockSession {
    async fn send_message(&self, to: &Jid, message: WaMessage) -> Result<SendReceipt, WahookError> {
        self.record(SessionCall::SendMessage {
            to: to.to_string(),
            text: message.conversation.clone(),
        });
        self.check("send_message")?;
        Ok(SendReceipt {
            id: format!("mock-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
        })
    }

    async fn upload(&self, bytes: Vec<u8>, kind: MediaKind) -> Result<UploadedMedia, WahookError> {
        self.record(SessionCall::Upload {
            len: bytes.len(),
            kind,
        });
        self.check("upload")?;
        Ok(UploadedMedia {
            url: "https://mmg.test/upload".into(),
            file_length: bytes.len() as u64,
            ..Default::default()
        })
    }

    async fn download_to_file(
        &self,
        media: &MediaMessage,
        kind: MediaKind,
        file: &mut tokio::fs::File,
    ) -> Result<(), WahookError> {
        self.record(SessionCall::Download {
            kind,
            url: media.url.clone(),
        });
        self.check("download_to_file")?;
        let bytes = lock(&self.media).clone();
        file.write_all(&bytes)
            .await
            .map_err(|e| WahookError::Storage {
                message: "mock download write failed".into(),
                source: Some(Box::new(e)),
            })?;
        file.flush().await.map_err(|e| WahookError::Storage {
            message: "mock download flush failed".into(),
            source: Some(Box::new(e)),
        })
    }

    async fn mark_read(
        &self,
        ids: &[String],
        _timestamp: DateTime<Utc>,
        chat: &Jid,
        sender: &Jid,
        receipt_type: ReceiptType,
    ) -> Result<(), WahookError> {
        self.record(SessionCall::MarkRead {
            ids: ids.to_vec(),
            chat: chat.to_string(),
            sender: sender.to_string(),
            receipt_type,
        });
        self.check("mark_read")
    }

    async fn send_presence(&self, presence: Presence) -> Result<(), WahookError> {
        self.record(SessionCall::SendPresence(presence));
        self.check("send_presence")
    }

    async fn send_chat_presence(
        &self,
        chat: &Jid,
        state: ChatPresence,
        media: ChatPresenceMedia,
    ) -> Result<(), WahookError> {
        self.record(SessionCall::ChatPresence {
            chat: chat.to_string(),
            state,
            media,
        });
        self.check("send_chat_presence")
    }

    async fn is_on_whatsapp(&self, numbers: &[String]) -> Result<Vec<NumberLookup>, WahookError> {
        self.record(SessionCall::IsOnWhatsapp(numbers.to_vec()));
        self.check("is_on_whatsapp")?;
        let registered = lock(&self.registered).clone();
        Ok(numbers
            .iter()
            .map(|n| NumberLookup {
                exists: registered.contains(n),
                jid: Jid::user(n.clone()).to_string(),
                lid: String::new(),
                number: n.clone(),
            })
            .collect())
    }

    async fn set_chat_archived(&self, chat: &Jid, archived: bool) -> Result<(), WahookError> {
        self.record(SessionCall::SetArchived {
            chat: chat.to_string(),
            archived,
        });
        self.check("set_chat_archived")
    }

    async fn delete_chat(&self, chat: &Jid) -> Result<(), WahookError> {
        self.record(SessionCall::DeleteChat(chat.to_string()));
        self.check("delete_chat")
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    async fn resolve_jid_lid(&self, jid: &Jid) -> (String, String) {
        let key = jid.to_non_device().to_string();
        let lid = lock(&self.lids).get(&key).cloned().unwrap_or_default();
        (key, lid)
    }

    async fn profile_picture(&self, jid: &Jid) -> Result<Option<ProfilePicture>, WahookError> {
        self.record(SessionCall::ProfilePicture(jid.to_string()));
        self.check("profile_picture")?;
        Ok(lock(&self.pictures)
            .get(&jid.to_string())
            .map(|url| ProfilePicture {
                url: url.clone(),
                id: "pic-1".into(),
            }))
    }

    async fn delete_device(&self) -> Result<(), WahookError> {
        self.record(SessionCall::DeleteDevice);
        self.check("delete_device")
    }
}
