// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session runtime trait: the live chat-protocol connection for one instance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::WahookError;
use crate::event::{MediaMessage, WaMessage};
use crate::jid::Jid;
use crate::types::{
    ChatPresence, ChatPresenceMedia, MediaKind, NumberLookup, Presence, ProfilePicture,
    ReceiptType, SendReceipt, UploadedMedia,
};

/// Capability surface of a live protocol session.
///
/// Implementations own pairing, encryption and transport. The gateway only
/// issues commands and consumes the event stream handed over at connect time.
#[async_trait]
pub trait SessionRuntime: Send + Sync + 'static {
    /// Sends a message and returns its id and server timestamp.
    async fn send_message(&self, to: &Jid, message: WaMessage) -> Result<SendReceipt, WahookError>;

    /// Uploads media for a later send.
    async fn upload(&self, bytes: Vec<u8>, kind: MediaKind) -> Result<UploadedMedia, WahookError>;

    /// Downloads and decrypts an attachment into `file`.
    async fn download_to_file(
        &self,
        media: &MediaMessage,
        kind: MediaKind,
        file: &mut tokio::fs::File,
    ) -> Result<(), WahookError>;

    /// Sends a receipt of `receipt_type` for `ids` in `chat`.
    async fn mark_read(
        &self,
        ids: &[String],
        timestamp: DateTime<Utc>,
        chat: &Jid,
        sender: &Jid,
        receipt_type: ReceiptType,
    ) -> Result<(), WahookError>;

    async fn send_presence(&self, presence: Presence) -> Result<(), WahookError>;

    async fn send_chat_presence(
        &self,
        chat: &Jid,
        state: ChatPresence,
        media: ChatPresenceMedia,
    ) -> Result<(), WahookError>;

    async fn is_on_whatsapp(&self, numbers: &[String]) -> Result<Vec<NumberLookup>, WahookError>;

    async fn set_chat_archived(&self, chat: &Jid, archived: bool) -> Result<(), WahookError>;

    async fn delete_chat(&self, chat: &Jid) -> Result<(), WahookError>;

    fn is_connected(&self) -> bool;

    fn is_logged_in(&self) -> bool;

    /// Best-effort mapping of a chat id to its `(jid, lid)` string pair.
    /// Either element may be empty when unknown.
    async fn resolve_jid_lid(&self, jid: &Jid) -> (String, String);

    /// Profile picture location, or `None` when the contact has no picture.
    async fn profile_picture(&self, jid: &Jid) -> Result<Option<ProfilePicture>, WahookError>;

    /// Removes the locally persisted device credential, if any.
    async fn delete_device(&self) -> Result<(), WahookError>;
}
