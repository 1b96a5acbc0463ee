// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw events produced by a session runtime, before tenant policy is applied.
//!
//! The message model mirrors the protocol's optional-field layout: every
//! content slot is an `Option`, and at most one of them is normally set.
//! Wrapper envelopes (device-sent, ephemeral, view-once, document-with-caption)
//! are peeled off by [`WaMessage::unwrap_raw`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jid::Jid;
use crate::types::{EventKind, ReceiptType};

/// One inbound occurrence from a session runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEvent {
    Message(MessageEvent),
    Receipt(ReceiptEvent),
    BusinessName(BusinessNameEvent),
    Contact(ContactEvent),
    Picture(PictureEvent),
    HistorySync(HistorySyncEvent),
    GroupInfo(GroupInfoEvent),
    PushName(PushNameEvent),
    LoggedOut(LoggedOutEvent),
    Unknown { type_name: String },
}

impl RawEvent {
    /// The notification kind this event converts into, if any.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            RawEvent::Message(_) => Some(EventKind::MessagesUpsert),
            RawEvent::Receipt(_) => Some(EventKind::MessagesUpdate),
            RawEvent::BusinessName(_)
            | RawEvent::Contact(_)
            | RawEvent::Picture(_)
            | RawEvent::HistorySync(_)
            | RawEvent::GroupInfo(_)
            | RawEvent::PushName(_) => Some(EventKind::ContactsUpsert),
            RawEvent::LoggedOut(_) => Some(EventKind::ConnectionUpdate),
            RawEvent::Unknown { .. } => None,
        }
    }

    /// Short name for logs and metric labels.
    pub fn type_name(&self) -> &str {
        match self {
            RawEvent::Message(_) => "message",
            RawEvent::Receipt(_) => "receipt",
            RawEvent::BusinessName(_) => "business_name",
            RawEvent::Contact(_) => "contact",
            RawEvent::Picture(_) => "picture",
            RawEvent::HistorySync(_) => "history_sync",
            RawEvent::GroupInfo(_) => "group_info",
            RawEvent::PushName(_) => "push_name",
            RawEvent::LoggedOut(_) => "logged_out",
            RawEvent::Unknown { type_name } => type_name,
        }
    }

    /// The chat this event concerns, for events tied to a single chat.
    pub fn chat(&self) -> Option<&Jid> {
        match self {
            RawEvent::Message(e) => Some(&e.info.chat),
            RawEvent::Receipt(e) => Some(&e.chat),
            _ => None,
        }
    }
}

/// Metadata attached to every message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageInfo {
    pub chat: Jid,
    pub sender: Jid,
    pub is_from_me: bool,
    pub is_group: bool,
    pub id: String,
    pub push_name: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    pub info: MessageInfo,
    pub message: WaMessage,
}

/// Message body with protocol-style optional content slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaMessage {
    pub conversation: Option<String>,
    pub extended_text: Option<ExtendedTextMessage>,
    pub image: Option<MediaMessage>,
    pub audio: Option<MediaMessage>,
    pub video: Option<MediaMessage>,
    pub document: Option<MediaMessage>,
    pub contact: Option<ContactMessage>,
    pub contacts_array: Option<ContactsArrayMessage>,
    pub reaction: Option<ReactionMessage>,
    pub list_response: Option<ListResponseMessage>,

    pub device_sent: Option<Box<WaMessage>>,
    pub ephemeral: Option<Box<WaMessage>>,
    pub view_once: Option<Box<WaMessage>>,
    pub document_with_caption: Option<Box<WaMessage>>,
}

impl WaMessage {
    /// Plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            conversation: Some(text.into()),
            ..Default::default()
        }
    }

    /// Peel off wrapper envelopes until the innermost message is reached.
    pub fn unwrap_raw(&self) -> &WaMessage {
        let mut current = self;
        loop {
            let inner = current
                .device_sent
                .as_deref()
                .or(current.ephemeral.as_deref())
                .or(current.view_once.as_deref())
                .or(current.document_with_caption.as_deref());
            match inner {
                Some(next) => current = next,
                None => return current,
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedTextMessage {
    pub text: String,
    pub context_info: Option<ContextInfo>,
}

/// An attachment reference (image, audio, video or document).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaMessage {
    pub url: String,
    pub direct_path: String,
    pub mimetype: String,
    pub caption: String,
    pub file_name: String,
    pub title: String,
    pub media_key: Vec<u8>,
    pub file_sha256: Vec<u8>,
    pub file_enc_sha256: Vec<u8>,
    pub file_length: u64,
    pub media_key_timestamp: i64,
    pub seconds: u32,
    pub height: u32,
    pub width: u32,
    pub page_count: u32,
    pub ptt: bool,
    pub view_once: bool,
    pub gif_playback: bool,
    pub jpeg_thumbnail: Vec<u8>,
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub display_name: String,
    pub vcard: String,
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsArrayMessage {
    pub display_name: String,
    pub contacts: Vec<ContactMessage>,
    pub context_info: Option<ContextInfo>,
}

/// Key of the message a reaction points at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageKey {
    pub remote_jid: String,
    pub from_me: bool,
    pub id: String,
    pub participant: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionMessage {
    pub key: Option<MessageKey>,
    pub text: String,
    pub sender_timestamp_ms: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListResponseMessage {
    pub title: String,
    pub list_type: String,
    pub selected_row_id: String,
    pub context_info: Option<ContextInfo>,
}

/// Reply, mention and advertising context of a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextInfo {
    pub stanza_id: String,
    pub participant: String,
    pub mentioned_jid: Vec<String>,
    pub expiration: u32,
    pub ephemeral_setting_timestamp: i64,
    pub conversion_source: String,
    pub entry_point_conversion_source: String,
    pub entry_point_conversion_app: String,
    pub external_ad_reply: Option<ExternalAdReply>,
    pub quoted_message: Option<Box<WaMessage>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalAdReply {
    pub title: String,
    pub body: String,
    pub media_type: String,
    pub thumbnail_url: String,
    pub source_type: String,
    pub source_id: String,
    pub source_url: String,
    pub ctwa_clid: String,
    pub contains_auto_reply: bool,
    pub render_larger_thumbnail: bool,
    pub show_ad_attribution: bool,
}

/// Delivery or read receipt covering one or more messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptEvent {
    pub chat: Jid,
    pub sender: Jid,
    pub is_from_me: bool,
    pub is_group: bool,
    pub message_ids: Vec<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub receipt_type: ReceiptType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessNameEvent {
    pub jid: Jid,
    pub old_business_name: String,
    pub new_business_name: String,
    /// Push name carried by the message that revealed the change, if any.
    pub message_push_name: String,
    pub verified_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactEvent {
    pub jid: Jid,
    pub first_name: String,
    pub full_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PictureEvent {
    pub jid: Jid,
    pub author: Jid,
    pub picture_id: String,
    pub remove: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPushName {
    pub id: String,
    pub push_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConversation {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySyncEvent {
    pub push_names: Vec<HistoryPushName>,
    pub conversations: Vec<HistoryConversation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupInfoEvent {
    pub jid: Jid,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushNameEvent {
    pub jid: Jid,
    pub old_push_name: String,
    pub new_push_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggedOutEvent {
    pub on_connect: bool,
    pub reason: String,
}
