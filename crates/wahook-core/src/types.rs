// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant configuration and the small value types shared by collaborator traits.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Tenant configuration snapshot, as returned by the instance lookup collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub webhook: WebhookSettings,
    /// Drop events whose chat is a group.
    #[serde(default)]
    pub skip_groups: bool,
    /// Drop events whose chat is a broadcast list.
    #[serde(default)]
    pub skip_broadcasts: bool,
    /// Drop messages sent by the instance itself.
    #[serde(default)]
    pub skip_own_messages: bool,
    /// Acknowledge inbound messages with a delivery receipt.
    #[serde(default)]
    pub auto_receipt: bool,
    /// Mark inbound messages as read after a short delay.
    #[serde(default)]
    pub read_messages: bool,
    /// Keep presence refreshed as "available".
    #[serde(default)]
    pub always_online: bool,
}

impl Instance {
    /// The instance's event subscription, built from its webhook event names.
    pub fn subscription(&self) -> Subscription {
        Subscription::from_names(&self.webhook.events)
    }
}

/// Webhook destination and event filter for one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    #[serde(default)]
    pub url: String,
    /// Subscribed event names, or `["ALL"]`.
    #[serde(default)]
    pub events: Vec<String>,
    /// Inline downloaded media as base64 in message notifications.
    #[serde(default)]
    pub inline_media: bool,
}

/// Notification event kinds; also the subscription filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "messages.upsert")]
    MessagesUpsert,
    #[serde(rename = "messages.update")]
    MessagesUpdate,
    #[serde(rename = "contacts.upsert")]
    ContactsUpsert,
    #[serde(rename = "connection.update")]
    ConnectionUpdate,
    #[serde(rename = "groups.upsert")]
    GroupsUpsert,
    #[serde(rename = "call")]
    Call,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::MessagesUpsert,
        EventKind::MessagesUpdate,
        EventKind::ContactsUpsert,
        EventKind::ConnectionUpdate,
        EventKind::GroupsUpsert,
        EventKind::Call,
    ];

    /// The wire name used in notification payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MessagesUpsert => "messages.upsert",
            EventKind::MessagesUpdate => "messages.update",
            EventKind::ContactsUpsert => "contacts.upsert",
            EventKind::ConnectionUpdate => "connection.update",
            EventKind::GroupsUpsert => "groups.upsert",
            EventKind::Call => "call",
        }
    }

    /// Parse a subscription name. Case-insensitive; `-`, `_` and `.` are
    /// interchangeable and the singular form is accepted, so
    /// `MESSAGES_UPSERT`, `message-upsert` and `messages.upsert` are equal.
    pub fn from_subscription_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '-' | '_' => '.',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "messages.upsert" | "message.upsert" => Some(EventKind::MessagesUpsert),
            "messages.update" | "message.update" => Some(EventKind::MessagesUpdate),
            "contacts.upsert" | "contact.upsert" => Some(EventKind::ContactsUpsert),
            "connection.update" | "connections.update" => Some(EventKind::ConnectionUpdate),
            "groups.upsert" | "group.upsert" => Some(EventKind::GroupsUpsert),
            "call" | "calls" => Some(EventKind::Call),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of event kinds an instance wants delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscription {
    all: bool,
    kinds: HashSet<EventKind>,
}

impl Subscription {
    /// Build from configured names. `ALL` (any case) subscribes to everything;
    /// unknown names are ignored.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut sub = Subscription::default();
        for name in names {
            let name = name.as_ref();
            if name.trim().eq_ignore_ascii_case("all") {
                sub.all = true;
                continue;
            }
            match EventKind::from_subscription_name(name) {
                Some(kind) => {
                    sub.kinds.insert(kind);
                }
                None => tracing::debug!(event = name, "ignoring unknown webhook event name"),
            }
        }
        sub
    }

    pub fn all() -> Self {
        Self {
            all: true,
            kinds: HashSet::new(),
        }
    }

    pub fn accepts(&self, kind: EventKind) -> bool {
        self.all || self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.kinds.is_empty()
    }
}

/// Media category, used when uploading to or downloading from the session runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
}

/// Receipt types understood by the session runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptType {
    #[default]
    Delivered,
    Read,
    ReadSelf,
    Played,
    Sender,
    Retry,
    Server,
    Inactive,
}

/// Account-level presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Available,
    Unavailable,
}

/// Per-chat presence (typing indicators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatPresence {
    Composing,
    Paused,
}

/// What the user is composing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatPresenceMedia {
    #[default]
    Text,
    Audio,
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// Storage references returned by the runtime after a media upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub direct_path: String,
    pub media_key: Vec<u8>,
    pub file_sha256: Vec<u8>,
    pub file_enc_sha256: Vec<u8>,
    pub file_length: u64,
}

/// Result of checking whether a phone number has an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberLookup {
    pub exists: bool,
    pub jid: String,
    pub lid: String,
    pub number: String,
}

/// Profile picture location as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePicture {
    pub url: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_names_are_normalized() {
        for name in ["MESSAGES_UPSERT", "message-upsert", "messages.upsert", " Messages-Upsert "] {
            assert_eq!(
                EventKind::from_subscription_name(name),
                Some(EventKind::MessagesUpsert),
                "{name}"
            );
        }
        assert_eq!(
            EventKind::from_subscription_name("CONTACTS_UPSERT"),
            Some(EventKind::ContactsUpsert)
        );
        assert_eq!(EventKind::from_subscription_name("PRESENCE_UPDATE"), None);
    }

    #[test]
    fn all_subscribes_to_every_kind() {
        let sub = Subscription::from_names(&["All"]);
        for kind in EventKind::ALL {
            assert!(sub.accepts(kind));
        }
    }

    #[test]
    fn empty_subscription_accepts_nothing() {
        let sub = Subscription::from_names::<&str>(&[]);
        assert!(sub.is_empty());
        for kind in EventKind::ALL {
            assert!(!sub.accepts(kind));
        }
    }

    #[test]
    fn partial_subscription() {
        let sub = Subscription::from_names(&["MESSAGES_UPDATE", "bogus"]);
        assert!(sub.accepts(EventKind::MessagesUpdate));
        assert!(!sub.accepts(EventKind::MessagesUpsert));
        assert!(!sub.is_empty());
    }

    #[test]
    fn event_kind_wire_names() {
        let json = serde_json::to_string(&EventKind::ConnectionUpdate).unwrap();
        assert_eq!(json, "\"connection.update\"");
        assert_eq!(EventKind::ContactsUpsert.to_string(), "contacts.upsert");
    }

    #[test]
    fn instance_deserializes_with_defaults() {
        let instance: Instance = serde_json::from_str(r#"{"id":"tenant-1"}"#).unwrap();
        assert_eq!(instance.id, "tenant-1");
        assert!(instance.webhook.url.is_empty());
        assert!(instance.subscription().is_empty());
        assert!(!instance.skip_groups);
    }
}
