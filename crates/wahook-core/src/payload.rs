// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification payloads delivered to tenant webhooks.
//!
//! The envelope uses snake_case (`date_time`), data bodies use camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EventKind;

/// The canonical, policy-approved form of an event, ready for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub instance: String,
    pub event: EventKind,
    pub date_time: DateTime<Utc>,
    pub data: NotificationData,
}

impl NotificationPayload {
    /// Build a payload; the event kind is derived from the data body.
    pub fn new(instance: impl Into<String>, data: NotificationData, date_time: DateTime<Utc>) -> Self {
        Self {
            instance: instance.into(),
            event: data.kind(),
            date_time,
            data,
        }
    }
}

/// Kind-specific body of a notification.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NotificationData {
    Message(Box<MessageData>),
    MessageUpdate(MessageUpdateData),
    ContactUpsert(ContactUpsertData),
    ConnectionUpdate(ConnectionUpdateData),
}

impl NotificationData {
    pub fn kind(&self) -> EventKind {
        match self {
            NotificationData::Message(_) => EventKind::MessagesUpsert,
            NotificationData::MessageUpdate(_) => EventKind::MessagesUpdate,
            NotificationData::ContactUpsert(_) => EventKind::ContactsUpsert,
            NotificationData::ConnectionUpdate(_) => EventKind::ConnectionUpdate,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero_u32(n: &u32) -> bool {
    *n == 0
}

fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

/// Message key identifying a message within a chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKeyData {
    pub remote_jid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote_lid: String,
    pub from_me: bool,
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub participant: String,
}

/// Body of a `messages.upsert` notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub key: MessageKeyData,
    pub push_name: String,
    /// `received` for inbound messages, `sent` for messages from the instance.
    pub status: String,
    pub message: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<MessageContextInfo>,
    pub message_type: String,
    /// Unix seconds.
    pub message_timestamp: i64,
    pub instance_id: String,
    pub source: String,
}

/// Message content. Exactly one content field is set for a recognised message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_message: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_message: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_message: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_message: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_message: Option<ContactContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts_array_message: Option<ContactsArrayContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_message: Option<ReactionContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_response_message: Option<ListResponseContent>,
    /// Re-hosted attachment URL, when blob storage is configured.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_url: String,
    /// Inlined attachment bytes, when the instance asks for inline media.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base64: String,
}

/// Attachment metadata. Binary hashes and keys are base64 encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    pub url: String,
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub file_sha256: String,
    pub file_enc_sha256: String,
    pub media_key: String,
    pub file_length: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub direct_path: String,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub media_key_timestamp: i64,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub seconds: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub height: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub page_count: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ptt: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub view_once: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub gif_playback: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jpeg_thumbnail: String,
}

/// Fields recovered from a contact card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedVcard {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactContent {
    pub display_name: String,
    pub vcard: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_vcard: Option<DecodedVcard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsArrayContent {
    pub display_name: String,
    pub contacts: Vec<ContactContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionContent {
    pub text: String,
    pub sender_timestamp_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<MessageKeyData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSelectReply {
    pub selected_row_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponseContent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub list_type: String,
    pub single_select_reply: SingleSelectReply,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAdReplyContent {
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContextInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stanza_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub participant: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentioned_jid: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub expiration: u32,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub ephemeral_setting_timestamp: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub conversion_source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub entry_point_conversion_source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub entry_point_conversion_app: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ad_reply: Option<ExternalAdReplyContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_message: Option<Box<MessageContent>>,
}

/// Receipt status carried by `messages.update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageUpdateStatus {
    Read,
    DeliveryAck,
}

/// Body of a `messages.update` notification; one per message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdateData {
    pub message_id: String,
    pub key_id: String,
    pub remote_jid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote_lid: String,
    pub from_me: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub participant: String,
    pub status: MessageUpdateStatus,
    pub instance_id: String,
}

/// One contact identity in a `contacts.upsert` notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub remote_jid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote_lid: String,
    pub push_name: String,
    #[serde(default)]
    pub profile_pic_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base64_pic: String,
    pub instance_id: String,
}

/// Body of a `contacts.upsert` notification; serialises as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactUpsertData(pub Vec<Contact>);

/// Session connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    Open,
    Close,
}

/// Body of a `connection.update` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdateData {
    pub instance: String,
    pub status: ConnectionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let payload = NotificationPayload::new(
            "tenant-1",
            NotificationData::ConnectionUpdate(ConnectionUpdateData {
                instance: "tenant-1".into(),
                status: ConnectionStatus::Close,
            }),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["instance"], "tenant-1");
        assert_eq!(value["event"], "connection.update");
        assert_eq!(value["date_time"], "2023-11-14T22:13:20Z");
        assert_eq!(value["data"]["status"], "close");
    }

    #[test]
    fn message_update_status_wire_names() {
        let data = MessageUpdateData {
            message_id: "ABC".into(),
            key_id: "ABC".into(),
            remote_jid: "5511@s.whatsapp.net".into(),
            remote_lid: String::new(),
            from_me: false,
            participant: String::new(),
            status: MessageUpdateStatus::DeliveryAck,
            instance_id: "tenant-1".into(),
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["status"], "DELIVERY_ACK");
        assert_eq!(value["keyId"], "ABC");
        assert!(value.get("remoteLid").is_none());
    }

    #[test]
    fn contact_upsert_is_an_array() {
        let data = ContactUpsertData(vec![Contact {
            remote_jid: "5511@s.whatsapp.net".into(),
            push_name: "Ana".into(),
            instance_id: "tenant-1".into(),
            ..Default::default()
        }]);
        let value = serde_json::to_value(NotificationData::ContactUpsert(data)).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["pushName"], "Ana");
        assert_eq!(value[0]["profilePicUrl"], "");
    }

    #[test]
    fn empty_media_fields_are_omitted() {
        let content = MessageContent {
            conversation: Some("hi".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value, serde_json::json!({ "conversation": "hi" }));
    }
}
