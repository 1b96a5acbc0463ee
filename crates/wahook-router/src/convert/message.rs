// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message events to `messages.upsert` bodies.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use tracing::warn;

use wahook_core::event::{ContactMessage, ContextInfo, MediaMessage, MessageEvent, MessageKey, WaMessage};
use wahook_core::payload::{
    ContactContent, ContactsArrayContent, ExternalAdReplyContent, ListResponseContent, MediaContent,
    MessageContent, MessageContextInfo, MessageData, MessageKeyData, ReactionContent, SingleSelectReply,
};
use wahook_core::types::MediaKind;

use super::vcard;

pub const REACTION: &str = "reactionMessage";
pub const LIST_RESPONSE: &str = "listResponseMessage";
pub const IMAGE: &str = "imageMessage";
pub const AUDIO: &str = "audioMessage";
pub const DOCUMENT: &str = "documentMessage";
pub const VIDEO: &str = "videoMessage";
pub const CONTACT: &str = "contactMessage";
pub const CONTACTS_ARRAY: &str = "contactsArrayMessage";
pub const CONVERSATION: &str = "conversation";
pub const UNKNOWN: &str = "unknown";

/// The recognised content of one (already unwrapped) message.
#[derive(Debug, Default)]
pub struct ParsedMessage<'a> {
    pub message_type: &'static str,
    pub content: MessageContent,
    pub context: Option<&'a ContextInfo>,
    /// Attachment to relay, for media message types.
    pub attachment: Option<(MediaKind, &'a MediaMessage)>,
}

impl ParsedMessage<'_> {
    pub fn is_unknown(&self) -> bool {
        self.message_type == UNKNOWN
    }
}

/// Classify `m` by the first content slot present, in priority order:
/// reaction, list response, image, audio, document, video, contact,
/// contacts array, conversation, extended text.
pub fn parse_message(m: &WaMessage) -> ParsedMessage<'_> {
    let mut parsed = ParsedMessage {
        message_type: UNKNOWN,
        ..Default::default()
    };

    if let Some(r) = &m.reaction {
        parsed.message_type = REACTION;
        parsed.content.reaction_message = Some(ReactionContent {
            text: r.text.clone(),
            sender_timestamp_ms: r.sender_timestamp_ms,
            key: Some(r.key.as_ref().map(reaction_key).unwrap_or_default()),
        });
    } else if let Some(lr) = &m.list_response {
        parsed.message_type = LIST_RESPONSE;
        parsed.content.list_response_message = Some(ListResponseContent {
            title: lr.title.clone(),
            list_type: lr.list_type.clone(),
            single_select_reply: SingleSelectReply {
                selected_row_id: lr.selected_row_id.clone(),
            },
        });
    } else if let Some(media) = &m.image {
        parsed.message_type = IMAGE;
        parsed.content.image_message = Some(media_content(media));
        parsed.context = media.context_info.as_ref();
        parsed.attachment = Some((MediaKind::Image, media));
    } else if let Some(media) = &m.audio {
        parsed.message_type = AUDIO;
        parsed.content.audio_message = Some(media_content(media));
        parsed.context = media.context_info.as_ref();
        parsed.attachment = Some((MediaKind::Audio, media));
    } else if let Some(media) = &m.document {
        parsed.message_type = DOCUMENT;
        parsed.content.document_message = Some(media_content(media));
        parsed.context = media.context_info.as_ref();
        parsed.attachment = Some((MediaKind::Document, media));
    } else if let Some(media) = &m.video {
        parsed.message_type = VIDEO;
        parsed.content.video_message = Some(media_content(media));
        parsed.context = media.context_info.as_ref();
        parsed.attachment = Some((MediaKind::Video, media));
    } else if let Some(contact) = &m.contact {
        parsed.message_type = CONTACT;
        parsed.content.contact_message = Some(contact_content(contact));
        parsed.context = contact.context_info.as_ref();
    } else if let Some(array) = &m.contacts_array {
        parsed.message_type = CONTACTS_ARRAY;
        parsed.content.contacts_array_message = Some(ContactsArrayContent {
            display_name: array.display_name.clone(),
            contacts: array.contacts.iter().map(contact_content).collect(),
        });
        parsed.context = array.context_info.as_ref();
    } else if let Some(text) = m.conversation.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        parsed.message_type = CONVERSATION;
        parsed.content.conversation = Some(text.to_string());
    } else if let Some(et) = m.extended_text.as_ref().filter(|et| !et.text.is_empty()) {
        parsed.message_type = CONVERSATION;
        parsed.content.conversation = Some(et.text.clone());
        parsed.context = et.context_info.as_ref();
    }

    parsed
}

/// Resolved identifiers for the message key.
#[derive(Debug, Clone, Default)]
pub struct MessageIds {
    pub remote_jid: String,
    pub remote_lid: String,
    pub participant: String,
}

/// Assemble the notification body. A context carrying an external ad reply
/// reclassifies the message as `conversation`.
pub fn build_message_data(
    instance_id: &str,
    event: &MessageEvent,
    parsed: ParsedMessage<'_>,
    ids: MessageIds,
    now: DateTime<Utc>,
) -> MessageData {
    let info = &event.info;
    let mut message_type = parsed.message_type;

    let context_info = parsed.context.map(|ci| {
        if ci.external_ad_reply.is_some() {
            message_type = CONVERSATION;
        }
        context_info(ci)
    });

    MessageData {
        key: MessageKeyData {
            remote_jid: ids.remote_jid,
            remote_lid: ids.remote_lid,
            from_me: info.is_from_me,
            id: info.id.clone(),
            participant: ids.participant,
        },
        push_name: info.push_name.trim().to_string(),
        status: if info.is_from_me { "sent" } else { "received" }.to_string(),
        message: parsed.content,
        context_info,
        message_type: message_type.to_string(),
        message_timestamp: message_time(event, now).timestamp(),
        instance_id: instance_id.to_string(),
        source: "whatsapp".to_string(),
    }
}

/// The message's own timestamp, or `now` when the runtime left it unset.
pub fn message_time(event: &MessageEvent, now: DateTime<Utc>) -> DateTime<Utc> {
    event
        .info
        .timestamp
        .filter(|ts| ts.timestamp() != 0)
        .unwrap_or(now)
}

fn context_info(ci: &ContextInfo) -> MessageContextInfo {
    MessageContextInfo {
        stanza_id: ci.stanza_id.clone(),
        participant: ci.participant.clone(),
        mentioned_jid: ci.mentioned_jid.clone(),
        expiration: ci.expiration,
        ephemeral_setting_timestamp: ci.ephemeral_setting_timestamp,
        conversion_source: ci.conversion_source.clone(),
        entry_point_conversion_source: ci.entry_point_conversion_source.clone(),
        entry_point_conversion_app: ci.entry_point_conversion_app.clone(),
        external_ad_reply: ci.external_ad_reply.as_ref().map(|ad| ExternalAdReplyContent {
            title: ad.title.clone(),
            body: ad.body.clone(),
            media_type: ad.media_type.clone(),
            thumbnail_url: ad.thumbnail_url.clone(),
            source_type: ad.source_type.clone(),
            source_id: ad.source_id.clone(),
            source_url: ad.source_url.clone(),
            ctwa_clid: ad.ctwa_clid.clone(),
            contains_auto_reply: ad.contains_auto_reply,
            render_larger_thumbnail: ad.render_larger_thumbnail,
            show_ad_attribution: ad.show_ad_attribution,
        }),
        quoted_message: ci
            .quoted_message
            .as_deref()
            .map(|quoted| Box::new(parse_message(quoted.unwrap_raw()).content)),
    }
}

fn reaction_key(key: &MessageKey) -> MessageKeyData {
    MessageKeyData {
        remote_jid: key.remote_jid.clone(),
        remote_lid: String::new(),
        from_me: key.from_me,
        id: key.id.clone(),
        participant: key.participant.clone(),
    }
}

fn b64(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        String::new()
    } else {
        STANDARD.encode(bytes)
    }
}

fn media_content(media: &MediaMessage) -> MediaContent {
    MediaContent {
        url: media.url.clone(),
        mimetype: media.mimetype.clone(),
        caption: media.caption.clone(),
        file_name: media.file_name.clone(),
        title: media.title.clone(),
        file_sha256: b64(&media.file_sha256),
        file_enc_sha256: b64(&media.file_enc_sha256),
        media_key: b64(&media.media_key),
        file_length: media.file_length,
        direct_path: media.direct_path.clone(),
        media_key_timestamp: media.media_key_timestamp,
        seconds: media.seconds,
        height: media.height,
        width: media.width,
        page_count: media.page_count,
        ptt: media.ptt,
        view_once: media.view_once,
        gif_playback: media.gif_playback,
        jpeg_thumbnail: b64(&media.jpeg_thumbnail),
    }
}

fn contact_content(contact: &ContactMessage) -> ContactContent {
    let decoded_vcard = match vcard::decode(&contact.vcard) {
        Ok(card) => Some(card),
        Err(e) => {
            warn!(display_name = %contact.display_name, error = %e, "failed to decode vcard");
            None
        }
    };
    ContactContent {
        display_name: contact.display_name.clone(),
        vcard: contact.vcard.clone(),
        decoded_vcard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wahook_core::Jid;
    use wahook_core::event::{ExtendedTextMessage, ExternalAdReply, ListResponseMessage, MessageInfo, ReactionMessage};

    fn event(message: WaMessage) -> MessageEvent {
        MessageEvent {
            info: MessageInfo {
                chat: Jid::user("5511"),
                sender: Jid::user("5511"),
                id: "MSG1".into(),
                push_name: "  Ana ".into(),
                timestamp: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
                ..Default::default()
            },
            message,
        }
    }

    fn image() -> MediaMessage {
        MediaMessage {
            url: "https://mmg.test/img".into(),
            mimetype: "image/jpeg".into(),
            caption: "look".into(),
            file_sha256: vec![1, 2, 3],
            ..Default::default()
        }
    }

    #[test]
    fn reaction_wins_over_everything() {
        let m = WaMessage {
            reaction: Some(ReactionMessage {
                text: "👍".into(),
                key: Some(MessageKey {
                    remote_jid: "5511@s.whatsapp.net".into(),
                    id: "TARGET".into(),
                    ..Default::default()
                }),
                sender_timestamp_ms: 10,
            }),
            image: Some(image()),
            conversation: Some("hi".into()),
            ..Default::default()
        };
        let parsed = parse_message(&m);
        assert_eq!(parsed.message_type, REACTION);
        assert!(parsed.attachment.is_none());
        let reaction = parsed.content.reaction_message.unwrap();
        assert_eq!(reaction.key.unwrap().id, "TARGET");
        assert!(parsed.content.image_message.is_none());
    }

    #[test]
    fn list_response_before_media() {
        let m = WaMessage {
            list_response: Some(ListResponseMessage {
                list_type: "SINGLE_SELECT".into(),
                selected_row_id: "row-2".into(),
                ..Default::default()
            }),
            image: Some(image()),
            ..Default::default()
        };
        let parsed = parse_message(&m);
        assert_eq!(parsed.message_type, LIST_RESPONSE);
        assert_eq!(
            parsed.content.list_response_message.unwrap().single_select_reply.selected_row_id,
            "row-2"
        );
    }

    #[test]
    fn media_sets_attachment_and_encodes_hashes() {
        let m = WaMessage {
            image: Some(image()),
            ..Default::default()
        };
        let parsed = parse_message(&m);
        assert_eq!(parsed.message_type, IMAGE);
        let (kind, media) = parsed.attachment.unwrap();
        assert_eq!(kind, MediaKind::Image);
        assert_eq!(media.url, "https://mmg.test/img");
        let content = parsed.content.image_message.unwrap();
        assert_eq!(content.file_sha256, "AQID");
        assert_eq!(content.media_key, "");
    }

    #[test]
    fn conversation_is_trimmed_and_blank_falls_through() {
        let m = WaMessage::text("  hello  ");
        let parsed = parse_message(&m);
        assert_eq!(parsed.message_type, CONVERSATION);
        assert_eq!(parsed.content.conversation.as_deref(), Some("hello"));

        let blank = WaMessage {
            conversation: Some("   ".into()),
            extended_text: Some(ExtendedTextMessage {
                text: "from extended".into(),
                context_info: None,
            }),
            ..Default::default()
        };
        let parsed = parse_message(&blank);
        assert_eq!(parsed.message_type, CONVERSATION);
        assert_eq!(parsed.content.conversation.as_deref(), Some("from extended"));
    }

    #[test]
    fn empty_message_is_unknown() {
        assert!(parse_message(&WaMessage::default()).is_unknown());
        assert!(parse_message(&WaMessage::text("")).is_unknown());
    }

    #[test]
    fn contact_vcard_is_decoded() {
        let m = WaMessage {
            contact: Some(ContactMessage {
                display_name: "Bob".into(),
                vcard: "BEGIN:VCARD\nFN:Bob B\nTEL:+1 555\nEND:VCARD".into(),
                context_info: None,
            }),
            ..Default::default()
        };
        let parsed = parse_message(&m);
        assert_eq!(parsed.message_type, CONTACT);
        let decoded = parsed.content.contact_message.unwrap().decoded_vcard.unwrap();
        assert_eq!(decoded.full_name, "Bob B");
    }

    #[test]
    fn build_fills_key_status_and_timestamp() {
        let ev = event(WaMessage::text("hi"));
        let parsed = parse_message(ev.message.unwrap_raw());
        let data = build_message_data(
            "tenant",
            &ev,
            parsed,
            MessageIds {
                remote_jid: "5511@s.whatsapp.net".into(),
                remote_lid: "99@lid".into(),
                participant: "5511@s.whatsapp.net".into(),
            },
            Utc::now(),
        );
        assert_eq!(data.key.id, "MSG1");
        assert_eq!(data.key.remote_lid, "99@lid");
        assert_eq!(data.push_name, "Ana");
        assert_eq!(data.status, "received");
        assert_eq!(data.message_type, CONVERSATION);
        assert_eq!(data.message_timestamp, 1_772_366_400);
        assert_eq!(data.source, "whatsapp");
        assert!(data.context_info.is_none());
    }

    #[test]
    fn missing_timestamp_uses_now() {
        let mut ev = event(WaMessage::text("hi"));
        ev.info.timestamp = None;
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(message_time(&ev, now), now);
    }

    #[test]
    fn external_ad_reply_reclassifies_as_conversation() {
        let mut img = image();
        img.context_info = Some(ContextInfo {
            external_ad_reply: Some(ExternalAdReply {
                title: "Promo".into(),
                source_url: "https://ads.test".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        let ev = event(WaMessage {
            image: Some(img),
            ..Default::default()
        });
        let parsed = parse_message(ev.message.unwrap_raw());
        assert_eq!(parsed.message_type, IMAGE);
        let data = build_message_data("tenant", &ev, parsed, MessageIds::default(), Utc::now());
        assert_eq!(data.message_type, CONVERSATION);
        assert!(data.message.image_message.is_some());
        assert_eq!(data.context_info.unwrap().external_ad_reply.unwrap().title, "Promo");
    }

    #[test]
    fn quoted_message_is_parsed_recursively() {
        let ev = event(WaMessage {
            extended_text: Some(ExtendedTextMessage {
                text: "reply".into(),
                context_info: Some(ContextInfo {
                    stanza_id: "ORIG".into(),
                    quoted_message: Some(Box::new(WaMessage::text("original"))),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        });
        let parsed = parse_message(ev.message.unwrap_raw());
        let data = build_message_data("tenant", &ev, parsed, MessageIds::default(), Utc::now());
        let ctx = data.context_info.unwrap();
        assert_eq!(ctx.stanza_id, "ORIG");
        assert_eq!(ctx.quoted_message.unwrap().conversation.as_deref(), Some("original"));
    }

    #[test]
    fn from_me_is_sent() {
        let mut ev = event(WaMessage::text("hi"));
        ev.info.is_from_me = true;
        let parsed = parse_message(ev.message.unwrap_raw());
        let data = build_message_data("tenant", &ev, parsed, MessageIds::default(), Utc::now());
        assert_eq!(data.status, "sent");
        assert!(data.key.from_me);
    }
}
