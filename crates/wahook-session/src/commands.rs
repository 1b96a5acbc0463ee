// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound commands against a registered session.
//!
//! Each command resolves the instance's live session and forwards to the
//! runtime. A missing session is `SessionNotFound`; runtime failures are
//! returned unchanged and never retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use wahook_core::event::WaMessage;
use wahook_core::types::{ChatPresence, ChatPresenceMedia, NumberLookup, ReceiptType, SendReceipt};
use wahook_core::{Jid, WahookError};

use crate::registry::{SessionHandle, SessionRegistry};

/// Upper bound on the hold after a chat presence update.
pub const MAX_PRESENCE_DELAY: Duration = Duration::from_secs(300);

/// Command pass-throughs keyed by instance id.
#[derive(Clone)]
pub struct Commands {
    registry: Arc<SessionRegistry>,
}

impl Commands {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    fn session(&self, instance_id: &str) -> Result<SessionHandle, WahookError> {
        self.registry
            .get(instance_id)
            .ok_or_else(|| WahookError::SessionNotFound(instance_id.to_string()))
    }

    /// Send a plain text message.
    pub async fn send_text(
        &self,
        instance_id: &str,
        to: &Jid,
        text: &str,
    ) -> Result<SendReceipt, WahookError> {
        let session = self.session(instance_id)?;
        let receipt = session.send_message(to, WaMessage::text(text)).await?;
        debug!(instance_id, to = %to, message_id = %receipt.id, "text message sent");
        Ok(receipt)
    }

    /// Mark `ids` in `chat` as read. `sender` defaults to `chat`.
    pub async fn read_messages(
        &self,
        instance_id: &str,
        chat: &Jid,
        sender: Option<&Jid>,
        ids: &[String],
    ) -> Result<(), WahookError> {
        let session = self.session(instance_id)?;
        let sender = sender.unwrap_or(chat);
        session
            .mark_read(ids, Utc::now(), chat, sender, ReceiptType::Read)
            .await
    }

    /// Signal composing/paused in `chat`, then hold for `delay` (capped at
    /// [`MAX_PRESENCE_DELAY`]) so the indicator is visible before the next send.
    pub async fn send_chat_presence(
        &self,
        instance_id: &str,
        chat: &Jid,
        state: ChatPresence,
        media: ChatPresenceMedia,
        delay: Option<Duration>,
    ) -> Result<(), WahookError> {
        let session = self.session(instance_id)?;
        session.send_chat_presence(chat, state, media).await?;
        if let Some(delay) = delay.filter(|d| !d.is_zero()) {
            tokio::time::sleep(delay.min(MAX_PRESENCE_DELAY)).await;
        }
        Ok(())
    }

    /// Check which phone numbers are registered, with jid/lid resolved per hit.
    pub async fn number_exists(
        &self,
        instance_id: &str,
        numbers: &[String],
    ) -> Result<Vec<NumberLookup>, WahookError> {
        let session = self.session(instance_id)?;
        let mut results = session.is_on_whatsapp(numbers).await?;
        for result in &mut results {
            let Ok(jid) = result.jid.parse::<Jid>() else {
                continue;
            };
            let (jid, lid) = session.resolve_jid_lid(&jid).await;
            if !jid.is_empty() {
                result.jid = jid;
            }
            if !lid.is_empty() {
                result.lid = lid;
            }
        }
        Ok(results)
    }

    pub async fn archive_chat(
        &self,
        instance_id: &str,
        chat: &Jid,
        archived: bool,
    ) -> Result<(), WahookError> {
        self.session(instance_id)?
            .set_chat_archived(chat, archived)
            .await
    }

    pub async fn delete_chat(&self, instance_id: &str, chat: &Jid) -> Result<(), WahookError> {
        self.session(instance_id)?.delete_chat(chat).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wahook_test_utils::{MockSession, SessionCall};

    fn setup() -> (Commands, Arc<MockSession>) {
        let registry = Arc::new(SessionRegistry::new());
        let session = Arc::new(
            MockSession::new()
                .with_registered("5511999")
                .with_lid("5511999@s.whatsapp.net", "12345@lid"),
        );
        registry.insert("tenant", session.clone());
        (Commands::new(registry), session)
    }

    #[tokio::test]
    async fn unknown_instance_is_session_not_found() {
        let (commands, _) = setup();
        let chat = Jid::user("5511");

        let err = commands.send_text("ghost", &chat, "hi").await.unwrap_err();
        assert!(matches!(err, WahookError::SessionNotFound(ref id) if id == "ghost"));
        assert!(err.is_not_found());

        assert!(commands.read_messages("ghost", &chat, None, &[]).await.unwrap_err().is_not_found());
        assert!(commands.archive_chat("ghost", &chat, true).await.unwrap_err().is_not_found());
        assert!(commands.delete_chat("ghost", &chat).await.unwrap_err().is_not_found());
        assert!(commands.number_exists("ghost", &[]).await.unwrap_err().is_not_found());
        assert!(
            commands
                .send_chat_presence("ghost", &chat, ChatPresence::Composing, ChatPresenceMedia::Text, None)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn send_text_forwards_to_runtime() {
        let (commands, session) = setup();
        let receipt = commands
            .send_text("tenant", &Jid::user("5511"), "hello")
            .await
            .unwrap();
        assert!(receipt.id.starts_with("mock-"));
        assert_eq!(
            session.calls(),
            vec![SessionCall::SendMessage {
                to: "5511@s.whatsapp.net".into(),
                text: Some("hello".into()),
            }]
        );
    }

    #[tokio::test]
    async fn read_messages_defaults_sender_to_chat() {
        let (commands, session) = setup();
        let chat = Jid::user("5511");
        commands
            .read_messages("tenant", &chat, None, &["m1".to_string()])
            .await
            .unwrap();
        let group = Jid::new("120363", "g.us");
        let member = Jid::user("5522");
        commands
            .read_messages("tenant", &group, Some(&member), &["m2".to_string()])
            .await
            .unwrap();

        let calls = session.calls();
        assert!(matches!(&calls[0], SessionCall::MarkRead { sender, receipt_type: ReceiptType::Read, .. }
            if sender == "5511@s.whatsapp.net"));
        assert!(matches!(&calls[1], SessionCall::MarkRead { sender, chat, .. }
            if sender == "5522@s.whatsapp.net" && chat == "120363@g.us"));
    }

    #[tokio::test(start_paused = true)]
    async fn chat_presence_holds_for_delay() {
        let (commands, session) = setup();
        let start = tokio::time::Instant::now();
        commands
            .send_chat_presence(
                "tenant",
                &Jid::user("5511"),
                ChatPresence::Composing,
                ChatPresenceMedia::Audio,
                Some(Duration::from_millis(1500)),
            )
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert_eq!(
            session.calls(),
            vec![SessionCall::ChatPresence {
                chat: "5511@s.whatsapp.net".into(),
                state: ChatPresence::Composing,
                media: ChatPresenceMedia::Audio,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn chat_presence_delay_is_capped() {
        let (commands, _) = setup();
        let start = tokio::time::Instant::now();
        commands
            .send_chat_presence(
                "tenant",
                &Jid::user("5511"),
                ChatPresence::Paused,
                ChatPresenceMedia::Text,
                Some(Duration::from_secs(3600)),
            )
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= MAX_PRESENCE_DELAY);
        assert!(elapsed < Duration::from_secs(301));
    }

    #[tokio::test]
    async fn number_exists_resolves_lids() {
        let (commands, _) = setup();
        let results = commands
            .number_exists("tenant", &["5511999".to_string(), "5500000".to_string()])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].exists);
        assert_eq!(results[0].jid, "5511999@s.whatsapp.net");
        assert_eq!(results[0].lid, "12345@lid");
        assert!(!results[1].exists);
        assert_eq!(results[1].lid, "");
    }

    #[tokio::test]
    async fn runtime_failures_propagate() {
        let (commands, session) = setup();
        session.fail("set_chat_archived");
        let err = commands
            .archive_chat("tenant", &Jid::user("5511"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, WahookError::Session { .. }));

        commands.delete_chat("tenant", &Jid::user("5511")).await.unwrap();
        assert_eq!(
            session.calls().last(),
            Some(&SessionCall::DeleteChat("5511@s.whatsapp.net".into()))
        );
    }
}
