// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget delivery and read receipts for inbound messages.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use wahook_core::Jid;
use wahook_core::event::MessageInfo;
use wahook_core::types::ReceiptType;
use wahook_session::{SessionHandle, SessionRegistry};

pub const DEFAULT_READ_DELAY: Duration = Duration::from_secs(8);

/// The message a receipt acknowledges.
#[derive(Debug, Clone)]
pub struct ReceiptTarget {
    pub instance_id: String,
    pub message_id: String,
    pub chat: Jid,
    pub sender: Jid,
    pub timestamp: DateTime<Utc>,
}

impl ReceiptTarget {
    pub fn from_info(instance_id: &str, info: &MessageInfo) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            message_id: info.id.clone(),
            chat: info.chat.clone(),
            sender: info.sender.clone(),
            timestamp: info.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

/// Receipts are only sent for messages from others outside broadcast chats.
pub fn wants_receipts(info: &MessageInfo) -> bool {
    !info.is_from_me && !info.chat.is_broadcast()
}

/// Acknowledge delivery right away.
pub fn spawn_delivery_receipt(session: SessionHandle, target: ReceiptTarget) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ids = [target.message_id.clone()];
        if let Err(e) = session
            .mark_read(&ids, target.timestamp, &target.chat, &target.sender, ReceiptType::Delivered)
            .await
        {
            debug!(
                instance = %target.instance_id,
                chat = %target.chat,
                error = %e,
                "failed to send delivery receipt"
            );
        }
    })
}

/// Mark as read after `delay`. The session is looked up again once the delay
/// has passed, so a logout in between cancels the receipt.
pub fn spawn_read_receipt(
    sessions: Arc<SessionRegistry>,
    target: ReceiptTarget,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let Some(session) = sessions.get(&target.instance_id) else {
            debug!(instance = %target.instance_id, "session gone before read receipt");
            return;
        };
        let ids = [target.message_id.clone()];
        if let Err(e) = session
            .mark_read(&ids, Utc::now(), &target.chat, &target.sender, ReceiptType::Read)
            .await
        {
            debug!(
                instance = %target.instance_id,
                chat = %target.chat,
                error = %e,
                "failed to mark message as read"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wahook_test_utils::MockSession;

    fn target() -> ReceiptTarget {
        ReceiptTarget {
            instance_id: "tenant".into(),
            message_id: "MSG1".into(),
            chat: Jid::user("5511"),
            sender: Jid::user("5511"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn receipts_skip_own_and_broadcast() {
        let mut info = MessageInfo {
            chat: Jid::user("5511"),
            ..Default::default()
        };
        assert!(wants_receipts(&info));
        info.is_from_me = true;
        assert!(!wants_receipts(&info));
        info.is_from_me = false;
        info.chat = Jid::new("status", "broadcast");
        assert!(!wants_receipts(&info));
    }

    #[tokio::test]
    async fn delivery_receipt_is_sent() {
        let session = Arc::new(MockSession::new());
        spawn_delivery_receipt(session.clone(), target()).await.unwrap();
        assert_eq!(
            session.receipts(),
            vec![(vec!["MSG1".to_string()], ReceiptType::Delivered)]
        );
    }

    #[tokio::test]
    async fn delivery_receipt_failure_is_swallowed() {
        let session = Arc::new(MockSession::new());
        session.fail("mark_read");
        spawn_delivery_receipt(session.clone(), target()).await.unwrap();
        assert_eq!(session.receipts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn read_receipt_waits_for_delay() {
        let registry = Arc::new(SessionRegistry::new());
        let session = Arc::new(MockSession::new());
        registry.insert("tenant", session.clone());

        let handle = spawn_read_receipt(registry, target(), DEFAULT_READ_DELAY);
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(session.receipts().is_empty());

        handle.await.unwrap();
        assert_eq!(
            session.receipts(),
            vec![(vec!["MSG1".to_string()], ReceiptType::Read)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn read_receipt_dropped_after_logout() {
        let registry = Arc::new(SessionRegistry::new());
        let session = Arc::new(MockSession::new());
        registry.insert("tenant", session.clone());

        let handle = spawn_read_receipt(registry.clone(), target(), DEFAULT_READ_DELAY);
        registry.remove("tenant");
        handle.await.unwrap();
        assert!(session.receipts().is_empty());
    }
}
