// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use wahook_core::event::ReceiptEvent;
use wahook_core::payload::{MessageUpdateData, MessageUpdateStatus};
use wahook_core::types::ReceiptType;

/// Wire status for a receipt type. Only read and delivered receipts are reported.
pub fn status_for(receipt_type: ReceiptType) -> Option<MessageUpdateStatus> {
    match receipt_type {
        ReceiptType::Read => Some(MessageUpdateStatus::Read),
        ReceiptType::Delivered => Some(MessageUpdateStatus::DeliveryAck),
        _ => None,
    }
}

/// One update per acknowledged message id. Empty when the receipt type is not reported.
pub fn convert_receipt(
    instance_id: &str,
    event: &ReceiptEvent,
    (remote_jid, remote_lid): (String, String),
    participant: String,
) -> Vec<MessageUpdateData> {
    let Some(status) = status_for(event.receipt_type) else {
        return Vec::new();
    };

    event
        .message_ids
        .iter()
        .map(|id| MessageUpdateData {
            message_id: id.clone(),
            key_id: id.clone(),
            remote_jid: remote_jid.clone(),
            remote_lid: remote_lid.clone(),
            from_me: event.is_from_me,
            participant: participant.clone(),
            status,
            instance_id: instance_id.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wahook_core::Jid;

    fn receipt(receipt_type: ReceiptType, ids: &[&str]) -> ReceiptEvent {
        ReceiptEvent {
            chat: Jid::user("5511"),
            sender: Jid::user("5511"),
            message_ids: ids.iter().map(|s| s.to_string()).collect(),
            receipt_type,
            ..Default::default()
        }
    }

    fn ids() -> (String, String) {
        ("5511@s.whatsapp.net".into(), "77@lid".into())
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ReceiptType::Read), Some(MessageUpdateStatus::Read));
        assert_eq!(
            status_for(ReceiptType::Delivered),
            Some(MessageUpdateStatus::DeliveryAck)
        );
        for other in [
            ReceiptType::ReadSelf,
            ReceiptType::Played,
            ReceiptType::Sender,
            ReceiptType::Retry,
            ReceiptType::Server,
            ReceiptType::Inactive,
        ] {
            assert_eq!(status_for(other), None, "{other:?}");
        }
    }

    #[test]
    fn one_update_per_id() {
        let ev = receipt(ReceiptType::Read, &["A", "B", "C"]);
        let updates = convert_receipt("tenant", &ev, ids(), "5511@s.whatsapp.net".into());
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[1].message_id, "B");
        assert_eq!(updates[1].key_id, "B");
        assert_eq!(updates[1].remote_lid, "77@lid");
        assert!(updates.iter().all(|u| u.status == MessageUpdateStatus::Read));
        assert!(updates.iter().all(|u| u.instance_id == "tenant"));
    }

    #[test]
    fn unreported_type_yields_nothing() {
        let ev = receipt(ReceiptType::Played, &["A"]);
        assert!(convert_receipt("tenant", &ev, ids(), String::new()).is_empty());
    }
}
