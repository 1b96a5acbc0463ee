// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded in-memory queue of pending webhook deliveries.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use wahook_core::{NotificationPayload, WahookError};

/// One serialized notification bound for one webhook URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTask {
    pub url: String,
    pub body: Bytes,
}

impl DeliveryTask {
    pub fn new(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Serialize `payload` as the JSON request body.
    pub fn from_payload(url: impl Into<String>, payload: &NotificationPayload) -> Result<Self, WahookError> {
        let body = serde_json::to_vec(payload).map_err(|e| {
            WahookError::Conversion(format!("failed to serialize {} payload: {e}", payload.event))
        })?;
        Ok(Self::new(url, body))
    }
}

/// Receiving half, owned by the delivery worker.
pub type DeliveryReceiver = mpsc::Receiver<DeliveryTask>;

/// Producer handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    tx: mpsc::Sender<DeliveryTask>,
}

impl DeliveryQueue {
    /// Create a queue holding at most `capacity` pending tasks.
    pub fn new(capacity: usize) -> (Self, DeliveryReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Push a task, waiting for space when the queue is full.
    pub async fn enqueue(&self, task: DeliveryTask) -> Result<(), WahookError> {
        self.tx
            .send(task)
            .await
            .map_err(|_| WahookError::Internal("delivery queue closed".into()))
    }

    /// Push without waiting. Hands the task back when full or closed.
    pub fn try_enqueue(&self, task: DeliveryTask) -> Result<(), DeliveryTask> {
        self.tx.try_send(task).map_err(|e| match e {
            TrySendError::Full(task) | TrySendError::Closed(task) => task,
        })
    }

    /// Free slots right now.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use wahook_core::payload::{ConnectionStatus, ConnectionUpdateData};
    use wahook_core::NotificationData;

    #[tokio::test]
    async fn enqueue_preserves_order() {
        let (queue, mut rx) = DeliveryQueue::new(4);
        queue.enqueue(DeliveryTask::new("http://a", "1")).await.unwrap();
        queue.enqueue(DeliveryTask::new("http://a", "2")).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().body, Bytes::from("1"));
        assert_eq!(rx.recv().await.unwrap().body, Bytes::from("2"));
    }

    #[tokio::test]
    async fn try_enqueue_returns_task_when_full() {
        let (queue, _rx) = DeliveryQueue::new(1);
        assert!(queue.try_enqueue(DeliveryTask::new("http://a", "1")).is_ok());
        let rejected = queue.try_enqueue(DeliveryTask::new("http://a", "2")).unwrap_err();
        assert_eq!(rejected.body, Bytes::from("2"));
        assert_eq!(queue.capacity(), 0);
        assert_eq!(queue.max_capacity(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_waits_for_space() {
        let (queue, mut rx) = DeliveryQueue::new(1);
        queue.enqueue(DeliveryTask::new("http://a", "1")).await.unwrap();

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(DeliveryTask::new("http://a", "2")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished());

        rx.recv().await.unwrap();
        producer.await.unwrap().unwrap();
        assert_eq!(rx.recv().await.unwrap().body, Bytes::from("2"));
    }

    #[tokio::test]
    async fn enqueue_after_close_fails() {
        let (queue, rx) = DeliveryQueue::new(1);
        drop(rx);
        assert!(queue.is_closed());
        let err = queue.enqueue(DeliveryTask::new("http://a", "1")).await.unwrap_err();
        assert!(matches!(err, WahookError::Internal(_)));
    }

    #[test]
    fn from_payload_serializes_json() {
        let payload = NotificationPayload::new(
            "tenant",
            NotificationData::ConnectionUpdate(ConnectionUpdateData {
                instance: "tenant".into(),
                status: ConnectionStatus::Open,
            }),
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        );
        let task = DeliveryTask::from_payload("http://hook", &payload).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&task.body).unwrap();
        assert_eq!(json["event"], "connection.update");
        assert_eq!(json["data"]["status"], "open");
        assert_eq!(task.url, "http://hook");
    }
}
