// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session events through the router, queue and worker to a live webhook.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wahook_cache::InstanceCache;
use wahook_core::event::{MessageEvent, MessageInfo, ReceiptEvent, WaMessage};
use wahook_core::types::ReceiptType;
use wahook_core::{Jid, RawEvent};
use wahook_delivery::{DeliveryQueue, DeliveryWorker, RecordingSleeper, ReqwestWebhookClient};
use wahook_router::{ConcurrencyLimiter, EventRouter, RouteOutcome};
use wahook_session::SessionRegistry;
use wahook_test_utils::{MockLookup, MockSession, test_instance};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message(id: &str, text: &str) -> RawEvent {
    RawEvent::Message(MessageEvent {
        info: MessageInfo {
            chat: Jid::user("5511"),
            sender: Jid::user("5511"),
            id: id.into(),
            push_name: "Ana".into(),
            ..Default::default()
        },
        message: WaMessage::text(text),
    })
}

#[tokio::test]
async fn events_reach_subscribed_webhooks_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tenant-b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tenant_a = test_instance("tenant-a", &format!("{}/tenant-a", server.uri()));
    let mut tenant_b = test_instance("tenant-b", &format!("{}/tenant-b", server.uri()));
    tenant_b.webhook.events = vec!["CONTACTS_UPSERT".into()];

    let lookup = Arc::new(
        MockLookup::new()
            .with_instance(tenant_a)
            .with_instance(tenant_b),
    );
    let cache = Arc::new(InstanceCache::new(
        lookup.clone(),
        Duration::from_secs(300),
        Duration::from_secs(5),
    ));
    let sessions = Arc::new(SessionRegistry::new());
    sessions.insert("tenant-a", Arc::new(MockSession::new()));
    sessions.insert("tenant-b", Arc::new(MockSession::new()));

    let (queue, rx) = DeliveryQueue::new(32);
    let router = Arc::new(
        EventRouter::new(cache, sessions, queue).with_limiter(ConcurrencyLimiter::new(4)),
    );

    let client = ReqwestWebhookClient::new(Duration::from_secs(5)).unwrap();
    let worker = DeliveryWorker::new(Arc::new(client)).with_sleeper(Arc::new(RecordingSleeper::new()));
    let worker_handle = tokio::spawn(worker.run(rx, CancellationToken::new()));

    let mut handles = Vec::new();
    handles.push(router.spawn("tenant-a", message("M1", "first")).await.unwrap());
    handles.push(router.spawn("tenant-a", message("M2", "second")).await.unwrap());
    handles.push(
        router
            .spawn(
                "tenant-a",
                RawEvent::Receipt(ReceiptEvent {
                    chat: Jid::user("5511"),
                    sender: Jid::user("5511"),
                    message_ids: vec!["M0".into()],
                    receipt_type: ReceiptType::Delivered,
                    ..Default::default()
                }),
            )
            .await
            .unwrap(),
    );
    handles.push(router.spawn("tenant-b", message("M3", "ignored")).await.unwrap());

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    assert_eq!(
        outcomes,
        vec![
            RouteOutcome::Enqueued(1),
            RouteOutcome::Enqueued(1),
            RouteOutcome::Enqueued(1),
            RouteOutcome::Unsubscribed,
        ]
    );

    // dropping the only producer lets the worker drain and stop
    drop(router);
    tokio::time::timeout(Duration::from_secs(10), worker_handle)
        .await
        .expect("worker should drain and exit")
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    let mut events: Vec<String> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            assert_eq!(body["instance"], "tenant-a");
            body["event"].as_str().unwrap().to_string()
        })
        .collect();
    events.sort();
    assert_eq!(events, ["messages.update", "messages.upsert", "messages.upsert"]);
    assert!(lookup.calls() >= 2);
}
