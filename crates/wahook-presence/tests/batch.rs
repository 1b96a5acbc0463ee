// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use wahook_presence::PresenceScheduler;
use wahook_session::SessionRegistry;
use wahook_test_utils::MockSession;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn large_batch_with_few_workers_refreshes_everyone() {
    let registry = Arc::new(SessionRegistry::new());
    let mut sessions = Vec::new();
    for i in 0..50 {
        let id = format!("tenant-{i}");
        let session = Arc::new(MockSession::new());
        registry.insert(id.clone(), session.clone());
        registry.enable_always_online(id);
        sessions.push(session);
    }

    let report = PresenceScheduler::new(Arc::clone(&registry))
        .with_workers(3)
        .run_batch()
        .await;

    assert_eq!(report.processed, 50);
    assert_eq!(report.refreshed, 50);
    assert!(sessions.iter().all(|s| s.presence_count() == 1));
    assert_eq!(registry.always_online_ids().len(), 50);
}

#[tokio::test]
async fn disabled_instances_are_not_refreshed() {
    let registry = Arc::new(SessionRegistry::new());
    let session = Arc::new(MockSession::new());
    registry.insert("tenant", session.clone());
    registry.enable_always_online("tenant");
    assert!(registry.disable_always_online("tenant"));

    let report = PresenceScheduler::new(registry).run_batch().await;
    assert_eq!(report.processed, 0);
    assert_eq!(session.presence_count(), 0);
}
