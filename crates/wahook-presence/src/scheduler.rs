// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use wahook_core::types::Presence;
use wahook_prometheus::record_presence_refresh;
use wahook_session::SessionRegistry;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_WORKERS: usize = 20;

/// Tally of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub refreshed: usize,
    pub failed: usize,
    /// Flags dropped because the session no longer exists.
    pub cleared: usize,
    /// Sessions not connected or not logged in.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    Refreshed,
    Failed,
    Cleared,
    Skipped,
}

impl Refresh {
    fn as_str(self) -> &'static str {
        match self {
            Refresh::Refreshed => "refreshed",
            Refresh::Failed => "failed",
            Refresh::Cleared => "cleared",
            Refresh::Skipped => "skipped",
        }
    }
}

pub struct PresenceScheduler {
    sessions: Arc<SessionRegistry>,
    interval: Duration,
    workers: usize,
}

impl PresenceScheduler {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self {
            sessions,
            interval: DEFAULT_INTERVAL,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Concurrent refreshes per batch (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run a batch immediately, then one every interval until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            workers = self.workers,
            "presence scheduler started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("presence scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_batch().await;
                }
            }
        }
    }

    /// Refresh every flagged instance once and wait for all of them.
    pub async fn run_batch(&self) -> BatchReport {
        let ids = self.sessions.always_online_ids();
        let mut report = BatchReport::default();
        if ids.is_empty() {
            return report;
        }
        info!(total_instances = ids.len(), "processing always-online batch");

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();
        for id in ids {
            let sessions = Arc::clone(&self.sessions);
            let permits = Arc::clone(&permits);
            set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                Some(refresh(&sessions, &id).await)
            });
        }

        while let Some(joined) = set.join_next().await {
            report.processed += 1;
            match joined {
                Ok(Some(Refresh::Refreshed)) => report.refreshed += 1,
                Ok(Some(Refresh::Cleared)) => report.cleared += 1,
                Ok(Some(Refresh::Skipped)) => report.skipped += 1,
                Ok(Some(Refresh::Failed)) | Ok(None) => report.failed += 1,
                Err(e) => {
                    error!(error = %e, "presence refresh task failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            refreshed = report.refreshed,
            cleared = report.cleared,
            skipped = report.skipped,
            "always-online batch completed"
        );
        report
    }
}

async fn refresh(sessions: &SessionRegistry, id: &str) -> Refresh {
    let outcome = match sessions.get(id) {
        None => {
            sessions.disable_always_online(id);
            debug!(instance_id = id, "session gone, always-online cleared");
            Refresh::Cleared
        }
        Some(session) if !session.is_connected() || !session.is_logged_in() => {
            debug!(instance_id = id, "skipping always-online, session not connected");
            Refresh::Skipped
        }
        Some(session) => match session.send_presence(Presence::Available).await {
            Ok(()) => Refresh::Refreshed,
            Err(e) => {
                debug!(instance_id = id, error = %e, "failed to send presence");
                Refresh::Failed
            }
        },
    };
    record_presence_refresh(outcome.as_str());
    outcome
}
