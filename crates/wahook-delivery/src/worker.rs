// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single, sequential delivery worker.
//!
//! Tasks are delivered one at a time in queue order, so a retry backoff for
//! one webhook delays every task behind it. That head-of-line blocking keeps
//! per-queue ordering and caps outbound concurrency at one request.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::WebhookClient;
use crate::queue::{DeliveryReceiver, DeliveryTask};
use crate::retry::{DEFAULT_RETRY_DELAYS, RetrySchedule};
use crate::sleeper::{Sleeper, TokioSleeper};

/// Final result of delivering one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered {
        attempts: usize,
    },
    Abandoned {
        attempts: usize,
        last_status: Option<u16>,
        last_error: Option<String>,
    },
}

impl DeliveryOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            DeliveryOutcome::Delivered { attempts } | DeliveryOutcome::Abandoned { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

pub struct DeliveryWorker {
    client: Arc<dyn WebhookClient>,
    sleeper: Arc<dyn Sleeper>,
    retry_delays: Vec<Duration>,
}

impl DeliveryWorker {
    /// Worker with the default `[2s, 5s, 10s]` backoff and tokio sleeping.
    pub fn new(client: Arc<dyn WebhookClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            retry_delays: DEFAULT_RETRY_DELAYS.to_vec(),
        }
    }

    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Drain `rx` until every producer is gone or `cancel` fires.
    ///
    /// Cancellation is observed between tasks; a task already in its retry
    /// loop runs to completion. Tasks still queued at shutdown are dropped.
    pub async fn run(self, mut rx: DeliveryReceiver, cancel: CancellationToken) {
        info!(retries = self.retry_delays.len(), "delivery worker started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let pending = rx.len();
                    if pending > 0 {
                        warn!(pending, "delivery worker stopping with undelivered tasks");
                    }
                    info!("delivery worker shutting down");
                    break;
                }
                task = rx.recv() => {
                    let Some(task) = task else {
                        info!("delivery queue closed, worker exiting");
                        break;
                    };
                    self.deliver(&task).await;
                }
            }
        }
    }

    /// Deliver one task, retrying per the schedule. Success is HTTP 200 only.
    pub async fn deliver(&self, task: &DeliveryTask) -> DeliveryOutcome {
        let mut schedule = RetrySchedule::new(self.retry_delays.clone());
        let mut last_status = None;
        let mut last_error = None;

        for attempt in schedule.by_ref() {
            if let Some(delay) = attempt.delay_before {
                warn!(
                    attempt = attempt.number,
                    delay_ms = delay.as_millis() as u64,
                    url = %task.url,
                    "retrying webhook after delay"
                );
                self.sleeper.sleep(delay).await;
            }

            wahook_prometheus::record_delivery_attempt();
            match self.client.post(&task.url, task.body.clone()).await {
                Ok(response) if response.status == 200 => {
                    if attempt.number > 1 {
                        info!(attempt = attempt.number, url = %task.url, "webhook succeeded after retry");
                    } else {
                        debug!(url = %task.url, "webhook delivered");
                    }
                    wahook_prometheus::record_delivery("delivered");
                    return DeliveryOutcome::Delivered {
                        attempts: attempt.number,
                    };
                }
                Ok(response) => {
                    warn!(
                        attempt = attempt.number,
                        status = response.status,
                        response = %response.body,
                        url = %task.url,
                        "webhook failed"
                    );
                    last_status = Some(response.status);
                    last_error = Some(format!("status {}: {}", response.status, response.body));
                }
                Err(e) => {
                    error!(attempt = attempt.number, error = %e, url = %task.url, "webhook send failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        let attempts = schedule.attempts_made();
        error!(
            attempts,
            last_status = last_status.unwrap_or_default(),
            last_error = last_error.as_deref().unwrap_or_default(),
            url = %task.url,
            "webhook failed after all retries"
        );
        wahook_prometheus::record_delivery("abandoned");
        DeliveryOutcome::Abandoned {
            attempts,
            last_status,
            last_error,
        }
    }
}
