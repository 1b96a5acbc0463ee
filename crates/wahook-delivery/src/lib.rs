// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook delivery for the wahook gateway.
//!
//! Producers push [`DeliveryTask`]s onto a bounded [`DeliveryQueue`]; a single
//! [`DeliveryWorker`] drains it in order, POSTing each body and retrying on the
//! configured [`RetrySchedule`]. Delivery is best effort: tasks are held in
//! memory only and abandoned after the last attempt.

pub mod client;
pub mod queue;
pub mod retry;
pub mod sleeper;
pub mod worker;

pub use client::{ReqwestWebhookClient, WebhookClient, WebhookResponse};
pub use queue::{DeliveryQueue, DeliveryReceiver, DeliveryTask};
pub use retry::{Attempt, RetrySchedule};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
pub use worker::{DeliveryOutcome, DeliveryWorker};
