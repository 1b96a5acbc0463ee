// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event router: one raw session event in, zero or more queued webhook
//! deliveries out.
//!
//! Every event holds a limiter permit while it is resolved, filtered,
//! converted and enqueued. Events are independent of each other; ordering
//! within an instance is only as strong as task scheduling makes it.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use wahook_cache::InstanceCache;
use wahook_core::event::{MessageEvent, MessageInfo, RawEvent, ReceiptEvent};
use wahook_core::payload::{
    ConnectionStatus, ConnectionUpdateData, Contact, ContactUpsertData, NotificationData,
    NotificationPayload,
};
use wahook_core::{EventKind, Instance, Jid, SessionRuntime, WahookError};
use wahook_delivery::{DeliveryQueue, DeliveryTask};
use wahook_prometheus::{record_event, set_limiter_available};
use wahook_session::{SessionHandle, SessionRegistry};

use crate::convert::contact::plan_contacts;
use crate::convert::message::{MessageIds, build_message_data, message_time, parse_message};
use crate::convert::receipt::convert_receipt;
use crate::limiter::{ConcurrencyLimiter, LimiterPermit};
use crate::media::MediaRelay;
use crate::receipts::{
    DEFAULT_READ_DELAY, ReceiptTarget, spawn_delivery_receipt, spawn_read_receipt, wants_receipts,
};

/// What became of one routed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// This many notifications were queued.
    Enqueued(usize),
    /// No instance is configured for the id.
    UnknownInstance,
    /// The event type has no notification mapping.
    Ignored,
    /// The instance does not subscribe to this kind, or has no webhook.
    Unsubscribed,
    /// Dropped by the instance's content policy.
    Filtered,
    /// Conversion produced nothing to send.
    Dropped,
    /// The delivery queue rejected the notification.
    Failed,
}

impl RouteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteOutcome::Enqueued(_) => "enqueued",
            RouteOutcome::UnknownInstance => "unknown_instance",
            RouteOutcome::Ignored => "ignored",
            RouteOutcome::Unsubscribed => "unsubscribed",
            RouteOutcome::Filtered => "filtered",
            RouteOutcome::Dropped => "dropped",
            RouteOutcome::Failed => "failed",
        }
    }
}

pub struct EventRouter {
    cache: Arc<InstanceCache>,
    sessions: Arc<SessionRegistry>,
    queue: DeliveryQueue,
    limiter: ConcurrencyLimiter,
    media: MediaRelay,
    http: reqwest::Client,
    read_delay: Duration,
}

impl EventRouter {
    pub fn new(cache: Arc<InstanceCache>, sessions: Arc<SessionRegistry>, queue: DeliveryQueue) -> Self {
        Self {
            cache,
            sessions,
            queue,
            limiter: ConcurrencyLimiter::default(),
            media: MediaRelay::default(),
            http: reqwest::Client::new(),
            read_delay: DEFAULT_READ_DELAY,
        }
    }

    pub fn with_limiter(mut self, limiter: ConcurrencyLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_media(mut self, media: MediaRelay) -> Self {
        self.media = media;
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Route one event inline, waiting for a limiter slot first.
    pub async fn handle(&self, instance_id: &str, event: RawEvent) -> RouteOutcome {
        match self.limiter.acquire().await {
            Ok(permit) => self.process(instance_id, event, permit).await,
            Err(e) => {
                error!(instance_id, error = %e, "failed to acquire event permit");
                RouteOutcome::Failed
            }
        }
    }

    /// Route one event on its own task.
    ///
    /// The limiter slot is taken before the task is spawned, so a saturated
    /// router blocks the producer here instead of piling up tasks.
    pub async fn spawn(
        self: &Arc<Self>,
        instance_id: impl Into<String>,
        event: RawEvent,
    ) -> Result<JoinHandle<RouteOutcome>, WahookError> {
        let permit = self.limiter.acquire().await?;
        set_limiter_available(self.limiter.available());
        let router = Arc::clone(self);
        let instance_id = instance_id.into();
        Ok(tokio::spawn(async move {
            router.process(&instance_id, event, permit).await
        }))
    }

    async fn process(&self, instance_id: &str, event: RawEvent, permit: LimiterPermit) -> RouteOutcome {
        set_limiter_available(self.limiter.available());
        let type_name = event.type_name().to_string();
        let outcome = self.route(instance_id, event).await;
        drop(permit);
        set_limiter_available(self.limiter.available());
        record_event(&type_name, outcome.as_str());
        outcome
    }

    async fn route(&self, instance_id: &str, event: RawEvent) -> RouteOutcome {
        if let RawEvent::LoggedOut(e) = &event {
            info!(instance_id, reason = %e.reason, "session logged out");
            return self.handle_logged_out(instance_id).await;
        }

        let Some(instance) = self.cache.get(instance_id).await else {
            warn!(instance_id, event_type = event.type_name(), "no instance found for event");
            return RouteOutcome::UnknownInstance;
        };

        let Some(kind) = event.kind() else {
            debug!(instance_id, event_type = event.type_name(), "unhandled event type");
            return RouteOutcome::Ignored;
        };
        if !instance.subscription().accepts(kind) {
            return RouteOutcome::Unsubscribed;
        }
        if instance.webhook.url.trim().is_empty() {
            debug!(instance_id, %kind, "instance has no webhook url");
            return RouteOutcome::Unsubscribed;
        }
        if is_filtered(&instance, &event) {
            debug!(instance_id, event_type = event.type_name(), "event filtered by instance policy");
            return RouteOutcome::Filtered;
        }

        let payloads: Vec<NotificationPayload> = match &event {
            RawEvent::Message(e) => self.convert_message(&instance, e).await.into_iter().collect(),
            RawEvent::Receipt(e) => self.convert_receipt(&instance, e).await,
            other => self.convert_contacts(&instance, other).await.into_iter().collect(),
        };
        if payloads.is_empty() {
            return RouteOutcome::Dropped;
        }

        let mut queued = 0;
        for payload in payloads {
            match self.enqueue(&instance, &payload).await {
                Ok(()) => queued += 1,
                Err(e) => {
                    error!(instance_id, %kind, error = %e, "failed to enqueue notification");
                    return RouteOutcome::Failed;
                }
            }
        }
        RouteOutcome::Enqueued(queued)
    }

    /// Queue a `connection.update` if the instance is known and subscribed.
    /// Returns whether a notification was queued.
    pub async fn emit_connection_update(&self, instance_id: &str, status: ConnectionStatus) -> bool {
        let Some(instance) = self.cache.get(instance_id).await else {
            warn!(instance_id, "no instance found for connection event");
            return false;
        };
        if !instance.subscription().accepts(EventKind::ConnectionUpdate)
            || instance.webhook.url.trim().is_empty()
        {
            return false;
        }

        let payload = NotificationPayload::new(
            instance.id.clone(),
            NotificationData::ConnectionUpdate(ConnectionUpdateData {
                instance: instance.id.clone(),
                status,
            }),
            Utc::now(),
        );
        info!(instance_id, %status, "emitting connection update");
        match self.enqueue(&instance, &payload).await {
            Ok(()) => true,
            Err(e) => {
                error!(instance_id, error = %e, "failed to enqueue connection update");
                false
            }
        }
    }

    async fn handle_logged_out(&self, instance_id: &str) -> RouteOutcome {
        let emitted = self
            .emit_connection_update(instance_id, ConnectionStatus::Close)
            .await;

        // The session leaves the registry even when the credential cannot be deleted.
        if let Some(session) = self.sessions.remove(instance_id)
            && let Err(e) = session.delete_device().await
        {
            error!(instance_id, error = %e, "failed to delete device for instance");
        }

        if emitted {
            RouteOutcome::Enqueued(1)
        } else {
            RouteOutcome::Dropped
        }
    }

    async fn enqueue(&self, instance: &Instance, payload: &NotificationPayload) -> Result<(), WahookError> {
        let task = DeliveryTask::from_payload(instance.webhook.url.trim(), payload)?;
        self.queue.enqueue(task).await
    }

    async fn convert_message(&self, instance: &Instance, event: &MessageEvent) -> Option<NotificationPayload> {
        let Some(session) = self.sessions.get(&instance.id) else {
            warn!(instance_id = %instance.id, message_id = %event.info.id, "no session for message event");
            return None;
        };

        let parsed = parse_message(event.message.unwrap_raw());
        if parsed.is_unknown() {
            error!(
                instance_id = %instance.id,
                message_id = %event.info.id,
                "message has no recognised content"
            );
            return None;
        }
        let attachment = parsed.attachment;

        let (remote_jid, remote_lid) = session.resolve_jid_lid(&event.info.chat).await;
        let ids = MessageIds {
            remote_jid,
            remote_lid,
            participant: jid_string(&event.info.sender),
        };
        let now = Utc::now();
        let date_time = message_time(event, now);
        let mut data = build_message_data(&instance.id, event, parsed, ids, now);

        if let Some((kind, media)) = attachment {
            let relayed = self
                .media
                .fetch(session.as_ref(), media, kind, instance.webhook.inline_media)
                .await;
            data.message.media_url = relayed.url;
            data.message.base64 = relayed.base64;
        }

        self.send_receipts(instance, &session, &event.info);

        debug!(
            instance_id = %instance.id,
            message_id = %data.key.id,
            message_type = %data.message_type,
            "message event"
        );
        Some(NotificationPayload::new(
            instance.id.clone(),
            NotificationData::Message(Box::new(data)),
            date_time,
        ))
    }

    fn send_receipts(&self, instance: &Instance, session: &SessionHandle, info: &MessageInfo) {
        if !wants_receipts(info) {
            return;
        }
        let target = ReceiptTarget::from_info(&instance.id, info);
        if instance.auto_receipt {
            spawn_delivery_receipt(Arc::clone(session), target.clone());
        }
        if instance.read_messages {
            spawn_read_receipt(Arc::clone(&self.sessions), target, self.read_delay);
        }
    }

    async fn convert_receipt(&self, instance: &Instance, event: &ReceiptEvent) -> Vec<NotificationPayload> {
        let session = self.sessions.get(&instance.id);
        let chat = resolve(session.as_ref(), &event.chat).await;
        let (participant, _) = resolve(session.as_ref(), &event.sender).await;
        let date_time = event.timestamp.unwrap_or_else(Utc::now);

        convert_receipt(&instance.id, event, chat, participant)
            .into_iter()
            .map(|update| {
                NotificationPayload::new(
                    instance.id.clone(),
                    NotificationData::MessageUpdate(update),
                    date_time,
                )
            })
            .collect()
    }

    async fn convert_contacts(&self, instance: &Instance, event: &RawEvent) -> Option<NotificationPayload> {
        let plans = plan_contacts(event);
        if plans.is_empty() {
            debug!(instance_id = %instance.id, event_type = event.type_name(), "no contact to emit");
            return None;
        }

        let session = self.sessions.get(&instance.id);
        let mut contacts = Vec::with_capacity(plans.len());
        for plan in plans {
            let (url, base64) = match &session {
                Some(session) => self.profile_picture(session.as_ref(), &plan.jid, plan.with_base64).await,
                None => (String::new(), String::new()),
            };
            if plan.require_picture && url.is_empty() {
                continue;
            }
            let (remote_jid, remote_lid) = resolve(session.as_ref(), &plan.jid).await;
            contacts.push(Contact {
                remote_jid,
                remote_lid,
                push_name: plan.name,
                profile_pic_url: url,
                base64_pic: base64,
                instance_id: instance.id.clone(),
            });
        }
        if contacts.is_empty() {
            return None;
        }

        Some(NotificationPayload::new(
            instance.id.clone(),
            NotificationData::ContactUpsert(ContactUpsertData(contacts)),
            Utc::now(),
        ))
    }

    /// Preview picture URL and, when asked, its bytes as base64. Best effort.
    async fn profile_picture(&self, session: &dyn SessionRuntime, jid: &Jid, with_base64: bool) -> (String, String) {
        let picture = match session.profile_picture(jid).await {
            Ok(Some(picture)) => picture,
            Ok(None) => return (String::new(), String::new()),
            Err(e) => {
                debug!(%jid, error = %e, "failed to get profile picture");
                return (String::new(), String::new());
            }
        };
        if !with_base64 {
            return (picture.url, String::new());
        }

        match self.fetch_base64(&picture.url).await {
            Ok(encoded) => (picture.url, encoded),
            Err(e) => {
                error!(%jid, url = %picture.url, error = %e, "failed to fetch profile picture");
                (picture.url, String::new())
            }
        }
    }

    async fn fetch_base64(&self, url: &str) -> Result<String, reqwest::Error> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(STANDARD.encode(&bytes))
    }
}

/// Content policy. Status broadcasts never produce message notifications.
fn is_filtered(instance: &Instance, event: &RawEvent) -> bool {
    let skip_group = |jid: &Jid, is_group: bool| instance.skip_groups && (is_group || jid.is_group());
    let skip_broadcast = |jid: &Jid| instance.skip_broadcasts && jid.is_broadcast();

    match event {
        RawEvent::Message(e) => {
            let info = &e.info;
            info.chat.is_status_broadcast()
                || skip_broadcast(&info.chat)
                || skip_group(&info.chat, info.is_group)
                || (instance.skip_own_messages && info.is_from_me)
        }
        RawEvent::Receipt(e) => skip_broadcast(&e.chat) || skip_group(&e.chat, e.is_group),
        RawEvent::Contact(e) => skip_group(&e.jid, false),
        RawEvent::PushName(e) => skip_group(&e.jid, false),
        RawEvent::GroupInfo(_) => instance.skip_groups,
        _ => false,
    }
}

fn jid_string(jid: &Jid) -> String {
    if jid.is_empty() {
        String::new()
    } else {
        jid.to_non_device().to_string()
    }
}

/// `(jid, lid)` via the session, or the bare jid when no session is live.
async fn resolve(session: Option<&SessionHandle>, jid: &Jid) -> (String, String) {
    match session {
        Some(session) => session.resolve_jid_lid(jid).await,
        None => (jid_string(jid), String::new()),
    }
}
