// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assembled gateway: configuration in, running components out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use wahook_cache::InstanceCache;
use wahook_config::WahookConfig;
use wahook_core::payload::ConnectionStatus;
use wahook_core::{BlobStorage, InstanceLookup, RawEvent, WahookError};
use wahook_delivery::{
    DeliveryQueue, DeliveryReceiver, DeliveryWorker, ReqwestWebhookClient, Sleeper, WebhookClient,
};
use wahook_presence::PresenceScheduler;
use wahook_router::{ConcurrencyLimiter, EventRouter, HttpBlobStorage, MediaRelay};
use wahook_session::{Commands, SessionHandle, SessionRegistry};

use crate::lookup::StaticInstanceLookup;

/// Builds a [`Gateway`] from configuration.
///
/// Collaborators left unset are derived from the config: instances come from
/// `[[instances]]`, blob storage from `[storage]` and the webhook client from
/// `[delivery]`.
pub struct GatewayBuilder {
    config: WahookConfig,
    lookup: Option<Arc<dyn InstanceLookup>>,
    blob: Option<Arc<dyn BlobStorage>>,
    client: Option<Arc<dyn WebhookClient>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl GatewayBuilder {
    pub fn new(config: WahookConfig) -> Self {
        Self {
            config,
            lookup: None,
            blob: None,
            client: None,
            sleeper: None,
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn InstanceLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_blob_storage(mut self, blob: Arc<dyn BlobStorage>) -> Self {
        self.blob = Some(blob);
        self
    }

    pub fn with_webhook_client(mut self, client: Arc<dyn WebhookClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace the retry backoff sleeper (tests).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn build(self) -> Result<Gateway, WahookError> {
        let config = self.config;

        let lookup: Arc<dyn InstanceLookup> = match self.lookup {
            Some(lookup) => lookup,
            None => {
                let lookup = StaticInstanceLookup::from_config(&config);
                info!(instances = lookup.len(), "loaded static instances");
                Arc::new(lookup)
            }
        };

        let blob: Option<Arc<dyn BlobStorage>> = match self.blob {
            Some(blob) => Some(blob),
            None if config.storage.enabled => {
                let base_url = config.storage.base_url.as_deref().ok_or_else(|| {
                    WahookError::Config("storage.base_url is required when storage is enabled".into())
                })?;
                let storage = HttpBlobStorage::new(
                    base_url,
                    config.storage.auth_token.clone(),
                    config.router.media_timeout(),
                )?;
                Some(Arc::new(storage) as Arc<dyn BlobStorage>)
            }
            None => None,
        };

        let client: Arc<dyn WebhookClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestWebhookClient::new(config.delivery.request_timeout())?),
        };

        let cache = Arc::new(InstanceCache::new(
            lookup,
            config.cache.ttl(),
            config.cache.lookup_timeout(),
        ));
        let sessions = Arc::new(SessionRegistry::new());
        let (queue, rx) = DeliveryQueue::new(config.delivery.buffer_size);

        let mut worker =
            DeliveryWorker::new(client).with_retry_delays(config.delivery.retry_delays());
        if let Some(sleeper) = self.sleeper {
            worker = worker.with_sleeper(sleeper);
        }

        let router = EventRouter::new(Arc::clone(&cache), Arc::clone(&sessions), queue)
            .with_limiter(ConcurrencyLimiter::new(config.router.semaphore_size))
            .with_media(MediaRelay::new(blob, config.router.media_timeout()))
            .with_read_delay(config.router.read_delay());

        let presence = config.presence.enabled.then(|| {
            PresenceScheduler::new(Arc::clone(&sessions))
                .with_interval(config.presence.interval())
                .with_workers(config.presence.workers)
        });

        Ok(Gateway {
            commands: Commands::new(Arc::clone(&sessions)),
            router: Arc::new(router),
            cache,
            sessions,
            sweep_interval: config.cache.sweep_interval(),
            background: Mutex::new(Some(Background { worker, rx, presence })),
        })
    }
}

/// Tasks that can only be started once.
struct Background {
    worker: DeliveryWorker,
    rx: DeliveryReceiver,
    presence: Option<PresenceScheduler>,
}

/// Wired gateway components.
///
/// Sessions are attached with [`Gateway::connect`], which pumps their event
/// stream through the router. Background work (delivery, cache sweep,
/// presence refresh) runs once [`Gateway::start`] has been called.
pub struct Gateway {
    router: Arc<EventRouter>,
    cache: Arc<InstanceCache>,
    sessions: Arc<SessionRegistry>,
    commands: Commands,
    sweep_interval: Duration,
    background: Mutex<Option<Background>>,
}

impl Gateway {
    pub fn builder(config: WahookConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    /// Build with every collaborator derived from `config`.
    pub fn from_config(config: WahookConfig) -> Result<Self, WahookError> {
        GatewayBuilder::new(config).build()
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn cache(&self) -> &Arc<InstanceCache> {
        &self.cache
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    /// Spawn the delivery worker, cache sweeper and presence scheduler.
    ///
    /// All of them stop when `cancel` fires. Fails if called twice.
    pub fn start(&self, cancel: CancellationToken) -> Result<Vec<JoinHandle<()>>, WahookError> {
        let background = self
            .background
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or_else(|| WahookError::Internal("gateway already started".into()))?;

        let mut handles = Vec::with_capacity(3);
        let Background { worker, rx, presence } = background;

        handles.push(tokio::spawn(worker.run(rx, cancel.clone())));
        handles.push(self.cache.spawn_sweeper(self.sweep_interval, cancel.clone()));
        match presence {
            Some(scheduler) => handles.push(tokio::spawn(scheduler.run(cancel))),
            None => info!("presence scheduler disabled"),
        }

        info!(tasks = handles.len(), "gateway background tasks started");
        Ok(handles)
    }

    /// Attach a live session and route its events.
    ///
    /// Registers the handle, flags the instance always-online when its policy
    /// says so, announces `open` and spawns a task that hands every event to
    /// the router. The task ends with the stream.
    pub async fn connect<S>(&self, instance_id: &str, session: SessionHandle, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = RawEvent> + Send + 'static,
    {
        if self.sessions.insert(instance_id, session).is_some() {
            warn!(instance_id, "replaced existing session");
        }

        match self.cache.get(instance_id).await {
            Some(instance) if instance.always_online => {
                self.sessions.enable_always_online(instance_id);
                debug!(instance_id, "always-online enabled");
            }
            Some(_) => {}
            None => warn!(instance_id, "session connected for unknown instance"),
        }

        self.router
            .emit_connection_update(instance_id, ConnectionStatus::Open)
            .await;
        info!(instance_id, "session connected");

        let router = Arc::clone(&self.router);
        let instance_id = instance_id.to_string();
        tokio::spawn(async move {
            let mut events = std::pin::pin!(events);
            while let Some(event) = events.next().await {
                if let Err(e) = router.spawn(instance_id.as_str(), event).await {
                    error!(instance_id = %instance_id, error = %e, "failed to dispatch event");
                    break;
                }
            }
            debug!(instance_id = %instance_id, "session event stream ended");
        })
    }

    /// Detach a session without logging it out.
    ///
    /// Returns whether a session was registered.
    pub fn disconnect(&self, instance_id: &str) -> bool {
        self.sessions.disable_always_online(instance_id);
        let removed = self.sessions.remove(instance_id).is_some();
        if removed {
            info!(instance_id, "session disconnected");
        }
        removed
    }
}
