//! Watch loop: subscriptions -> debouncer -> rebuild.

use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::emitter::IndexEmitter;
use crate::pipeline::{ResourceOutcome, process_logged};
use crate::processor::ResourceProcessor;
use crate::registry::ResourceRegistry;

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::subscription::{ResourceChange, Subscription};

/// Notifications published while watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Subscriptions are open; changes from now on are picked up.
    Ready { watching: usize },
    /// A resource was re-processed and the index rewritten.
    Rebuilt { name: String, built: bool },
}

/// Rebuilds resources when their sources change.
pub struct ResourceWatcher<'a> {
    registry: &'a ResourceRegistry,
    processor: &'a ResourceProcessor,
    emitter: &'a IndexEmitter,
    debouncer: Debouncer,
    events: broadcast::Sender<WatchEvent>,
}

/// Sleep until `deadline`, or forever if there is none.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

impl<'a> ResourceWatcher<'a> {
    pub fn new(
        registry: &'a ResourceRegistry,
        processor: &'a ResourceProcessor,
        emitter: &'a IndexEmitter,
        debounce: Duration,
        events: broadcast::Sender<WatchEvent>,
    ) -> Self {
        Self {
            registry,
            processor,
            emitter,
            debouncer: Debouncer::new(debounce),
            events,
        }
    }

    /// Open one subscription per resource.
    ///
    /// A resource whose directory cannot be watched is logged and left out;
    /// the others keep working.
    fn subscribe_all(&self, tx: &mpsc::Sender<ResourceChange>) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(self.registry.len());

        for resource in self.registry.iter() {
            match Subscription::open(resource.name, resource.source, tx.clone()) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => {
                    tracing::warn!("[watcher] not watching `{}`: {e}", resource.name);
                }
            }
        }

        subscriptions
    }

    /// Run until `token` is cancelled or all subscriptions close.
    pub async fn run(mut self, token: CancellationToken) -> Result<(), WatchError> {
        let (tx, mut rx) = mpsc::channel(256);
        let subscriptions = self.subscribe_all(&tx);
        // Only subscriptions hold senders from here on
        drop(tx);

        if subscriptions.is_empty() {
            tracing::warn!("[watcher] no resources to watch");
        } else {
            crate::log_event!(
                "watcher",
                "monitoring",
                "{} resources, {}ms debounce",
                subscriptions.len(),
                self.debouncer.delay().as_millis()
            );
        }
        let _ = self.events.send(WatchEvent::Ready {
            watching: subscriptions.len(),
        });

        loop {
            let deadline = self.debouncer.next_deadline();

            tokio::select! {
                _ = token.cancelled() => {
                    crate::log_event!("watcher", "stopped");
                    break;
                }

                change = rx.recv() => match change {
                    Some(change) => {
                        crate::debug_event!("watcher", "change", "`{}` {:?}", change.name, change.kind);
                        self.debouncer.record(&change.name, Instant::now());
                    }
                    None => {
                        crate::log_event!("watcher", "subscriptions closed");
                        break;
                    }
                },

                _ = wait_for(deadline) => {
                    for name in self.debouncer.take_ready(Instant::now()) {
                        self.rebuild(&name).await;
                    }
                }
            }
        }

        drop(subscriptions);
        Ok(())
    }

    /// Re-process one resource and rewrite the index.
    async fn rebuild(&self, name: &str) {
        let Some(resource) = self.registry.get(name) else {
            return;
        };

        let outcome = process_logged(self.processor, resource.name, resource.source).await;

        if let Err(e) = self.emitter.write_index(self.registry).await {
            tracing::error!("[watcher] failed to rewrite index: {e}");
        }

        let _ = self.events.send(WatchEvent::Rebuilt {
            name: name.to_string(),
            built: matches!(outcome, ResourceOutcome::Built(_)),
        });
    }
}
