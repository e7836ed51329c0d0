//! Build pipeline tying the registry, processor and emitter together.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::emitter::IndexEmitter;
use crate::error::{BuildError, BuildResult, RegistryError};
use crate::layout::OutputLayout;
use crate::processor::{ProcessedResource, ResourceProcessor};
use crate::registry::ResourceRegistry;
use crate::utils::empty_dir;
use crate::watcher::{ResourceWatcher, WatchError, WatchEvent};

/// Outcome of processing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOutcome {
    Built(ProcessedResource),
    Skipped { reason: String },
}

impl ResourceOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self, ResourceOutcome::Built(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub name: String,
    pub outcome: ResourceOutcome,
}

/// Per-resource results of a build, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub resources: Vec<ResourceReport>,
    pub index_path: PathBuf,
}

impl BuildReport {
    pub fn built_count(&self) -> usize {
        self.resources
            .iter()
            .filter(|r| r.outcome.is_built())
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources.iter().filter(|r| !r.outcome.is_built())
    }

    /// True when every resource was built.
    pub fn is_clean(&self) -> bool {
        self.built_count() == self.resources.len()
    }
}

/// Process one resource, logging the outcome instead of returning errors.
pub(crate) async fn process_logged(
    processor: &ResourceProcessor,
    name: &str,
    source: &Path,
) -> ResourceOutcome {
    crate::log_event!("build", "building", "`{name}`");

    match processor.process(name, source).await {
        Ok(processed) => {
            crate::log_event!(
                "build",
                "built",
                "`{name}` -> {} ({} bytes)",
                processed.path.display(),
                processed.bytes_in
            );
            ResourceOutcome::Built(processed)
        }
        Err(e) => {
            tracing::warn!("[build] unable to process `{name}`, skipping: {e}");
            ResourceOutcome::Skipped {
                reason: e.to_string(),
            }
        }
    }
}

/// Embeds binary resources as generated source modules.
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let mut reve = reve::Reve::new("/path/to/project", true);
/// reve.add_resource("logo", "./assets/logo.png")?;
/// let report = reve.build().await?;
/// assert!(report.is_clean());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Reve {
    registry: ResourceRegistry,
    processor: ResourceProcessor,
    emitter: IndexEmitter,
    debounce: Duration,
    events: broadcast::Sender<WatchEvent>,
}

impl Reve {
    /// Create an instance rooted at `base` with default settings.
    ///
    /// `enable_compression` is fixed for the lifetime of the instance.
    pub fn new(base: impl Into<PathBuf>, enable_compression: bool) -> Self {
        let settings = Settings {
            compression: enable_compression,
            ..Settings::default()
        };
        Self::with_settings(base, &settings)
    }

    /// Create an instance rooted at `base` using output, codegen and watch
    /// options from `settings`. Resources listed in settings are not added.
    pub fn with_settings(base: impl Into<PathBuf>, settings: &Settings) -> Self {
        let base = base.into();
        let base = std::path::absolute(&base).unwrap_or(base);
        let layout = OutputLayout::from_settings(&base, settings);
        let (events, _) = broadcast::channel(64);

        Self {
            registry: ResourceRegistry::new(base),
            processor: ResourceProcessor::new(layout.clone(), settings.compression),
            emitter: IndexEmitter::new(layout, settings.codegen.clone(), settings.compression),
            debounce: Duration::from_millis(settings.watch.debounce_ms),
            events,
        }
    }

    /// Register a resource. No-op once a build has started.
    pub fn add_resource(
        &mut self,
        name: &str,
        source: impl AsRef<Path>,
    ) -> Result<(), RegistryError> {
        self.registry.add(name, source)
    }

    /// Unregister a resource. No-op once a build has started.
    pub fn remove_resource(&mut self, name: &str) -> bool {
        self.registry.remove(name)
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &OutputLayout {
        self.processor.layout()
    }

    pub fn compression(&self) -> bool {
        self.processor.compression()
    }

    /// Events emitted while watching.
    pub fn subscribe(&self) -> broadcast::Receiver<WatchEvent> {
        self.events.subscribe()
    }

    /// Build every resource and the index module.
    ///
    /// Locks the registry, empties the generated source directory, processes
    /// all resources concurrently and writes the index once all of them have
    /// finished. Resources that fail are logged and reported as skipped.
    pub async fn build(&mut self) -> BuildResult<BuildReport> {
        self.registry.lock();

        let source_dir = self.layout().source_dir();
        empty_dir(&source_dir)
            .await
            .map_err(|e| BuildError::ClearOutput {
                path: source_dir.clone(),
                source: e,
            })?;

        let mut tasks = JoinSet::new();
        for (idx, resource) in self.registry.iter().enumerate() {
            let processor = self.processor.clone();
            let name = resource.name.to_string();
            let source = resource.source.to_path_buf();
            tasks.spawn(async move {
                let outcome = process_logged(&processor, &name, &source).await;
                (idx, outcome)
            });
        }

        let mut outcomes: Vec<Option<ResourceOutcome>> = vec![None; self.registry.len()];
        while let Some(joined) = tasks.join_next().await {
            let (idx, outcome) = joined.map_err(|e| BuildError::TaskFailed {
                reason: e.to_string(),
            })?;
            outcomes[idx] = Some(outcome);
        }

        self.emitter.write_index(&self.registry).await?;

        let resources = self
            .registry
            .names()
            .zip(outcomes)
            .map(|(name, outcome)| ResourceReport {
                name: name.to_string(),
                outcome: outcome.unwrap_or_else(|| ResourceOutcome::Skipped {
                    reason: "not processed".to_string(),
                }),
            })
            .collect();

        let report = BuildReport {
            resources,
            index_path: self.layout().index_path(),
        };
        crate::log_event!(
            "build",
            "finished",
            "{}/{} resources built",
            report.built_count(),
            report.resources.len()
        );
        Ok(report)
    }

    /// Build, then rebuild resources as their sources change.
    ///
    /// Runs until the process exits or every subscription closes.
    pub async fn watch(&mut self) -> Result<(), WatchError> {
        self.watch_until(CancellationToken::new()).await
    }

    /// Like [`Reve::watch`], stopping when `token` is cancelled.
    pub async fn watch_until(&mut self, token: CancellationToken) -> Result<(), WatchError> {
        self.registry.lock();
        self.build().await?;

        let watcher = ResourceWatcher::new(
            &self.registry,
            &self.processor,
            &self.emitter,
            self.debounce,
            self.events.clone(),
        );
        watcher.run(token).await
    }
}
