//! Filesystem change subscriptions, one per resource.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;

/// Kind of change that can trigger a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
}

impl ChangeKind {
    /// Map a notify event kind; `None` for kinds that never trigger a rebuild.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Created),
            EventKind::Modify(_) => Some(ChangeKind::Modified),
            _ => None,
        }
    }
}

/// A change to one resource's source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    pub name: String,
    pub kind: ChangeKind,
}

/// Watches the source file of a single resource.
///
/// The parent directory is watched (non-recursively) so that editors that
/// save by replacing the file are still seen. Only events for the source's
/// file name are forwarded. Dropping the subscription stops the watch and
/// releases its sender.
pub struct Subscription {
    name: String,
    source: PathBuf,
    _watcher: notify::RecommendedWatcher,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl Subscription {
    /// Start watching `source` on behalf of resource `name`.
    pub fn open(
        name: &str,
        source: &Path,
        tx: mpsc::Sender<ResourceChange>,
    ) -> Result<Self, WatchError> {
        let file_name: OsString = source
            .file_name()
            .ok_or_else(|| WatchError::PathWatchFailed {
                path: source.to_path_buf(),
                reason: "source has no file name".to_string(),
            })?
            .to_os_string();

        let dir = match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let resource = name.to_string();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!("[watcher] file watch error for `{resource}`: {e}");
                    return;
                }
            };

            let Some(kind) = ChangeKind::from_event_kind(&event.kind) else {
                return;
            };

            let touches_source = event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()));
            if touches_source {
                let _ = tx.blocking_send(ResourceChange {
                    name: resource.clone(),
                    kind,
                });
            }
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.clone(),
                reason: e.to_string(),
            })?;

        crate::debug_event!("watcher", "watching", "`{name}` via {}", dir.display());

        Ok(Self {
            name: name.to_string(),
            source: source.to_path_buf(),
            _watcher: watcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_change_kind_mapping() {
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Any)),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Remove(RemoveKind::File)),
            None
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Access(AccessKind::Any)),
            None
        );
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let (tx, _rx) = mpsc::channel(4);
        let err = Subscription::open("ghost", Path::new("/definitely/not/here/x.bin"), tx)
            .unwrap_err();
        assert!(matches!(err, WatchError::PathWatchFailed { .. }));
    }
}
