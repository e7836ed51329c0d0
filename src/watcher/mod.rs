//! File watching for automatic rebuilds.
//!
//! ```text
//! Subscription (one per resource, own notify watcher)
//!        |  ResourceChange { name, kind }
//!        v
//!   mpsc channel --> Debouncer (Idle | Pending(deadline) per resource)
//!                         |  deadline passed
//!                         v
//!              re-process resource + rewrite index
//! ```

mod debouncer;
mod error;
mod resource_watcher;
mod subscription;

pub use debouncer::{DebounceState, Debouncer};
pub use error::WatchError;
pub use resource_watcher::{ResourceWatcher, WatchEvent};
pub use subscription::{ChangeKind, ResourceChange, Subscription};
