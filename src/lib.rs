//! Embed binary files as importable source modules.
//!
//! Every registered resource is read, optionally gzip-compressed,
//! base64-encoded and written as a module with a single default export.
//! An index module maps resource names to expressions that import and
//! decode them.
//!
//! ```text
//! reve/
//!   source/<name>.ts   export default "<base64>"
//!   index.ts           export default { "<name>": decodeBase64(...), ... }
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod emitter;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod sanitize;
pub mod utils;
pub mod watcher;

pub use config::Settings;
pub use error::{BuildError, ProcessError, RegistryError};
pub use layout::OutputLayout;
pub use pipeline::{BuildReport, Reve, ResourceOutcome, ResourceReport};
pub use registry::ResourceRegistry;
pub use sanitize::sanitize;
pub use watcher::{WatchError, WatchEvent};
