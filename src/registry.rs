//! Resource registry with filename collision detection.
//!
//! Maps resource names to their source files and keeps a reverse index from
//! sanitized filename to name, so a collision is caught when a resource is
//! added rather than when two builds overwrite each other's output.
//! Once locked the resource set is frozen; add and remove become no-ops.

use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::RegistryError;
use crate::sanitize::sanitize;

static VALID_NAME: OnceLock<Regex> = OnceLock::new();

fn valid_name() -> &'static Regex {
    VALID_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_ ]+$").expect("resource name pattern is a valid regex")
    })
}

/// A registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource<'a> {
    pub name: &'a str,
    pub source: &'a Path,
    pub filename: &'a str,
}

#[derive(Debug, Clone)]
struct Entry {
    source: PathBuf,
    filename: String,
}

/// Ordered name -> source mapping.
///
/// Iteration follows insertion order, which is also the order resources
/// are logged and listed in the index module.
#[derive(Debug)]
pub struct ResourceRegistry {
    base: PathBuf,
    resources: IndexMap<String, Entry>,
    /// sanitized filename -> resource name
    filename_index: HashMap<String, String>,
    locked: bool,
}

impl ResourceRegistry {
    /// Create an empty registry resolving relative sources against `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            resources: IndexMap::new(),
            filename_index: HashMap::new(),
            locked: false,
        }
    }

    /// Validate a resource name without registering it.
    pub fn validate_name(name: &str) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName {
                name: name.to_string(),
                reason: "name must not be empty".to_string(),
            });
        }
        if !valid_name().is_match(name) {
            return Err(RegistryError::InvalidName {
                name: name.to_string(),
                reason: "name must only contain ASCII letters, digits, `_` or spaces".to_string(),
            });
        }
        Ok(())
    }

    /// Register a resource.
    ///
    /// Does nothing once the registry is locked. A name whose sanitized
    /// filename is already taken, including the same name added twice, is a
    /// collision.
    pub fn add(&mut self, name: &str, source: impl AsRef<Path>) -> Result<(), RegistryError> {
        if self.locked {
            crate::debug_event!("registry", "locked, ignoring add", "`{name}`");
            return Ok(());
        }

        Self::validate_name(name)?;

        let filename = sanitize(name);
        if let Some(conflicting) = self.filename_index.get(&filename) {
            return Err(RegistryError::NameCollision {
                name: name.to_string(),
                conflicting: conflicting.clone(),
                filename,
            });
        }

        let source = self.resolve(source.as_ref());
        crate::debug_event!("registry", "added", "`{name}` -> {}", source.display());

        self.filename_index.insert(filename.clone(), name.to_string());
        self.resources
            .insert(name.to_string(), Entry { source, filename });
        Ok(())
    }

    /// Remove a resource. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.locked {
            crate::debug_event!("registry", "locked, ignoring remove", "`{name}`");
            return false;
        }

        match self.resources.shift_remove(name) {
            Some(entry) => {
                self.filename_index.remove(&entry.filename);
                true
            }
            None => false,
        }
    }

    /// Freeze the resource set.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Resolved source path of a resource.
    pub fn source(&self, name: &str) -> Option<&Path> {
        self.resources.get(name).map(|e| e.source.as_path())
    }

    /// Resource whose filename sanitizes to `filename`.
    pub fn name_for_filename(&self, filename: &str) -> Option<&str> {
        self.filename_index.get(filename).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<Resource<'_>> {
        self.resources
            .get_key_value(name)
            .map(|(name, entry)| Resource {
                name,
                source: &entry.source,
                filename: &entry.filename,
            })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Resource<'_>> {
        self.resources.iter().map(|(name, entry)| Resource {
            name,
            source: &entry.source,
            filename: &entry.filename,
        })
    }

    /// Resource names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    fn resolve(&self, source: &Path) -> PathBuf {
        if source.is_absolute() {
            source.to_path_buf()
        } else {
            let relative = source.strip_prefix(".").unwrap_or(source);
            self.base.join(relative)
        }
    }
}
