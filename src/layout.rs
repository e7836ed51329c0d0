//! Paths of generated artifacts.

use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Subdirectory holding per-resource modules.
pub const SOURCE_DIR: &str = "source";

/// Stem of the aggregate module.
pub const INDEX_STEM: &str = "index";

/// Where generated modules are written.
///
/// ```text
/// <root>/
///   source/<filename>.<ext>
///   index.<ext>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    extension: String,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Layout for `base` using the output directory and extension in settings.
    pub fn from_settings(base: &Path, settings: &Settings) -> Self {
        Self::new(base.join(&settings.output_dir), &settings.module_extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIR)
    }

    /// Generated module for a sanitized filename.
    pub fn module_path(&self, filename: &str) -> PathBuf {
        self.source_dir()
            .join(format!("{filename}.{}", self.extension))
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(format!("{INDEX_STEM}.{}", self.extension))
    }

    /// Import specifier of a per-resource module, relative to the index.
    pub fn module_specifier(&self, filename: &str) -> String {
        format!("./{SOURCE_DIR}/{filename}.{}", self.extension)
    }
}
