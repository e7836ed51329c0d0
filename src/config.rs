//! Configuration for reve.
//!
//! Settings are layered:
//! - Default values
//! - `reve.toml` (found by walking up from the current directory)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `REVE_` and use double
//! underscores to separate nested levels:
//! - `REVE_COMPRESSION=true` sets `compression`
//! - `REVE_WATCH__DEBOUNCE_MS=250` sets `watch.debounce_ms`
//! - `REVE_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "reve.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output directory, relative to the base location
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Extension of generated modules
    #[serde(default = "default_module_extension")]
    pub module_extension: String,

    /// Gzip payloads before encoding
    #[serde(default)]
    pub compression: bool,

    /// Base location for resolving resource paths (defaults to the
    /// directory holding `reve.toml`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub codegen: CodegenConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// `[resources]` table of name -> source, in build order
    #[serde(default)]
    pub resources: IndexMap<String, PathBuf>,
}

/// Only the `[resources]` table of a config file.
#[derive(Debug, Deserialize)]
struct ResourceTable {
    #[serde(default)]
    resources: IndexMap<String, toml::Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Quiet period before a burst of changes triggers a rebuild
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CodegenConfig {
    /// Module specifier providing `decodeBase64`
    #[serde(default = "default_decode_import")]
    pub decode_import: String,

    /// Module specifier providing `gunzip`
    #[serde(default = "default_decompress_import")]
    pub decompress_import: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("reve")
}
fn default_module_extension() -> String {
    "ts".to_string()
}
fn default_debounce_ms() -> u64 {
    100
}
fn default_decode_import() -> String {
    "jsr:@std/encoding@^0.224.2".to_string()
}
fn default_decompress_import() -> String {
    "https://deno.land/x/compress@v0.4.5/mod.ts".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            output_dir: default_output_dir(),
            module_extension: default_module_extension(),
            compression: false,
            base_dir: None,
            watch: WatchConfig::default(),
            codegen: CodegenConfig::default(),
            logging: LoggingConfig::default(),
            resources: IndexMap::new(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            decode_import: default_decode_import(),
            decompress_import: default_decompress_import(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path =
            Self::find_workspace_config().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let path = path.as_ref();

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore (__) separates nested levels
            .merge(Env::prefixed("REVE_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.base_dir.is_none() {
                    settings.base_dir = path
                        .parent()
                        .filter(|p| !p.as_os_str().is_empty())
                        .map(Path::to_path_buf);
                }
                settings.resources =
                    Self::in_declared_order(path, std::mem::take(&mut settings.resources));
                settings
            })
    }

    /// Figment dictionaries come back sorted by key. Reorder the merged
    /// resources to follow the file; entries only present in the
    /// environment go last.
    fn in_declared_order(
        path: &Path,
        resources: IndexMap<String, PathBuf>,
    ) -> IndexMap<String, PathBuf> {
        let declared = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| toml::from_str::<ResourceTable>(&text).ok())
            .map(|table| table.resources)
            .unwrap_or_default();

        let mut ordered = IndexMap::with_capacity(resources.len());
        for name in declared.keys() {
            if let Some(source) = resources.get(name) {
                ordered.insert(name.clone(), source.clone());
            }
        }
        for (name, source) in resources {
            ordered.entry(name).or_insert(source);
        }
        ordered
    }

    /// Find `reve.toml` by searching from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Base location used to resolve resources and the output directory.
    pub fn base_location(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the given directory
    pub fn init_config_file(
        dir: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.as_ref().join(CONFIG_FILE_NAME);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        let mut settings = Settings::default();
        settings
            .resources
            .insert("logo".to_string(), PathBuf::from("./assets/logo.png"));

        settings.save(&config_path)?;
        Ok(config_path)
    }
}
