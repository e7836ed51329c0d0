//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Embed binary files as importable source modules
#[derive(Parser, Debug)]
#[command(
    name = "reve",
    version = env!("CARGO_PKG_VERSION"),
    about = "Embed binary files as importable source modules",
    long_about = "Encode the resources listed in reve.toml into generated modules and an index module that decodes them.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Examples:\n  reve init\n  reve build\n  reve build --compress\n  reve watch"
)]
pub struct Cli {
    /// Path to custom reve.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gzip payloads (overrides config)
    #[arg(long, global = true)]
    pub compress: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a default reve.toml in the current directory
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Generate modules for every resource
    Build,

    /// Build, then rebuild resources whenever their sources change
    Watch {
        /// Debounce window in milliseconds (overrides config)
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,
    },

    /// Display active settings
    Config,
}
