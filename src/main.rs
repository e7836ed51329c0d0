use clap::Parser;

use reve::cli::commands::{build, init, watch};
use reve::cli::{Cli, Commands};
use reve::config::Settings;
use reve::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        let dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
        if let Err(e) = init::run_init(&dir, force) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    config.compression |= cli.compress;
    if let Commands::Watch {
        debounce_ms: Some(ms),
    } = cli.command
    {
        config.watch.debounce_ms = ms;
    }

    logging::init_with_config(&config.logging);

    let result = match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => init::run_config(&config),
        Commands::Build => build::run(&config).await.map(|_| ()),
        Commands::Watch { .. } => watch::run(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
