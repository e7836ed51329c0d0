//! Watch command - build and rebuild on change until Ctrl-C.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;

use super::reve_from_settings;

/// Run the watch command.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let mut reve = reve_from_settings(settings)?;

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping watcher...");
            ctrl_c_token.cancel();
        }
    });

    eprintln!("Watching {} resources (Ctrl-C to stop)", reve.registry().len());
    reve.watch_until(token).await?;
    Ok(())
}
