//! Arena demo binary.
//!
//! Composition root: loads configuration, installs logging, and runs one
//! player against generated opponents from stdin.
mod app;
mod config;
mod roster;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use app::ArenaApp;
use combat_runtime::RuntimeConfig;
use config::ArenaConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    dotenvy::dotenv().ok();

    let config = ArenaConfig::from_env();
    let runtime = RuntimeConfig::from_env();

    let _guard = setup_logging(config.log_dir.as_deref())?;
    tracing::info!(
        target: "arena",
        player = %config.player_name,
        opponents = config.opponents,
        turn_timeout = runtime.combat.turn_timeout,
        "starting arena"
    );

    ArenaApp::new(&config, runtime)?.run().await
}

/// Setup logging to stderr and, when a directory is given, to a file.
///
/// The returned guard flushes the file writer on drop.
fn setup_logging(log_dir: Option<&std::path::Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "arena.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/arena.log", dir.display());
    }

    Ok(guard)
}
