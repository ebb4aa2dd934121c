//! Power Nap - nap countdown and wake alarm controller
//!
//! This is the main entry point for the power-nap daemon.

use std::sync::Arc;
use chrono::Utc;
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot, watch},
};
use tracing::info;

use power_nap::{
    api::create_router,
    config::Config,
    scheduler::FileWakeScheduler,
    services::{CommandHaptics, Haptics, LogHaptics},
    state::{AppState, NapController, Parts},
    store::FileStore,
    tasks::{controller_task, wake_watcher_task, TokioTimers},
    utils::shutdown_signal,
};

/// Capacity of the controller's inbound channel
const INBOUND_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("power_nap={},tower_http=info", config.log_level()))
        .init();

    info!("Starting power-nap v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_dir={}, launch={:?}",
        config.host,
        config.port,
        config.data_dir.display(),
        config.launch_reason()
    );

    std::fs::create_dir_all(&config.data_dir)?;

    let store = FileStore::new(&config.data_dir);
    info!("Persisting nap records under {}", store.dir().display());
    let scheduler = Arc::new(FileWakeScheduler::new(&config.data_dir));
    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

    let haptics: Box<dyn Haptics> = match &config.pulse_command {
        Some(command) => Box::new(CommandHaptics::new(command.clone())),
        None => Box::new(LogHaptics),
    };

    // Rebuild the controller from whatever the previous process left behind
    let controller = NapController::recover(
        Parts {
            store: Box::new(store),
            scheduler: Box::new(Arc::clone(&scheduler)),
            timers: Box::new(TokioTimers::new(inbound_tx.clone())),
            haptics,
        },
        config.launch_reason(),
        Utc::now(),
    );

    let (status_tx, status_rx) = watch::channel(controller.status());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let driver = tokio::spawn(controller_task(controller, inbound_rx, status_tx, shutdown_rx));

    // Deliver wake requests that come due while we are resident
    let watcher = tokio::spawn(wake_watcher_task(
        Arc::clone(&scheduler),
        inbound_tx.clone(),
        config.wake_poll_interval(),
    ));

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        inbound_tx,
        status_rx,
    ));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /button/:name - Press up, down or select");
    info!("  POST /increment    - Lengthen the nap");
    info!("  POST /decrement    - Shorten the nap");
    info!("  POST /toggle       - Start or cancel the nap");
    info!("  POST /dismiss      - Stop the alarm");
    info!("  GET  /status       - Current mode and minutes");
    info!("  GET  /health       - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Flush the duration; a pending wake request stays registered
    watcher.abort();
    shutdown_tx.send(()).ok();
    let controller = driver.await?;
    info!("Shutdown complete in {} mode", controller.mode());
    Ok(())
}
