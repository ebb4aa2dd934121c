//! Wake delivery while the process is resident

use std::{sync::Arc, time::Duration};
use chrono::Utc;
use tokio::{sync::mpsc, time::interval};
use tracing::{info, warn};

use crate::{scheduler::FileWakeScheduler, state::Event};
use super::driver::Inbound;

/// Background task that consumes due wake requests and delivers them to the controller
pub async fn wake_watcher_task(
    scheduler: Arc<FileWakeScheduler>,
    tx: mpsc::Sender<Inbound>,
    poll: Duration,
) {
    info!("Starting wake watcher task (poll every {}ms)", poll.as_millis());

    let mut interval = interval(poll);

    loop {
        interval.tick().await;

        match scheduler.take_due(Utc::now()) {
            Ok(Some(request)) => {
                info!("Delivering {}", request.id);
                if tx.send(Inbound::Event(Event::WakeFired { id: request.id })).await.is_err() {
                    info!("Controller gone, stopping wake watcher");
                    break;
                }
            }
            Ok(None) => {
                // Nothing due yet
            }
            Err(e) => {
                warn!("Failed to check wake requests: {}", e);
            }
        }
    }
}
