//! Shared state for the HTTP presentation layer

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::timeout,
};
use tracing::warn;

use crate::tasks::{Inbound, InputReply, UserInput};
use super::NapStatus;

/// How long a request waits for the controller to answer
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Handles the API needs to reach the controller task
#[derive(Debug)]
pub struct AppState {
    /// Inbound channel of the controller task
    pub inbound_tx: mpsc::Sender<Inbound>,
    /// Latest status published by the controller task
    pub status_rx: watch::Receiver<NapStatus>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last input tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        inbound_tx: mpsc::Sender<Inbound>,
        status_rx: watch::Receiver<NapStatus>,
    ) -> Self {
        Self {
            inbound_tx,
            status_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Forward user input to the controller and wait for the resulting status
    pub async fn submit(&self, action: &str, input: UserInput) -> Result<InputReply, String> {
        let (reply, reply_rx) = oneshot::channel();
        self.inbound_tx
            .send(Inbound::Input { input, reply: Some(reply) })
            .await
            .map_err(|_| "Controller is not running".to_string())?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        match timeout(REPLY_TIMEOUT, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err("Controller dropped the request".to_string()),
            Err(_) => {
                warn!("Controller did not answer {} in time", action);
                Err("Controller did not answer in time".to_string())
            }
        }
    }

    /// Get the latest published status
    pub fn get_status(&self) -> NapStatus {
        self.status_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last input information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
