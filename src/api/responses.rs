//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::NapStatus;

/// API response structure for input endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub nap: NapStatus,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, nap: NapStatus) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            nap,
        }
    }

    /// Input was applied
    pub fn accepted(message: String, nap: NapStatus) -> Self {
        Self::new("accepted".to_string(), message, nap)
    }

    /// Input was applied but the controller reported a failure
    pub fn failed(message: String, nap: NapStatus) -> Self {
        Self::new("error".to_string(), message, nap)
    }
}

/// Status response for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub nap: NapStatus,
    pub headline: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
