//! Power Nap - nap countdown and wake alarm controller
//!
//! The user configures a nap length, starts a countdown and may let the
//! process go away entirely; a persisted wake request brings the alarm back
//! at the scheduled instant. This library holds the mode state machine, its
//! wake scheduling and recovery logic, and the runtime that drives it.

pub mod api;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{NapError, NapResult};
pub use state::{AppState, Button, Event, Intent, LaunchReason, Mode, NapController, NapStatus, Parts};
pub use utils::signals::shutdown_signal;
