//! State management module
//!
//! This module contains the nap state machine, the types it exchanges with
//! the runtime, and the state shared with the HTTP layer.

pub mod app_state;
pub mod controller;
pub mod mode;
pub mod status;

// Re-export main types
pub use app_state::AppState;
pub use controller::{Adjustment, NapController, Parts};
pub use mode::{Button, Event, Intent, LaunchReason, Mode};
pub use status::NapStatus;
