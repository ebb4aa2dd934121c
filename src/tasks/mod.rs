//! Background tasks module
//!
//! This module contains the tasks that drive the controller at runtime.

pub mod driver;
pub mod timers;
pub mod wake_watcher;

// Re-export main functions
pub use driver::{controller_task, Inbound, InputReply, UserInput};
pub use timers::TokioTimers;
pub use wake_watcher::wake_watcher_task;
