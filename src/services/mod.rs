//! Device services module
//!
//! This module contains the side-effecting device outputs driven by the
//! controller.

pub mod haptics;

// Re-export main types
pub use haptics::*;
