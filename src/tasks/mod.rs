//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown_driver;
pub mod display_log;
pub mod wake_up_recovery;

// Re-export main functions
pub use countdown_driver::{countdown_driver_task, DEFAULT_FRAME};
pub use display_log::display_log_task;
pub use wake_up_recovery::wake_up_recovery_task;
