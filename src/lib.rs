//! Interval Timer - a drift-corrected interval workout timer
//!
//! This library expands a workout configuration into timed segments, drives a
//! wall-clock anchored countdown through them and fires a cue at every phase
//! boundary. A small HTTP surface controls the timer and exposes its display.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
