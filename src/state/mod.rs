//! State management module
//!
//! The workout configuration, the segment builder, the countdown engine and
//! the session that ties them to the tick scheduler.

pub mod app_state;
pub mod countdown;
pub mod display;
pub mod scheduler;
pub mod segment;
pub mod session;
pub mod workout;

// Re-export main types
pub use app_state::{AppState, EditError};
pub use countdown::{Countdown, CountdownStatus, TickOutcome};
pub use display::{DisplaySnapshot, WorkoutSummary};
pub use scheduler::{Clock, ManualClock, Millis, MonotonicClock, TickHandle, TickScheduler};
pub use segment::{build_segments, total_seconds, Segment, SegmentKind};
pub use session::{Session, SessionError, ToggleAction};
pub use workout::{Setting, SettingRange, WorkoutConfig};
