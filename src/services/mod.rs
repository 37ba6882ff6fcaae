//! External collaborators of the countdown
//!
//! Cue dispatch and the audio sinks behind it, plus persistence of the
//! workout configuration.

pub mod audio;
pub mod cue;
pub mod settings_store;

// Re-export main types
pub use audio::{AudioError, AudioSink, LogSink, NoAudio, TerminalBell};
pub use cue::{CueDispatcher, CueKind, CueTone};
pub use settings_store::{JsonFileStore, MemoryStore, SettingsError, SettingsStore, DEFAULT_SETTINGS_FILE};
