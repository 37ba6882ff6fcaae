//! Audio collaborators that play cues

use std::io::{self, Write};

use thiserror::Error;
use tracing::info;

use super::cue::{CueKind, CueTone};

/// Failures reported by an audio sink
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio output exists; sound should be switched off
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("failed to play cue")]
    Playback(#[source] io::Error),
}

/// Plays a cue of a given kind for roughly the tone's duration
pub trait AudioSink: Send + Sync {
    fn play_cue(&self, kind: CueKind, tone: CueTone) -> Result<(), AudioError>;
}

/// Rings the terminal bell on stderr, twice for the complete cue
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioSink for TerminalBell {
    fn play_cue(&self, kind: CueKind, _tone: CueTone) -> Result<(), AudioError> {
        let bell: &[u8] = if kind == CueKind::Complete {
            b"\x07\x07"
        } else {
            b"\x07"
        };
        let mut stderr = io::stderr().lock();
        stderr.write_all(bell).map_err(AudioError::Playback)?;
        stderr.flush().map_err(AudioError::Playback)
    }
}

/// Writes cues to the log instead of making a sound
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play_cue(&self, kind: CueKind, tone: CueTone) -> Result<(), AudioError> {
        info!(
            "Cue {:?}: {} Hz for {:.2}s",
            kind, tone.frequency_hz, tone.duration_secs
        );
        Ok(())
    }
}

/// Stand-in for a machine without audio output
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAudio;

impl AudioSink for NoAudio {
    fn play_cue(&self, _kind: CueKind, _tone: CueTone) -> Result<(), AudioError> {
        Err(AudioError::Unavailable("no audio backend configured".to_string()))
    }
}
