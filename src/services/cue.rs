//! Cue dispatch at segment boundaries

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::audio::{AudioError, AudioSink};
use crate::state::SegmentKind;

/// Notification fired when a segment is entered or the workout ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CueKind {
    Prepare,
    Work,
    Rest,
    SetRest,
    Complete,
}

impl From<SegmentKind> for CueKind {
    fn from(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Prepare => CueKind::Prepare,
            SegmentKind::Work => CueKind::Work,
            SegmentKind::Rest => CueKind::Rest,
            SegmentKind::SetRest => CueKind::SetRest,
        }
    }
}

/// Logical tone identity of a cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueTone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
}

impl CueKind {
    pub fn tone(self) -> CueTone {
        let frequency_hz = match self {
            CueKind::Work => 880.0,
            CueKind::Rest | CueKind::SetRest => 523.25,
            CueKind::Prepare => 659.25,
            CueKind::Complete => 392.0,
        };
        let duration_secs = if self == CueKind::Complete { 0.6 } else { 0.18 };
        CueTone {
            frequency_hz,
            duration_secs,
        }
    }
}

/// Forwards cues to an audio sink when sound is enabled
///
/// Dispatch never fails. An unavailable sink switches sound off, any other
/// playback error is logged and dropped.
pub struct CueDispatcher {
    sink: Arc<dyn AudioSink>,
    enabled: AtomicBool,
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl CueDispatcher {
    pub fn new(sink: Arc<dyn AudioSink>, enabled: bool) -> Self {
        Self {
            sink,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn dispatch(&self, kind: CueKind) {
        if !self.is_enabled() {
            return;
        }

        debug!("Dispatching {:?} cue", kind);
        match self.sink.play_cue(kind, kind.tone()) {
            Ok(()) => {}
            Err(AudioError::Unavailable(reason)) => {
                warn!("Audio unavailable ({}), disabling sound", reason);
                self.set_enabled(false);
            }
            Err(e) => warn!("Failed to play {:?} cue: {}", kind, e),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Flip the sound flag and return the new value
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{io, sync::Mutex};

    use super::*;
    use crate::services::audio::NoAudio;

    /// Sink that remembers every cue it was asked to play
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) played: Mutex<Vec<CueKind>>,
    }

    impl RecordingSink {
        pub(crate) fn played(&self) -> Vec<CueKind> {
            self.played.lock().unwrap().clone()
        }
    }

    impl AudioSink for RecordingSink {
        fn play_cue(&self, kind: CueKind, _tone: CueTone) -> Result<(), AudioError> {
            self.played.lock().unwrap().push(kind);
            Ok(())
        }
    }

    struct BrokenSink;

    impl AudioSink for BrokenSink {
        fn play_cue(&self, _kind: CueKind, _tone: CueTone) -> Result<(), AudioError> {
            Err(AudioError::Playback(io::Error::other("device busy")))
        }
    }

    #[test]
    fn phases_are_distinguishable_by_tone() {
        assert_ne!(CueKind::Work.tone(), CueKind::Rest.tone());
        assert_ne!(CueKind::Work.tone(), CueKind::Prepare.tone());
        assert_ne!(CueKind::Prepare.tone(), CueKind::Rest.tone());
        assert_eq!(CueKind::Rest.tone(), CueKind::SetRest.tone());
        assert!(CueKind::Complete.tone().duration_secs > CueKind::Work.tone().duration_secs);
    }

    #[test]
    fn disabled_dispatcher_plays_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = CueDispatcher::new(sink.clone(), false);
        dispatcher.dispatch(CueKind::Work);
        assert!(sink.played().is_empty());

        dispatcher.set_enabled(true);
        dispatcher.dispatch(CueKind::Work);
        assert_eq!(sink.played(), vec![CueKind::Work]);
    }

    #[test]
    fn unavailable_audio_turns_sound_off() {
        let dispatcher = CueDispatcher::new(Arc::new(NoAudio), true);
        dispatcher.dispatch(CueKind::Prepare);
        assert!(!dispatcher.is_enabled());
    }

    #[test]
    fn playback_errors_keep_sound_on() {
        let dispatcher = CueDispatcher::new(Arc::new(BrokenSink), true);
        dispatcher.dispatch(CueKind::Complete);
        assert!(dispatcher.is_enabled());
    }

    #[test]
    fn toggle_returns_new_value() {
        let dispatcher = CueDispatcher::new(Arc::new(RecordingSink::default()), false);
        assert!(dispatcher.toggle());
        assert!(!dispatcher.toggle());
    }
}
