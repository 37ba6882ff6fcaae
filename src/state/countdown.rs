//! Drift-corrected countdown over a segment list
//!
//! The engine never decrements a counter per callback. Each segment gets an
//! absolute target timestamp when it is entered and the remaining seconds are
//! recomputed from `target - now` on every tick, so callback jitter or a long
//! gap between callbacks can't make the display drift.
//!
//! # Lifecycle
//!
//! 1. `new`/`reset` → `Idle` on the first segment
//! 2. `start` → `Running`; the next `tick` anchors the target and fires the entry cue
//! 3. `tick` past a target → next segment, anchored at the previous target
//! 4. past the last segment → `Complete`, the complete cue fires once
//!
//! `pause` drops the target and `start` re-anchors it from the remaining
//! seconds without firing the entry cue again.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{scheduler::Millis, Segment};
use crate::services::CueKind;

const MS_PER_SECOND: Millis = 1_000;

/// Coarse state derived from the engine fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CountdownStatus {
    Idle,
    Running,
    Paused,
    Complete,
}

/// Effects requested by one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Cues to hand to the dispatcher, in order
    pub cues: Vec<CueKind>,
    /// The displayed values changed and should be republished
    pub display_changed: bool,
    /// Another tick must be scheduled
    pub schedule_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    segments: Vec<Segment>,
    current_index: usize,
    remaining_seconds: u32,
    running: bool,
    target_ms: Option<Millis>,
    resume_without_cue: bool,
    /// Target of the segment that just ended, used as the next anchor
    carried_boundary: Option<Millis>,
}

fn seconds_to_ms(seconds: u32) -> Millis {
    Millis::from(seconds) * MS_PER_SECOND
}

fn ceil_seconds(ms: Millis) -> u32 {
    ms.div_ceil(MS_PER_SECOND) as u32
}

impl Countdown {
    pub fn new(segments: Vec<Segment>) -> Self {
        let remaining_seconds = segments.first().map_or(0, |s| s.duration_seconds);
        Self {
            segments,
            current_index: 0,
            remaining_seconds,
            running: false,
            target_ms: None,
            resume_without_cue: false,
            carried_boundary: None,
        }
    }

    pub fn reset(&mut self) {
        self.target_ms = None;
        self.carried_boundary = None;
        self.current_index = 0;
        self.remaining_seconds = self.segments.first().map_or(0, |s| s.duration_seconds);
        self.running = false;
        self.resume_without_cue = false;
    }

    /// Start or resume; returns whether a tick must be scheduled
    pub fn start(&mut self, now: Millis) -> bool {
        if self.segments.is_empty() || self.running {
            return false;
        }

        if self.current_index >= self.segments.len() {
            self.current_index = 0;
            self.remaining_seconds = self.segments[0].duration_seconds;
        }

        self.running = true;
        self.carried_boundary = None;
        // A paused segment already refreshed down to 0 anchors at `now` on
        // the next tick and advances from there
        if self.resume_without_cue && self.remaining_seconds > 0 {
            self.target_ms = Some(now + seconds_to_ms(self.remaining_seconds));
            debug!(
                "Resuming segment {} with {}s left",
                self.current_index, self.remaining_seconds
            );
        }
        self.resume_without_cue = false;
        true
    }

    /// Pause a running countdown; returns false when nothing was running
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.target_ms = None;
        self.carried_boundary = None;
        self.resume_without_cue = true;
        true
    }

    pub fn tick(&mut self, now: Millis) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.running {
            return outcome;
        }

        let Some(segment) = self.segments.get(self.current_index).copied() else {
            self.finish(&mut outcome);
            return outcome;
        };

        let entering = self.target_ms.is_none();
        let target = match self.target_ms {
            Some(target) => target,
            None => {
                let anchor = self.carried_boundary.take().unwrap_or(now);
                let target = anchor + seconds_to_ms(self.remaining_seconds);
                self.target_ms = Some(target);
                target
            }
        };
        let announce = entering && !self.resume_without_cue;
        self.resume_without_cue = false;

        let ms_remaining = target.saturating_sub(now);
        let seconds = ceil_seconds(ms_remaining);
        if seconds != self.remaining_seconds {
            self.remaining_seconds = seconds;
            outcome.display_changed = true;
        }

        if ms_remaining > 0 {
            if announce {
                outcome.cues.push(segment.kind.into());
            }
            outcome.schedule_next = true;
            return outcome;
        }

        if announce {
            debug!(
                "Segment {} ({}) elapsed entirely between ticks, skipping its cue",
                self.current_index, segment.label
            );
        }
        self.advance(target, &mut outcome);
        outcome
    }

    /// Recompute the remaining seconds from the anchored target
    ///
    /// Returns whether the value changed. Does nothing unless running with a
    /// target, and never advances to the next segment.
    pub fn refresh(&mut self, now: Millis) -> bool {
        let Some(target) = self.target_ms.filter(|_| self.running) else {
            return false;
        };
        let seconds = ceil_seconds(target.saturating_sub(now));
        if seconds == self.remaining_seconds {
            return false;
        }
        self.remaining_seconds = seconds;
        true
    }

    fn advance(&mut self, boundary: Millis, outcome: &mut TickOutcome) {
        self.current_index += 1;
        self.target_ms = None;
        self.carried_boundary = Some(boundary);

        match self.segments.get(self.current_index) {
            Some(next) => {
                self.remaining_seconds = next.duration_seconds;
                outcome.display_changed = true;
                outcome.schedule_next = true;
            }
            None => self.finish(outcome),
        }
    }

    fn finish(&mut self, outcome: &mut TickOutcome) {
        self.current_index = self.segments.len();
        self.running = false;
        self.target_ms = None;
        self.carried_boundary = None;
        self.remaining_seconds = 0;
        outcome.cues.push(CueKind::Complete);
        outcome.display_changed = true;
        outcome.schedule_next = false;
    }

    pub fn status(&self) -> CountdownStatus {
        if !self.segments.is_empty() && self.current_index >= self.segments.len() {
            CountdownStatus::Complete
        } else if self.running {
            CountdownStatus::Running
        } else if self.resume_without_cue {
            CountdownStatus::Paused
        } else {
            CountdownStatus::Idle
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.segments.get(self.current_index)
    }

    pub fn next_segment(&self) -> Option<&Segment> {
        self.segments.get(self.current_index + 1)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn target_ms(&self) -> Option<Millis> {
        self.target_ms
    }
}
