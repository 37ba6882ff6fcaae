//! Display projection of the countdown

use serde::{Deserialize, Serialize};

use super::{segment::total_seconds, Countdown, CountdownStatus, SegmentKind, WorkoutConfig};
use crate::utils::format_clock;

/// Everything a display needs, recomputed in full on every publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub status: CountdownStatus,
    pub phase_label: String,
    pub remaining_seconds: u32,
    /// Remaining time as `MM:SS`
    pub time_text: String,
    pub next_label: String,
    /// Elapsed fraction of the current segment, 0.0 to 1.0
    pub progress: f64,
    pub set_ordinal: u32,
    pub set_total: u32,
    pub cycle_ordinal: u32,
    pub cycle_total: u32,
}

impl DisplaySnapshot {
    pub fn project(countdown: &Countdown, config: &WorkoutConfig) -> Self {
        let status = countdown.status();
        let Some(segment) = countdown.current_segment() else {
            return Self {
                status,
                phase_label: "Complete".to_string(),
                remaining_seconds: 0,
                time_text: format_clock(0),
                next_label: "Done".to_string(),
                progress: 1.0,
                set_ordinal: config.sets,
                set_total: config.sets,
                cycle_ordinal: config.cycles,
                cycle_total: config.cycles,
            };
        };

        let remaining = countdown.remaining_seconds();
        let next_label = match countdown.next_segment() {
            Some(next) => format!("Next: {}", next.label),
            None => "Next: Complete".to_string(),
        };

        let progress = if segment.duration_seconds == 0 {
            1.0
        } else {
            let completed = segment.duration_seconds.saturating_sub(remaining);
            (f64::from(completed) / f64::from(segment.duration_seconds)).clamp(0.0, 1.0)
        };

        let cycle_index = match (segment.cycle_index, segment.kind) {
            (0, SegmentKind::SetRest) => config.cycles,
            (cycle, _) => cycle,
        };

        Self {
            status,
            phase_label: segment.label.to_string(),
            remaining_seconds: remaining,
            time_text: format_clock(u64::from(remaining)),
            next_label,
            progress,
            set_ordinal: segment.set_index.max(1).clamp(1, config.sets.max(1)),
            set_total: config.sets,
            cycle_ordinal: cycle_index.max(1).clamp(1, config.cycles.max(1)),
            cycle_total: config.cycles,
        }
    }
}

/// Totals shown next to the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub total_seconds: u64,
    pub total_time: String,
    pub total_rounds: u32,
}

impl WorkoutSummary {
    pub fn new(countdown: &Countdown, config: &WorkoutConfig) -> Self {
        let total = total_seconds(countdown.segments());
        Self {
            total_seconds: total,
            total_time: format_clock(total),
            total_rounds: config.total_rounds(),
        }
    }
}
