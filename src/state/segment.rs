//! Expansion of a workout configuration into timed segments

use serde::{Deserialize, Serialize};

use super::WorkoutConfig;

/// Phase a segment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Prepare,
    Work,
    Rest,
    SetRest,
}

impl SegmentKind {
    pub fn label(self) -> &'static str {
        match self {
            SegmentKind::Prepare => "Prepare",
            SegmentKind::Work => "Work",
            SegmentKind::Rest => "Rest",
            SegmentKind::SetRest => "Tabata Rest",
        }
    }
}

/// One contiguous timed phase of the workout
///
/// `set_index` and `cycle_index` are 1-based; both are 0 for the Prepare
/// segment. A SetRest carries `cycle_index == cycles`, i.e. it follows the
/// last cycle of its set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub label: &'static str,
    pub duration_seconds: u32,
    pub set_index: u32,
    pub cycle_index: u32,
}

impl Segment {
    fn new(kind: SegmentKind, duration_seconds: u32, set_index: u32, cycle_index: u32) -> Self {
        Self {
            kind,
            label: kind.label(),
            duration_seconds,
            set_index,
            cycle_index,
        }
    }
}

/// Build the ordered segment list for a configuration
///
/// Optional phases with a zero duration are left out entirely, so the
/// countdown never sees an instantaneous segment.
pub fn build_segments(config: &WorkoutConfig) -> Vec<Segment> {
    let mut segments = Vec::new();

    if config.prepare > 0 {
        segments.push(Segment::new(SegmentKind::Prepare, config.prepare, 0, 0));
    }

    for set in 1..=config.sets {
        for cycle in 1..=config.cycles {
            segments.push(Segment::new(SegmentKind::Work, config.work, set, cycle));
            if cycle < config.cycles && config.rest > 0 {
                segments.push(Segment::new(SegmentKind::Rest, config.rest, set, cycle));
            }
        }
        if set < config.sets && config.set_rest > 0 {
            segments.push(Segment::new(
                SegmentKind::SetRest,
                config.set_rest,
                set,
                config.cycles,
            ));
        }
    }

    segments
}

/// Sum of all segment durations in seconds
pub fn total_seconds(segments: &[Segment]) -> u64 {
    segments
        .iter()
        .map(|segment| u64::from(segment.duration_seconds))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(segments: &[Segment], kind: SegmentKind) -> usize {
        segments.iter().filter(|s| s.kind == kind).count()
    }

    #[test]
    fn single_set_has_no_trailing_rest() {
        let config = WorkoutConfig {
            prepare: 10,
            work: 20,
            rest: 10,
            cycles: 2,
            sets: 1,
            set_rest: 60,
        };
        let segments = build_segments(&config);
        let kinds: Vec<_> = segments.iter().map(|s| (s.kind, s.duration_seconds)).collect();
        assert_eq!(
            kinds,
            vec![
                (SegmentKind::Prepare, 10),
                (SegmentKind::Work, 20),
                (SegmentKind::Rest, 10),
                (SegmentKind::Work, 20),
            ]
        );
        assert_eq!(total_seconds(&segments), 60);
    }

    #[test]
    fn segment_counts_follow_configuration() {
        for (rest, set_rest, prepare) in [(10, 60, 10), (0, 60, 0), (10, 0, 5), (0, 0, 0)] {
            let config = WorkoutConfig {
                prepare,
                work: 20,
                rest,
                cycles: 4,
                sets: 3,
                set_rest,
            };
            let segments = build_segments(&config);
            assert_eq!(count(&segments, SegmentKind::Work), 12);
            assert_eq!(
                count(&segments, SegmentKind::Rest),
                if rest > 0 { 3 * 3 } else { 0 }
            );
            assert_eq!(
                count(&segments, SegmentKind::SetRest),
                if set_rest > 0 { 2 } else { 0 }
            );
            assert_eq!(
                count(&segments, SegmentKind::Prepare),
                usize::from(prepare > 0)
            );
        }
    }

    #[test]
    fn indices_are_tagged() {
        let config = WorkoutConfig {
            prepare: 5,
            work: 20,
            rest: 10,
            cycles: 2,
            sets: 2,
            set_rest: 30,
        };
        let segments = build_segments(&config);

        let prepare = segments[0];
        assert_eq!((prepare.set_index, prepare.cycle_index), (0, 0));

        let set_rest = segments
            .iter()
            .find(|s| s.kind == SegmentKind::SetRest)
            .unwrap();
        assert_eq!((set_rest.set_index, set_rest.cycle_index), (1, 2));
        assert_eq!(set_rest.label, "Tabata Rest");

        let last = segments.last().unwrap();
        assert_eq!((last.kind, last.set_index, last.cycle_index), (SegmentKind::Work, 2, 2));
    }

    #[test]
    fn building_is_deterministic() {
        let config = WorkoutConfig::default();
        assert_eq!(build_segments(&config), build_segments(&config));
    }
}
