//! One timer session: configuration, countdown and the pending tick

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{
    build_segments,
    scheduler::{Millis, TickScheduler},
    Countdown, DisplaySnapshot, Setting, TickOutcome, WorkoutConfig, WorkoutSummary,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Settings can't change while the countdown runs
    #[error("cannot change {0} while the timer is running")]
    Locked(Setting),
}

/// What a start/pause toggle ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleAction {
    Started,
    Paused,
    Ignored,
}

/// Owns all mutable timer state
///
/// Every operation that changes the countdown cancels the pending tick
/// first. A start that is ignored leaves the pending tick alone.
#[derive(Debug)]
pub struct Session {
    config: WorkoutConfig,
    countdown: Countdown,
    scheduler: TickScheduler,
}

impl Session {
    pub fn new(config: WorkoutConfig) -> Self {
        Self {
            config,
            countdown: Countdown::new(build_segments(&config)),
            scheduler: TickScheduler::new(),
        }
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn has_pending_tick(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Start or resume; returns whether the countdown is now running
    pub fn start(&mut self, now: Millis) -> bool {
        if !self.countdown.start(now) {
            // A running countdown keeps its pending tick
            debug!("Start ignored in {:?}", self.countdown.status());
            return false;
        }
        self.scheduler.cancel();
        self.scheduler.schedule();
        info!(
            "Timer running at segment {} with {}s left",
            self.countdown.current_index(),
            self.countdown.remaining_seconds()
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        self.scheduler.cancel();
        let paused = self.countdown.pause();
        if paused {
            info!(
                "Timer paused with {}s left",
                self.countdown.remaining_seconds()
            );
        }
        paused
    }

    /// Start/pause button semantics
    pub fn toggle(&mut self, now: Millis) -> ToggleAction {
        if self.countdown.is_running() {
            self.pause();
            ToggleAction::Paused
        } else if self.start(now) {
            ToggleAction::Started
        } else {
            ToggleAction::Ignored
        }
    }

    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.countdown.reset();
        info!("Timer reset");
    }

    /// Step a setting up or down; rebuilds the segments and resets the timer
    pub fn adjust(&mut self, setting: Setting, direction: i32) -> Result<u32, SessionError> {
        self.ensure_unlocked(setting)?;
        let value = self.config.adjust(setting, direction);
        self.rebuild(setting, value);
        Ok(value)
    }

    /// Set a setting outright, clamped into its range
    pub fn set(&mut self, setting: Setting, value: i64) -> Result<u32, SessionError> {
        self.ensure_unlocked(setting)?;
        let value = self.config.set(setting, value);
        self.rebuild(setting, value);
        Ok(value)
    }

    fn ensure_unlocked(&self, setting: Setting) -> Result<(), SessionError> {
        if self.countdown.is_running() {
            return Err(SessionError::Locked(setting));
        }
        Ok(())
    }

    fn rebuild(&mut self, setting: Setting, value: u32) {
        self.scheduler.cancel();
        self.countdown = Countdown::new(build_segments(&self.config));
        info!(
            "Setting {} = {}, rebuilt {} segments",
            setting,
            value,
            self.countdown.segments().len()
        );
    }

    /// Run the pending tick, if any, and reschedule when asked to
    pub fn run_tick(&mut self, now: Millis) -> Option<TickOutcome> {
        self.scheduler.take_pending()?;
        let outcome = self.countdown.tick(now);
        if outcome.schedule_next {
            self.scheduler.schedule();
        }
        Some(outcome)
    }

    /// Recompute the remaining time after the process regained control
    pub fn refresh(&mut self, now: Millis) -> bool {
        self.countdown.refresh(now)
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot::project(&self.countdown, &self.config)
    }

    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary::new(&self.countdown, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::CueKind, state::CountdownStatus};

    fn session() -> Session {
        Session::new(WorkoutConfig {
            prepare: 3,
            work: 5,
            rest: 2,
            cycles: 2,
            sets: 1,
            set_rest: 0,
        })
    }

    #[test]
    fn start_schedules_exactly_one_tick() {
        let mut session = session();
        assert!(!session.has_pending_tick());
        assert!(session.start(0));
        assert!(session.has_pending_tick());

        let outcome = session.run_tick(0).unwrap();
        assert_eq!(outcome.cues, vec![CueKind::Prepare]);
        assert!(session.has_pending_tick());
    }

    #[test]
    fn second_start_keeps_the_running_tick() {
        let mut session = session();
        assert!(session.start(0));
        session.run_tick(0);

        assert!(!session.start(500));
        assert!(session.has_pending_tick());
        assert_eq!(session.countdown().status(), CountdownStatus::Running);

        // Prepare ends at 3s, the next tick moves on to Work
        let outcome = session.run_tick(3_000).unwrap();
        assert!(outcome.schedule_next);
        assert_eq!(session.countdown().current_index(), 1);
        let outcome = session.run_tick(3_016).unwrap();
        assert_eq!(outcome.cues, vec![CueKind::Work]);
    }

    #[test]
    fn toggle_twice_fast_stays_consistent() {
        let mut session = session();
        assert_eq!(session.toggle(0), ToggleAction::Started);
        assert!(!session.start(10));
        assert_eq!(session.toggle(20), ToggleAction::Paused);
        assert!(!session.has_pending_tick());
    }

    #[test]
    fn stale_tick_after_pause_does_nothing() {
        let mut session = session();
        session.start(0);
        session.run_tick(0);
        session.pause();
        assert!(!session.has_pending_tick());
        assert_eq!(session.run_tick(2_000), None);
        assert_eq!(session.countdown().remaining_seconds(), 3);
    }

    #[test]
    fn stale_tick_after_reset_does_nothing() {
        let mut session = session();
        session.start(0);
        session.run_tick(0);
        session.reset();
        assert_eq!(session.run_tick(10_000), None);
        assert_eq!(session.countdown().status(), CountdownStatus::Idle);
    }

    #[test]
    fn edits_are_locked_while_running() {
        let mut session = session();
        session.start(0);
        session.run_tick(0);
        let before = session.countdown().clone();

        assert_eq!(
            session.adjust(Setting::Work, 1),
            Err(SessionError::Locked(Setting::Work))
        );
        assert_eq!(session.config().work, 5);
        assert_eq!(session.countdown(), &before);
        assert!(session.has_pending_tick());
    }

    #[test]
    fn edits_while_paused_rebuild_and_reset() {
        let mut session = session();
        session.start(0);
        session.run_tick(0);
        session.pause();

        assert_eq!(session.adjust(Setting::Prepare, -1), Ok(2));
        assert_eq!(session.countdown().status(), CountdownStatus::Idle);
        assert_eq!(session.countdown().remaining_seconds(), 2);
    }

    #[test]
    fn set_clamps_and_rebuilds() {
        let mut session = session();
        assert_eq!(session.set(Setting::Cycles, 0), Ok(1));
        assert_eq!(session.countdown().segments().len(), 2);
        assert_eq!(session.summary().total_rounds, 1);
    }

    #[test]
    fn toggle_alternates() {
        let mut session = session();
        assert_eq!(session.toggle(0), ToggleAction::Started);
        session.run_tick(0);
        assert_eq!(session.toggle(500), ToggleAction::Paused);
        assert_eq!(session.countdown().status(), CountdownStatus::Paused);
        assert_eq!(session.toggle(9_000), ToggleAction::Started);
        assert_eq!(session.countdown().target_ms(), Some(12_000));
    }
}
