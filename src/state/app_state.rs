//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use super::{
    scheduler::{Clock, MonotonicClock},
    DisplaySnapshot, Session, SessionError, Setting, ToggleAction, WorkoutConfig, WorkoutSummary,
};
use crate::services::{CueDispatcher, SettingsStore};

/// Failures of a settings edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    Locked(SessionError),
    Internal(String),
}

/// Shared state between the HTTP handlers and the background tasks
pub struct AppState {
    /// The timer session; all mutation happens under this lock
    session: Mutex<Session>,
    /// Cue dispatch and the user's sound flag
    pub cues: CueDispatcher,
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Display sink: latest snapshot of the countdown
    pub display_tx: watch::Sender<DisplaySnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _display_rx: watch::Receiver<DisplaySnapshot>,
    /// Wakes the countdown driver when a tick gets scheduled
    pub tick_notify: Notify,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session", &self.session)
            .field("cues", &self.cues)
            .field("clock", &self.clock)
            .field("port", &self.port)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create the state from the stored configuration
    pub fn new(port: u16, host: String, store: Arc<dyn SettingsStore>, cues: CueDispatcher) -> Self {
        let session = Session::new(store.load());
        let (display_tx, display_rx) = watch::channel(session.snapshot());

        Self {
            session: Mutex::new(session),
            cues,
            store,
            clock: Arc::new(MonotonicClock::new()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            display_tx,
            _display_rx: display_rx,
            tick_notify: Notify::new(),
        }
    }

    /// Replace the clock the countdown reads
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, String> {
        self.session
            .lock()
            .map_err(|e| format!("Failed to lock session: {}", e))
    }

    /// Apply a user action to the session, then publish and wake the driver
    ///
    /// Snapshots are published while the session lock is held so a newer
    /// one from the driver can never be overwritten by an older one.
    pub fn update_session<F, R>(&self, action: &str, updater: F) -> Result<(R, DisplaySnapshot), String>
    where
        F: FnOnce(&mut Session, u64) -> R,
    {
        let mut session = self.lock_session()?;
        let result = updater(&mut *session, self.clock.now_ms());
        let snapshot = session.snapshot();
        let pending = session.has_pending_tick();
        self.publish(snapshot.clone());
        drop(session);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        if pending {
            self.tick_notify.notify_one();
        }

        Ok((result, snapshot))
    }

    pub fn start(&self) -> Result<(bool, DisplaySnapshot), String> {
        self.update_session("start", |session, now| session.start(now))
    }

    pub fn pause(&self) -> Result<(bool, DisplaySnapshot), String> {
        self.update_session("pause", |session, _| session.pause())
    }

    pub fn toggle(&self) -> Result<(ToggleAction, DisplaySnapshot), String> {
        self.update_session("toggle", |session, now| session.toggle(now))
    }

    pub fn reset(&self) -> Result<DisplaySnapshot, String> {
        self.update_session("reset", |session, _| session.reset())
            .map(|(_, snapshot)| snapshot)
    }

    /// Step a setting and persist the new configuration
    pub fn adjust_setting(&self, setting: Setting, direction: i32) -> Result<WorkoutConfig, EditError> {
        self.edit_setting(&format!("adjust {}", setting), |session| {
            session.adjust(setting, direction)
        })
    }

    /// Set a setting to a clamped value and persist the new configuration
    pub fn set_setting(&self, setting: Setting, value: i64) -> Result<WorkoutConfig, EditError> {
        self.edit_setting(&format!("set {}", setting), |session| {
            session.set(setting, value)
        })
    }

    fn edit_setting<F>(&self, action: &str, edit: F) -> Result<WorkoutConfig, EditError>
    where
        F: FnOnce(&mut Session) -> Result<u32, SessionError>,
    {
        let (result, _) = self
            .update_session(action, |session, _| {
                edit(&mut *session).map(|_| *session.config())
            })
            .map_err(EditError::Internal)?;

        match result {
            Ok(config) => {
                if let Err(e) = self.store.save(&config) {
                    warn!("Failed to save settings: {}", e);
                }
                Ok(config)
            }
            Err(e) => {
                info!("Rejected edit: {}", e);
                Err(EditError::Locked(e))
            }
        }
    }

    /// Run the scheduled tick and dispatch its cues outside the lock
    ///
    /// Returns whether another tick is pending.
    pub fn run_scheduled_tick(&self) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        let Some(outcome) = session.run_tick(self.clock.now_ms()) else {
            return Ok(false);
        };
        if outcome.display_changed {
            self.publish(session.snapshot());
        }
        let pending = session.has_pending_tick();
        drop(session);

        for cue in outcome.cues {
            self.cues.dispatch(cue);
        }
        Ok(pending)
    }

    /// Recompute the display from the anchored target
    pub fn resync(&self) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        let changed = session.refresh(self.clock.now_ms());
        if changed {
            let snapshot = session.snapshot();
            debug!("Display resynced to {}", snapshot.time_text);
            self.publish(snapshot);
        }
        Ok(changed)
    }

    pub fn has_pending_tick(&self) -> Result<bool, String> {
        Ok(self.lock_session()?.has_pending_tick())
    }

    fn publish(&self, snapshot: DisplaySnapshot) {
        if let Err(e) = self.display_tx.send(snapshot) {
            warn!("Failed to publish display update: {}", e);
        }
    }

    pub fn get_display(&self) -> Result<DisplaySnapshot, String> {
        Ok(self.lock_session()?.snapshot())
    }

    pub fn get_config(&self) -> Result<WorkoutConfig, String> {
        Ok(*self.lock_session()?.config())
    }

    pub fn get_summary(&self) -> Result<WorkoutSummary, String> {
        Ok(self.lock_session()?.summary())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{cue::tests::RecordingSink, CueKind, MemoryStore},
        state::{scheduler::ManualClock, CountdownStatus},
    };

    fn config() -> WorkoutConfig {
        WorkoutConfig {
            prepare: 3,
            work: 5,
            rest: 2,
            cycles: 2,
            sets: 1,
            set_rest: 0,
        }
    }

    fn app(clock: Arc<ManualClock>) -> (AppState, Arc<RecordingSink>, Arc<MemoryStore>) {
        let sink = Arc::new(RecordingSink::default());
        let store = Arc::new(MemoryStore::with_config(config()));
        let state = AppState::new(
            0,
            "127.0.0.1".to_string(),
            store.clone(),
            CueDispatcher::new(sink.clone(), true),
        )
        .with_clock(clock);
        (state, sink, store)
    }

    #[test]
    fn loads_configuration_from_store() {
        let (state, _, _) = app(Arc::new(ManualClock::default()));
        assert_eq!(state.get_config().unwrap(), config());
        assert_eq!(state.display_tx.borrow().time_text, "00:03");
    }

    #[test]
    fn ticks_dispatch_cues_and_publish() {
        let clock = Arc::new(ManualClock::at(0));
        let (state, sink, _) = app(clock.clone());
        let mut display_rx = state.display_tx.subscribe();

        let (started, _) = state.start().unwrap();
        assert!(started);
        assert!(state.run_scheduled_tick().unwrap());
        assert_eq!(sink.played(), vec![CueKind::Prepare]);

        display_rx.mark_unchanged();
        clock.advance(1_500);
        state.run_scheduled_tick().unwrap();
        assert!(display_rx.has_changed().unwrap());
        assert_eq!(display_rx.borrow_and_update().remaining_seconds, 2);
    }

    #[test]
    fn adjust_persists_and_rejects_when_running() {
        let clock = Arc::new(ManualClock::at(0));
        let (state, _, store) = app(clock);

        let config = state.adjust_setting(Setting::Cycles, 1).unwrap();
        assert_eq!(config.cycles, 3);
        assert_eq!(store.load().cycles, 3);

        state.start().unwrap();
        assert_eq!(
            state.adjust_setting(Setting::Cycles, 1),
            Err(EditError::Locked(SessionError::Locked(Setting::Cycles)))
        );
        assert_eq!(store.load().cycles, 3);
        assert_eq!(state.get_display().unwrap().status, CountdownStatus::Running);
    }

    #[test]
    fn set_setting_clamps_persists_and_locks() {
        let (state, _, store) = app(Arc::new(ManualClock::at(0)));

        let config = state.set_setting(Setting::Work, 1_000).unwrap();
        assert_eq!(config.work, 600);
        assert_eq!(store.load().work, 600);
        assert_eq!(state.get_summary().unwrap().total_seconds, 3 + 600 + 2 + 600);

        state.start().unwrap();
        assert_eq!(
            state.set_setting(Setting::Work, 30),
            Err(EditError::Locked(SessionError::Locked(Setting::Work)))
        );
        assert_eq!(store.load().work, 600);
    }

    #[test]
    fn published_display_matches_session_under_contention() {
        let clock = Arc::new(ManualClock::at(0));
        let (state, _, _) = app(clock.clone());

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..2_000 {
                    clock.advance(7);
                    state.run_scheduled_tick().unwrap();
                    state.resync().unwrap();
                }
            });
            for _ in 0..500 {
                state.toggle().unwrap();
            }
        });

        assert_eq!(*state.display_tx.borrow(), state.get_display().unwrap());
    }

    #[test]
    fn resync_recomputes_after_a_gap() {
        let clock = Arc::new(ManualClock::at(0));
        let (state, _, _) = app(clock.clone());
        state.start().unwrap();
        state.run_scheduled_tick().unwrap();

        clock.advance(2_200);
        assert!(state.resync().unwrap());
        assert_eq!(state.display_tx.borrow().remaining_seconds, 1);
        assert!(!state.resync().unwrap());
    }

    #[test]
    fn records_last_action() {
        let (state, _, _) = app(Arc::new(ManualClock::default()));
        state.reset().unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("reset"));
        assert!(time.is_some());
    }
}
