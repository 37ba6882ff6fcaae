//! Display sink that writes countdown updates to the log

use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::{CountdownStatus, DisplaySnapshot};

/// Background task that follows the display channel
///
/// Phase and status changes are logged at info, the per-second countdown at
/// debug. Runs until every sender is gone and returns how many phase or
/// status changes it logged.
pub async fn display_log_task(mut display_rx: watch::Receiver<DisplaySnapshot>) -> usize {
    info!("Starting display log task");

    let mut last: Option<(String, CountdownStatus)> = None;
    let mut transitions = 0;

    while display_rx.changed().await.is_ok() {
        let snapshot = display_rx.borrow_and_update().clone();
        let key = (snapshot.phase_label.clone(), snapshot.status);

        if last.as_ref() != Some(&key) {
            info!(
                "{} {} [{:?}] set {}/{} cycle {}/{} ({})",
                snapshot.phase_label,
                snapshot.time_text,
                snapshot.status,
                snapshot.set_ordinal,
                snapshot.set_total,
                snapshot.cycle_ordinal,
                snapshot.cycle_total,
                snapshot.next_label,
            );
            last = Some(key);
            transitions += 1;
        } else {
            debug!(
                "{} {} ({:.0}%)",
                snapshot.phase_label,
                snapshot.time_text,
                snapshot.progress * 100.0
            );
        }
    }

    info!("Display channel closed, stopping display log task");
    transitions
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::{sleep, timeout};

    use super::*;
    use crate::{
        services::{CueDispatcher, LogSink, MemoryStore},
        state::{AppState, WorkoutConfig},
    };

    fn app() -> AppState {
        AppState::new(
            0,
            "127.0.0.1".to_string(),
            Arc::new(MemoryStore::with_config(WorkoutConfig::default())),
            CueDispatcher::new(Arc::new(LogSink), false),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn logs_status_changes_and_stops_when_state_is_dropped() {
        let state = app();
        let task = tokio::spawn(display_log_task(state.display_tx.subscribe()));

        state.start().unwrap();
        sleep(Duration::from_millis(1)).await;
        state.pause().unwrap();
        sleep(Duration::from_millis(1)).await;
        // Same phase and status, logged at debug only
        state.pause().unwrap();
        sleep(Duration::from_millis(1)).await;
        state.reset().unwrap();
        sleep(Duration::from_millis(1)).await;

        drop(state);
        let transitions = timeout(Duration::from_secs(1), task)
            .await
            .expect("display log task should stop")
            .unwrap();
        // Running, Paused, Idle
        assert_eq!(transitions, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_closed_channel() {
        let (display_tx, display_rx) = watch::channel(app().get_display().unwrap());
        let task = tokio::spawn(display_log_task(display_rx));
        drop(display_tx);

        let transitions = timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert_eq!(transitions, 0);
    }
}
