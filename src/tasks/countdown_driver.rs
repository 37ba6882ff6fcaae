//! Frame-paced driver that executes scheduled countdown ticks

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Default frame cadence, roughly one display refresh at 60 Hz
pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Background task that runs the pending tick once per frame
///
/// Sleeps on the state's notifier while nothing is scheduled. Missed frames
/// are skipped rather than replayed; the countdown catches up from its
/// anchored target on the next tick anyway.
pub async fn countdown_driver_task(state: Arc<AppState>, frame: Duration) {
    info!("Starting countdown driver ({}ms frames)", frame.as_millis());

    let mut frames = interval(frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        match state.has_pending_tick() {
            Ok(true) => {}
            Ok(false) => {
                debug!("No tick pending, driver idle");
                state.tick_notify.notified().await;
                frames.reset_immediately();
                continue;
            }
            Err(e) => {
                error!("Failed to check pending tick: {}", e);
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        }

        frames.tick().await;
        if let Err(e) = state.run_scheduled_tick() {
            error!("Failed to run countdown tick: {}", e);
        }
    }
}
