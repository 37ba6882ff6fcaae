//! Wake-up recovery background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Extra delay beyond the check interval that counts as a stall
const STALL_TOLERANCE: Duration = Duration::from_secs(1);

/// Background task that notices when the process regains control after a
/// stall and recomputes the displayed time from the anchored target
pub async fn wake_up_recovery_task(state: Arc<AppState>, check_interval: Duration) {
    info!("Starting wake-up recovery task");

    let mut interval = interval(check_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    loop {
        interval.tick().await;

        let gap = last_seen.elapsed();
        last_seen = Instant::now();
        if gap <= check_interval + STALL_TOLERANCE {
            continue;
        }

        info!(
            "Wake-up detected after {}ms without control, resyncing display",
            gap.as_millis()
        );
        match state.resync() {
            Ok(true) => debug!("Display recomputed from target"),
            Ok(false) => {
                // Not running, or nothing changed
            }
            Err(e) => warn!("Failed to resync after wake-up: {}", e),
        }
    }
}
