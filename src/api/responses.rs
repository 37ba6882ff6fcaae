//! API request and response structures

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{DisplaySnapshot, Setting, SettingRange, WorkoutConfig, WorkoutSummary};

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: Option<DisplaySnapshot>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, display: Option<DisplaySnapshot>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            display,
        }
    }

    pub fn ok(message: String, display: DisplaySnapshot) -> Self {
        Self::new("ok", message, Some(display))
    }

    /// The request was valid but changed nothing
    pub fn ignored(message: String, display: DisplaySnapshot) -> Self {
        Self::new("ignored", message, Some(display))
    }

    /// Settings are locked while the timer runs
    pub fn locked(message: String, display: Option<DisplaySnapshot>) -> Self {
        Self::new("locked", message, display)
    }

    pub fn error(message: String) -> Self {
        Self::new("error", message, None)
    }
}

/// Full status of the timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub display: DisplaySnapshot,
    pub summary: WorkoutSummary,
    pub settings: WorkoutConfig,
    pub sound_enabled: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Configuration together with its legal ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: WorkoutConfig,
    pub ranges: BTreeMap<String, SettingRange>,
    pub summary: WorkoutSummary,
}

impl SettingsResponse {
    pub fn new(settings: WorkoutConfig, summary: WorkoutSummary) -> Self {
        let ranges = Setting::ALL
            .into_iter()
            .map(|setting| (setting.key().to_string(), setting.range()))
            .collect();
        Self {
            settings,
            ranges,
            summary,
        }
    }
}

/// Body of `POST /settings/:key/adjust`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdjustRequest {
    /// Number of steps, negative to decrease
    pub direction: i32,
}

/// Body of `PUT /settings/:key`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetRequest {
    /// New value, clamped into the setting's range
    pub value: i64,
}

/// Body of `POST /visibility`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub hidden: bool,
}

/// Response of `POST /sound/toggle`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundResponse {
    pub sound_enabled: bool,
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
