//! Workout configuration and its legal ranges

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the six tunable values of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Setting {
    Prepare,
    Work,
    Rest,
    Cycles,
    Sets,
    SetRest,
}

/// Inclusive bounds and step size of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl SettingRange {
    const fn new(min: u32, max: u32) -> Self {
        Self { min, max, step: 1 }
    }

    /// Clamp any integer into the range
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }
}

impl Setting {
    pub const ALL: [Setting; 6] = [
        Setting::Prepare,
        Setting::Work,
        Setting::Rest,
        Setting::Cycles,
        Setting::Sets,
        Setting::SetRest,
    ];

    /// Key used in the settings record and on the HTTP surface
    pub fn key(self) -> &'static str {
        match self {
            Setting::Prepare => "prepare",
            Setting::Work => "work",
            Setting::Rest => "rest",
            Setting::Cycles => "cycles",
            Setting::Sets => "sets",
            Setting::SetRest => "setRest",
        }
    }

    pub fn range(self) -> SettingRange {
        match self {
            Setting::Prepare => SettingRange::new(0, 600),
            Setting::Work => SettingRange::new(5, 600),
            Setting::Rest => SettingRange::new(0, 600),
            Setting::Cycles => SettingRange::new(1, 20),
            Setting::Sets => SettingRange::new(1, 10),
            Setting::SetRest => SettingRange::new(0, 600),
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Setting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Setting::ALL
            .into_iter()
            .find(|setting| setting.key() == s)
            .ok_or_else(|| format!("Unknown setting: {}", s))
    }
}

/// Durations (seconds) and repeat counts of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkoutConfig {
    pub prepare: u32,
    pub work: u32,
    pub rest: u32,
    pub cycles: u32,
    pub sets: u32,
    pub set_rest: u32,
}

impl WorkoutConfig {
    pub fn get(&self, setting: Setting) -> u32 {
        match setting {
            Setting::Prepare => self.prepare,
            Setting::Work => self.work,
            Setting::Rest => self.rest,
            Setting::Cycles => self.cycles,
            Setting::Sets => self.sets,
            Setting::SetRest => self.set_rest,
        }
    }

    /// Store `value` clamped into the setting's range and return what was stored
    pub fn set(&mut self, setting: Setting, value: i64) -> u32 {
        let clamped = setting.range().clamp(value);
        let slot = match setting {
            Setting::Prepare => &mut self.prepare,
            Setting::Work => &mut self.work,
            Setting::Rest => &mut self.rest,
            Setting::Cycles => &mut self.cycles,
            Setting::Sets => &mut self.sets,
            Setting::SetRest => &mut self.set_rest,
        };
        *slot = clamped;
        clamped
    }

    /// Move a setting by `direction` steps, clamping at the bounds
    pub fn adjust(&mut self, setting: Setting, direction: i32) -> u32 {
        let delta = i64::from(direction) * i64::from(setting.range().step);
        self.set(setting, i64::from(self.get(setting)) + delta)
    }

    /// Copy with every field forced into its legal range
    pub fn sanitized(&self) -> Self {
        let mut clean = *self;
        for setting in Setting::ALL {
            clean.set(setting, i64::from(self.get(setting)));
        }
        clean
    }

    /// Number of work intervals in the whole workout
    pub fn total_rounds(&self) -> u32 {
        self.cycles * self.sets
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            prepare: 10,
            work: 20,
            rest: 10,
            cycles: 8,
            sets: 1,
            set_rest: 60,
        }
    }
}
