//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};

use crate::services::{AudioSink, LogSink, NoAudio, TerminalBell, DEFAULT_SETTINGS_FILE};

/// How cues are made audible
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioBackend {
    /// Ring the terminal bell
    Bell,
    /// Only log cues
    Log,
    /// No audio output
    None,
}

impl AudioBackend {
    pub fn sink(self) -> Arc<dyn AudioSink> {
        match self {
            AudioBackend::Bell => Arc::new(TerminalBell),
            AudioBackend::Log => Arc::new(LogSink),
            AudioBackend::None => Arc::new(NoAudio),
        }
    }
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "interval-timer")]
#[command(about = "A drift-corrected interval workout timer with an HTTP control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File holding the workout settings
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Audio backend used for cues
    #[arg(short, long, value_enum, default_value = "bell")]
    pub audio: AudioBackend,

    /// Start with sound enabled
    #[arg(long)]
    pub sound: bool,

    /// Tick cadence in milliseconds
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub frame_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
