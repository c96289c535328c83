use std::path::PathBuf;

use thiserror::Error;

use crate::models::Difficulty;

pub const DEFAULT_DURATION_SECS: u32 = 15;
pub const DEFAULT_WARNING_SECS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("time limit must be at least one second")]
    ZeroDuration,

    #[error("warning threshold ({warning}s) exceeds the time limit ({duration}s)")]
    WarningExceedsDuration { warning: u32, duration: u32 },
}

/// Per-question countdown settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub enabled: bool,
    pub duration_secs: u32,
    pub warning_threshold_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: DEFAULT_DURATION_SECS,
            warning_threshold_secs: DEFAULT_WARNING_SECS,
        }
    }
}

impl TimerConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.warning_threshold_secs > self.duration_secs {
            return Err(ConfigError::WarningExceedsDuration {
                warning: self.warning_threshold_secs,
                duration: self.duration_secs,
            });
        }
        Ok(())
    }

    /// Whether the countdown display should switch to its warning style.
    pub fn is_warning(&self, remaining: u32) -> bool {
        self.enabled && remaining <= self.warning_threshold_secs
    }
}

/// Everything the terminal front end needs to start.
#[derive(Debug, Clone, Default)]
pub struct QuizConfig {
    /// Question bank file. `None` uses the embedded bank.
    pub questions_path: Option<PathBuf>,
    /// Score file. `None` uses the platform data directory.
    pub store_path: Option<PathBuf>,
    pub timer: TimerConfig,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Ring the terminal bell as the feedback tone.
    pub sound: bool,
}

impl QuizConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timer.validate()
    }
}
