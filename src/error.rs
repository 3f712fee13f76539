//! Error types for the reminder service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Invalid numbers entered: minutes={minutes}, seconds={seconds}")]
    InvalidInterval { minutes: i64, seconds: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("Display error: {0}")]
    Display(String),
}

impl ReminderError {
    /// Whether the error was caused by bad user input rather than the service
    pub fn is_validation(&self) -> bool {
        matches!(self, ReminderError::InvalidInterval { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReminderError>;
