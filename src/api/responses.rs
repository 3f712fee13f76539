//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{PopupWindow, ReminderConfig, SchedulerStatus, WindowStatus};

/// API response structure for reminder control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub scheduler: SchedulerStatus,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, scheduler: SchedulerStatus) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            scheduler,
        }
    }

    /// Create an active response
    pub fn active(message: String, scheduler: SchedulerStatus) -> Self {
        Self::new("active".to_string(), message, scheduler)
    }

    /// Create an inactive response
    pub fn inactive(message: String, scheduler: SchedulerStatus) -> Self {
        Self::new("inactive".to_string(), message, scheduler)
    }

    /// Pick active/inactive from the scheduler itself
    pub fn from_scheduler(message: String, scheduler: SchedulerStatus) -> Self {
        if scheduler.active {
            Self::active(message, scheduler)
        } else {
            Self::inactive(message, scheduler)
        }
    }
}

/// Values shown in the two input fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub minutes: String,
    pub seconds: String,
}

impl From<ReminderConfig> for SettingsResponse {
    fn from(config: ReminderConfig) -> Self {
        Self {
            minutes: config.minutes.to_string(),
            seconds: config.seconds.to_string(),
        }
    }
}

/// Popup surface: its load parameter and the text it shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupResponse {
    pub popup: PopupWindow,
    pub message: String,
}

impl From<PopupWindow> for PopupResponse {
    fn from(popup: PopupWindow) -> Self {
        let message = popup.message();
        Self { popup, message }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupCloseResponse {
    pub closed: Option<u64>,
}

/// Status response with scheduler and window snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub scheduler: SchedulerStatus,
    pub window: WindowStatus,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
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
