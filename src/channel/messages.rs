//! Messages carried by the notification channel

use serde::{Deserialize, Serialize};

/// Sent by the main window (scheduler host) to the window coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToCoordinator {
    /// Show the reminder popup
    OpenPopup,
    /// Close the reminder popup, the reminder has been deactivated
    StopPopup,
}

/// Sent by the window coordinator back to the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToMain {
    PopupClosed,
}

impl ToCoordinator {
    pub fn name(&self) -> &'static str {
        match self {
            ToCoordinator::OpenPopup => "open-popup",
            ToCoordinator::StopPopup => "stop-popup",
        }
    }
}

impl ToMain {
    pub fn name(&self) -> &'static str {
        match self {
            ToMain::PopupClosed => "popup-closed",
        }
    }
}
