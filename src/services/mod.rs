//! External collaborators module
//!
//! This module contains the settings store and the window backends that
//! render popups.

pub mod settings;
pub mod windows;

// Re-export main types
pub use settings::{SettingsStore, SETTINGS_FILE_NAME};
pub use windows::{AnyBackend, DesktopBackend, HeadlessBackend, WindowBackend};
