//! Drink Water - reminds you to drink water on a configurable interval
//!
//! A scheduler counts down the configured interval and asks a window
//! coordinator to show a popup. When the popup closes the countdown starts
//! again. Settings persist to a small JSON file.

pub mod config;
pub mod error;
pub mod channel;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ReminderError, Result};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
