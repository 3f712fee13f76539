//! State management module
//!
//! This module contains the reminder configuration, the scheduler and window
//! coordinator state machines, and the shared application handle.

pub mod reminder_config;
pub mod scheduler_state;
pub mod window_state;
pub mod app_state;

// Re-export main types
pub use reminder_config::{IntervalInput, NormalizedInput, ReminderConfig};
pub use scheduler_state::{
    Scheduler, SchedulerEffect, SchedulerPhase, SchedulerStatus, TimerHandle,
};
pub use window_state::{MainWindow, PopupWindow, WindowCoordinator, WindowStatus};
pub use app_state::AppState;
