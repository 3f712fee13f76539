//! Background tasks module
//!
//! Each window context runs as its own task and owns its state outright.
//! The two talk only through the notification channel.

pub mod scheduler_host;
pub mod window_coordinator;

// Re-export main types
pub use scheduler_host::{HostCommand, SchedulerHost};
pub use window_coordinator::{window_coordinator_task, PopupEvent};
