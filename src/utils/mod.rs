//! Process utilities
//!
//! Signal handling for shutting the service down cleanly.

pub mod signals;

pub use signals::shutdown_signal;
