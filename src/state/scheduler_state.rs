//! Reminder scheduler state machine
//!
//! The scheduler never touches a clock or a channel itself. Every operation
//! updates the state and returns the side effects the host has to carry out,
//! in order.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ReminderConfig;
use crate::channel::ToCoordinator;

/// Identifies one armed timer so a late expiry of a replaced timer can be ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// Side effect requested by the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEffect {
    Persist(ReminderConfig),
    CancelTimer(TimerHandle),
    ArmTimer { handle: TimerHandle, after: Duration },
    Send(ToCoordinator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Armed,
    PopupPending,
}

/// Snapshot of the scheduler host published for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub phase: SchedulerPhase,
    pub active: bool,
    pub popup_open: bool,
    /// Current input values
    pub config: ReminderConfig,
    /// Interval the scheduler re-arms with
    pub interval_ms: u64,
    pub next_popup_at: Option<DateTime<Utc>>,
}

impl SchedulerStatus {
    pub fn idle(config: ReminderConfig) -> Self {
        Self {
            phase: SchedulerPhase::Idle,
            active: false,
            popup_open: false,
            config,
            interval_ms: 0,
            next_popup_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    active: bool,
    popup_open: bool,
    pending_timer: Option<TimerHandle>,
    /// Last interval armed, reused when the popup closes
    interval: Duration,
    next_handle: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            active: false,
            popup_open: false,
            pending_timer: None,
            interval: Duration::ZERO,
            next_handle: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_popup_open(&self) -> bool {
        self.popup_open
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending_timer
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn phase(&self) -> SchedulerPhase {
        match (self.active, self.popup_open) {
            (false, _) => SchedulerPhase::Idle,
            (true, true) => SchedulerPhase::PopupPending,
            (true, false) => SchedulerPhase::Armed,
        }
    }

    /// Activate the reminder and arm a fresh timer for `config`
    pub fn start(&mut self, config: ReminderConfig) -> Vec<SchedulerEffect> {
        self.interval = config.interval();
        self.active = true;

        let mut effects = vec![SchedulerEffect::Persist(config)];
        self.cancel_pending(&mut effects);
        self.arm(&mut effects);

        info!(
            "Reminder started! First popup in {} minutes and {} seconds.",
            config.minutes, config.seconds
        );
        effects
    }

    /// Deactivate the reminder and ask the coordinator to close any popup
    pub fn stop(&mut self) -> Vec<SchedulerEffect> {
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.active = false;
        effects.push(SchedulerEffect::Send(ToCoordinator::StopPopup));

        info!("Reminder stopped!");
        effects
    }

    /// Commit an edited interval. While active the countdown restarts from now.
    pub fn update_config(&mut self, config: ReminderConfig) -> Vec<SchedulerEffect> {
        let mut effects = vec![SchedulerEffect::Persist(config)];
        if !self.active {
            debug!("Reminder inactive, saved new interval without arming a timer");
            return effects;
        }

        self.cancel_pending(&mut effects);
        self.interval = config.interval();
        self.arm(&mut effects);

        info!(
            "Timer updated: Next popup in {} minutes and {} seconds.",
            config.minutes, config.seconds
        );
        effects
    }

    /// The timer identified by `handle` has fired
    pub fn timer_expired(&mut self, handle: TimerHandle) -> Vec<SchedulerEffect> {
        if self.pending_timer != Some(handle) {
            debug!("Ignoring expiry of replaced timer {:?}", handle);
            return Vec::new();
        }
        self.pending_timer = None;
        self.request_popup()
    }

    /// Ask for the popup unless one is already requested or the reminder is off
    pub fn request_popup(&mut self) -> Vec<SchedulerEffect> {
        if self.popup_open || !self.active {
            debug!(
                "Popup request skipped (popup_open={}, active={})",
                self.popup_open, self.active
            );
            return Vec::new();
        }
        self.popup_open = true;
        vec![SchedulerEffect::Send(ToCoordinator::OpenPopup)]
    }

    /// The popup has closed; the next reminder is timed from now
    pub fn on_popup_closed(&mut self) -> Vec<SchedulerEffect> {
        self.popup_open = false;
        let mut effects = Vec::new();
        if self.active {
            self.cancel_pending(&mut effects);
            self.arm(&mut effects);
        }
        effects
    }

    fn cancel_pending(&mut self, effects: &mut Vec<SchedulerEffect>) {
        if let Some(handle) = self.pending_timer.take() {
            effects.push(SchedulerEffect::CancelTimer(handle));
        }
    }

    fn arm(&mut self, effects: &mut Vec<SchedulerEffect>) {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending_timer = Some(handle);
        effects.push(SchedulerEffect::ArmTimer {
            handle,
            after: self.interval,
        });
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
