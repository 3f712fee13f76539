//! Main application handle shared by the HTTP surface

use std::{
    sync::Mutex,
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use super::{IntervalInput, SchedulerStatus, WindowCoordinator, WindowStatus};
use crate::{
    channel::notification_channel,
    error::{ReminderError, Result},
    services::{SettingsStore, WindowBackend},
    tasks::{window_coordinator_task, HostCommand, PopupEvent, SchedulerHost},
};

const COMMAND_QUEUE_SIZE: usize = 32;

/// Handle to the running reminder. Holds no reminder state itself, only the
/// channels into the two window contexts and their published snapshots.
#[derive(Debug)]
pub struct AppState {
    commands: mpsc::Sender<HostCommand>,
    popup_events: mpsc::UnboundedSender<PopupEvent>,
    scheduler_status: watch::Receiver<SchedulerStatus>,
    window_status: watch::Receiver<WindowStatus>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Load settings and spawn the scheduler host and window coordinator tasks.
    /// Must be called from within a tokio runtime.
    pub fn spawn<B: WindowBackend>(
        port: u16,
        host: String,
        store: SettingsStore,
        mut backend: B,
    ) -> Result<Self> {
        let config = store.load()?;
        info!(
            "Loaded settings from {}: {} minutes, {} seconds",
            store.path().display(),
            config.minutes,
            config.seconds
        );

        let (main_endpoint, coordinator_endpoint) = notification_channel();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let (popup_events_tx, popup_events_rx) = mpsc::unbounded_channel();
        let (scheduler_tx, scheduler_rx) = watch::channel(SchedulerStatus::idle(config));
        let (window_tx, window_rx) = watch::channel(WindowStatus::new());

        let scheduler_host = SchedulerHost::new(store, config, main_endpoint, scheduler_tx);
        tokio::spawn(scheduler_host.run(commands_rx));

        backend.attach(popup_events_tx.clone());
        let coordinator = WindowCoordinator::new(backend);
        tokio::spawn(window_coordinator_task(
            coordinator,
            coordinator_endpoint,
            popup_events_rx,
            window_tx,
        ));

        Ok(Self {
            commands: commands_tx,
            popup_events: popup_events_tx,
            scheduler_status: scheduler_rx,
            window_status: window_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        })
    }

    /// Commit both fields and start the reminder
    pub async fn start(&self, input: &IntervalInput) -> Result<SchedulerStatus> {
        let (minutes, seconds) = input.coerce();
        let status = self
            .request(|reply| HostCommand::Start {
                minutes,
                seconds,
                reply,
            })
            .await?;
        self.record_action("start");
        Ok(status)
    }

    pub async fn stop(&self) -> Result<SchedulerStatus> {
        let status = self.request(|reply| HostCommand::Stop { reply }).await?;
        self.record_action("stop");
        Ok(status)
    }

    /// Commit an edited field while the reminder may be running
    pub async fn update_config(&self, input: &IntervalInput) -> Result<SchedulerStatus> {
        let (minutes, seconds) = input.coerce();
        let status = self
            .request(|reply| HostCommand::UpdateConfig {
                minutes,
                seconds,
                reply,
            })
            .await?;
        self.record_action("update-config");
        Ok(status)
    }

    /// Close the popup as if the user clicked its close button.
    /// Returns the id of the popup that was asked to close.
    pub fn close_popup(&self) -> Result<Option<u64>> {
        let Some(popup_id) = self.window_status.borrow().popup.as_ref().map(|p| p.id) else {
            return Ok(None);
        };

        self.popup_events
            .send(PopupEvent::Closed { popup_id })
            .map_err(|_| ReminderError::ChannelClosed("window coordinator"))?;
        self.record_action("close-popup");
        Ok(Some(popup_id))
    }

    async fn request<F>(&self, build: F) -> Result<SchedulerStatus>
    where
        F: FnOnce(oneshot::Sender<Result<SchedulerStatus>>) -> HostCommand,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| ReminderError::ChannelClosed("scheduler host"))?;
        reply_rx
            .await
            .map_err(|_| ReminderError::ChannelClosed("scheduler host"))?
    }

    /// Get current scheduler snapshot
    pub fn scheduler_status(&self) -> SchedulerStatus {
        self.scheduler_status.borrow().clone()
    }

    /// Get current window snapshot
    pub fn window_status(&self) -> WindowStatus {
        self.window_status.borrow().clone()
    }

    /// Watch window changes, e.g. to wait for the next popup
    pub fn subscribe_window_status(&self) -> watch::Receiver<WindowStatus> {
        self.window_status.clone()
    }

    pub fn subscribe_scheduler_status(&self) -> watch::Receiver<SchedulerStatus> {
        self.scheduler_status.clone()
    }

    fn record_action(&self, action: &str) {
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to record last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
