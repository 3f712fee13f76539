//! Scheduler host: the main window's context
//!
//! Owns the scheduler state machine, the settings store and the single
//! pending timer. Receives user commands and popup-closed notifications and
//! carries out the effects the scheduler asks for.

use std::pin::Pin;

use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{sleep, Sleep},
};
use tracing::{debug, error, info, warn};

use crate::{
    channel::{MainEndpoint, ToMain},
    error::{ReminderError, Result},
    services::SettingsStore,
    state::{ReminderConfig, Scheduler, SchedulerEffect, SchedulerStatus, TimerHandle},
};

pub type Reply = oneshot::Sender<Result<SchedulerStatus>>;

/// User actions delivered from the main window surface
#[derive(Debug)]
pub enum HostCommand {
    Start {
        minutes: i64,
        seconds: i64,
        reply: Reply,
    },
    Stop {
        reply: Reply,
    },
    UpdateConfig {
        minutes: i64,
        seconds: i64,
        reply: Reply,
    },
}

struct PendingTimer {
    handle: TimerHandle,
    sleep: Pin<Box<Sleep>>,
}

pub struct SchedulerHost {
    scheduler: Scheduler,
    config: ReminderConfig,
    store: SettingsStore,
    endpoint: MainEndpoint,
    timer: Option<PendingTimer>,
    next_popup_at: Option<DateTime<Utc>>,
    status_tx: watch::Sender<SchedulerStatus>,
}

impl SchedulerHost {
    pub fn new(
        store: SettingsStore,
        config: ReminderConfig,
        endpoint: MainEndpoint,
        status_tx: watch::Sender<SchedulerStatus>,
    ) -> Self {
        Self {
            scheduler: Scheduler::new(),
            config,
            store,
            endpoint,
            timer: None,
            next_popup_at: None,
            status_tx,
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            phase: self.scheduler.phase(),
            active: self.scheduler.is_active(),
            popup_open: self.scheduler.is_popup_open(),
            config: self.config,
            interval_ms: self.scheduler.interval().as_millis() as u64,
            next_popup_at: self.next_popup_at,
        }
    }

    /// Process commands, popup notifications and timer expiries until either peer goes away
    pub async fn run(mut self, mut commands: mpsc::Receiver<HostCommand>) {
        info!("Starting scheduler host task");
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!("Command channel closed");
                        break;
                    }
                },

                msg = self.endpoint.recv() => match msg {
                    Some(ToMain::PopupClosed) => {
                        debug!("Popup closed, rescheduling");
                        let effects = self.scheduler.on_popup_closed();
                        if let Err(e) = self.apply(effects) {
                            error!("Failed to reschedule after popup closed: {}", e);
                        }
                    }
                    None => {
                        warn!("Window coordinator is gone, stopping scheduler host");
                        break;
                    }
                },

                handle = wait_for_timer(&mut self.timer) => {
                    self.timer = None;
                    debug!("Timer {:?} expired", handle);
                    let effects = self.scheduler.timer_expired(handle);
                    if let Err(e) = self.apply(effects) {
                        error!("Failed to handle timer expiry: {}", e);
                    }
                }
            }

            self.publish();
        }

        info!("Scheduler host task finished");
    }

    fn handle_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::Start {
                minutes,
                seconds,
                reply,
            } => {
                let result = self.validated(minutes, seconds).and_then(|config| {
                    let effects = self.scheduler.start(config);
                    self.apply(effects)
                });
                self.respond(reply, result);
            }
            HostCommand::Stop { reply } => {
                let effects = self.scheduler.stop();
                let result = self.apply(effects);
                self.respond(reply, result);
            }
            HostCommand::UpdateConfig {
                minutes,
                seconds,
                reply,
            } => {
                let result = self.validated(minutes, seconds).and_then(|config| {
                    let effects = self.scheduler.update_config(config);
                    self.apply(effects)
                });
                self.respond(reply, result);
            }
        }
    }

    fn validated(&self, minutes: i64, seconds: i64) -> Result<ReminderConfig> {
        ReminderConfig::from_signed(minutes, seconds).inspect_err(|_| {
            warn!(
                "Invalid numbers entered! minutes={}, seconds={}",
                minutes, seconds
            );
        })
    }

    fn respond(&self, reply: Reply, result: Result<()>) {
        let response = result.map(|()| self.status());
        if reply.send(response).is_err() {
            debug!("Command caller went away before the reply");
        }
    }

    /// Carry out effects in order. All effects run; the first failure is returned.
    fn apply(&mut self, effects: Vec<SchedulerEffect>) -> Result<()> {
        let mut first_error: Option<ReminderError> = None;

        for effect in effects {
            match effect {
                SchedulerEffect::Persist(config) => {
                    self.config = config;
                    if let Err(e) = self.store.save(&config) {
                        error!("Failed to save settings: {}", e);
                        first_error.get_or_insert(e);
                    }
                }
                SchedulerEffect::CancelTimer(handle) => {
                    if self.timer.as_ref().is_some_and(|t| t.handle == handle) {
                        debug!("Cancelled timer {:?}", handle);
                        self.timer = None;
                    }
                }
                SchedulerEffect::ArmTimer { handle, after } => {
                    debug!("Arming timer {:?} for {:?}", handle, after);
                    self.timer = Some(PendingTimer {
                        handle,
                        sleep: Box::pin(sleep(after)),
                    });
                    self.next_popup_at = chrono::Duration::from_std(after)
                        .ok()
                        .and_then(|d| Utc::now().checked_add_signed(d));
                }
                SchedulerEffect::Send(msg) => {
                    self.endpoint.send(msg);
                }
            }
        }

        if self.timer.is_none() {
            self.next_popup_at = None;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn publish(&self) {
        // Fails only when no receiver is left, which is fine
        let _ = self.status_tx.send(self.status());
    }
}

async fn wait_for_timer(timer: &mut Option<PendingTimer>) -> TimerHandle {
    match timer {
        Some(pending) => {
            pending.sleep.as_mut().await;
            pending.handle
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{notification_channel, CoordinatorEndpoint, ToCoordinator};
    use crate::state::SchedulerPhase;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        commands: mpsc::Sender<HostCommand>,
        coordinator: CoordinatorEndpoint,
        status: watch::Receiver<SchedulerStatus>,
        store: SettingsStore,
        _temp: TempDir,
    }

    fn spawn_host() -> Harness {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path().join("settings.json"));
        let config = store.load().unwrap();
        let (main, coordinator) = notification_channel();
        let (status_tx, status) = watch::channel(SchedulerStatus::idle(config));
        let (commands, commands_rx) = mpsc::channel(8);

        let host = SchedulerHost::new(store.clone(), config, main, status_tx);
        tokio::spawn(host.run(commands_rx));

        Harness {
            commands,
            coordinator,
            status,
            store,
            _temp: temp,
        }
    }

    impl Harness {
        async fn start(&self, minutes: i64, seconds: i64) -> Result<SchedulerStatus> {
            let (reply, rx) = oneshot::channel();
            self.commands
                .send(HostCommand::Start {
                    minutes,
                    seconds,
                    reply,
                })
                .await
                .unwrap();
            rx.await.unwrap()
        }

        async fn stop(&self) -> Result<SchedulerStatus> {
            let (reply, rx) = oneshot::channel();
            self.commands.send(HostCommand::Stop { reply }).await.unwrap();
            rx.await.unwrap()
        }

        async fn update(&self, minutes: i64, seconds: i64) -> Result<SchedulerStatus> {
            let (reply, rx) = oneshot::channel();
            self.commands
                .send(HostCommand::UpdateConfig {
                    minutes,
                    seconds,
                    reply,
                })
                .await
                .unwrap();
            rx.await.unwrap()
        }

        fn try_recv(&mut self) -> Option<ToCoordinator> {
            futures::FutureExt::now_or_never(self.coordinator.recv()).flatten()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_sends_one_open_popup() {
        let mut h = spawn_host();
        let status = h.start(0, 2).await.unwrap();
        assert_eq!(status.phase, SchedulerPhase::Armed);
        assert_eq!(status.interval_ms, 2_000);

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(h.try_recv(), None);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.try_recv(), Some(ToCoordinator::OpenPopup));

        // No further popup while the first is still open
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.try_recv(), None);
        assert_eq!(h.status.borrow().phase, SchedulerPhase::PopupPending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_still_arms_timer() {
        let mut h = spawn_host();
        // A directory where the settings file should be makes every write fail
        std::fs::remove_file(h.store.path()).unwrap();
        std::fs::create_dir(h.store.path()).unwrap();

        let err = h.start(0, 1).await.unwrap_err();
        assert!(!err.is_validation());
        assert!(matches!(err, ReminderError::Io(_)));

        let status = h.status.wait_for(|s| s.active).await.unwrap().clone();
        assert_eq!(status.phase, SchedulerPhase::Armed);
        assert_eq!(status.config, ReminderConfig::new(0, 1));

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(h.try_recv(), Some(ToCoordinator::OpenPopup));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_pending_timer() {
        let mut h = spawn_host();
        h.start(0, 5).await.unwrap();
        h.start(0, 2).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(h.try_recv(), Some(ToCoordinator::OpenPopup));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(h.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_popup_closed_rearms_from_close_time() {
        let mut h = spawn_host();
        h.start(0, 3).await.unwrap();

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(h.try_recv(), Some(ToCoordinator::OpenPopup));

        tokio::time::sleep(Duration::from_secs(5)).await;
        h.coordinator.send(ToMain::PopupClosed);

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(h.try_recv(), None);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.try_recv(), Some(ToCoordinator::OpenPopup));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer_and_requests_close() {
        let mut h = spawn_host();
        h.start(0, 2).await.unwrap();
        let status = h.stop().await.unwrap();
        assert!(!status.active);
        assert!(status.next_popup_at.is_none());
        assert_eq!(h.try_recv(), Some(ToCoordinator::StopPopup));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_start_is_rejected_without_state_change() {
        let h = spawn_host();
        let err = h.start(-1, 0).await.unwrap_err();
        assert!(err.is_validation());

        let status = h.status.borrow().clone();
        assert!(!status.active);
        assert_eq!(status.config, ReminderConfig::new(0, 30));
        assert_eq!(h.store.load().unwrap(), ReminderConfig::new(0, 30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_persists_config() {
        let h = spawn_host();
        h.start(1, 15).await.unwrap();
        assert_eq!(h.store.load().unwrap(), ReminderConfig::new(1, 15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_while_inactive_only_persists() {
        let mut h = spawn_host();
        let status = h.update(0, 1).await.unwrap();
        assert!(!status.active);
        assert_eq!(h.store.load().unwrap(), ReminderConfig::new(0, 1));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_while_active_restarts_countdown() {
        let mut h = spawn_host();
        h.start(0, 10).await.unwrap();
        tokio::time::sleep(Duration::from_secs(8)).await;

        h.update(0, 4).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_900)).await;
        assert_eq!(h.try_recv(), None);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.try_recv(), Some(ToCoordinator::OpenPopup));
    }
}
