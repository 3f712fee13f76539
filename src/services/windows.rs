//! Window backends: how the popup is actually shown to the user

use std::collections::HashMap;

use notify_rust::{Notification, Timeout};
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    sync::mpsc,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ReminderError, Result},
    state::{MainWindow, PopupWindow},
    tasks::PopupEvent,
};

pub const APP_NAME: &str = "drink-water";
const POPUP_TITLE: &str = "Drink Water Reminder";

/// Seam between the window coordinator and whatever renders the windows
pub trait WindowBackend: Send + 'static {
    /// Hand the backend the queue on which it reports popups closed outside the app
    fn attach(&mut self, _events: mpsc::UnboundedSender<PopupEvent>) {}

    /// Present a freshly created popup. An error means the popup never appeared.
    fn show_popup(&mut self, popup: &PopupWindow) -> Result<()>;

    /// Dismiss a popup that is being closed
    fn close_popup(&mut self, popup: &PopupWindow);

    /// Drop bookkeeping for a popup the windowing system already removed
    fn forget_popup(&mut self, _popup: &PopupWindow) {}

    /// Whether the popup still exists on screen
    fn is_alive(&self, _popup: &PopupWindow) -> bool {
        true
    }

    /// Bring the main window back to the front
    fn focus_main(&mut self, main: &MainWindow);
}

/// Run a blocking call from the coordinator without stalling other tasks
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn build_notification(body: &str) -> Notification {
    Notification::new()
        .summary(POPUP_TITLE)
        .body(body)
        .appname(APP_NAME)
        .timeout(Timeout::Never)
        .finalize()
}

/// Show the notification on its own thread and keep that thread waiting for it to close.
/// Returns the notification id once the daemon has accepted it.
#[cfg(all(unix, not(target_os = "macos")))]
fn show_and_watch(
    popup_id: u64,
    body: String,
    events: Option<mpsc::UnboundedSender<PopupEvent>>,
) -> Result<u32> {
    let (shown_tx, shown_rx) = std::sync::mpsc::channel();

    std::thread::Builder::new()
        .name(format!("popup-{}", popup_id))
        .spawn(move || {
            let handle = match build_notification(&body).show() {
                Ok(handle) => handle,
                Err(e) => {
                    let _ = shown_tx.send(Err(e.to_string()));
                    return;
                }
            };
            let _ = shown_tx.send(Ok(handle.id()));

            handle.on_close(move || {
                debug!("Notification for popup {} closed", popup_id);
                if let Some(events) = &events {
                    let _ = events.send(PopupEvent::Dismissed { popup_id });
                }
            });
        })?;

    match shown_rx.recv() {
        Ok(Ok(notification_id)) => Ok(notification_id),
        Ok(Err(e)) => Err(ReminderError::Display(e)),
        Err(_) => Err(ReminderError::Display(
            "notification thread exited before showing".to_string(),
        )),
    }
}

/// Close notifications are not observable here; the popup closes through the app only
#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_and_watch(
    _popup_id: u64,
    body: String,
    _events: Option<mpsc::UnboundedSender<PopupEvent>>,
) -> Result<u32> {
    build_notification(&body)
        .show()
        .map(|_| 0)
        .map_err(|e| ReminderError::Display(e.to_string()))
}

/// Replace the notification with one that expires at once, which closes it on the daemon
#[cfg(all(unix, not(target_os = "macos")))]
fn dismiss(notification_id: u32) {
    std::thread::spawn(move || {
        let result = Notification::new()
            .id(notification_id)
            .summary(POPUP_TITLE)
            .appname(APP_NAME)
            .timeout(Timeout::Milliseconds(1))
            .show();
        if let Err(e) = result {
            warn!("Failed to dismiss notification {}: {}", notification_id, e);
        }
    });
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn dismiss(notification_id: u32) {
    debug!("Notification {} left for the user to dismiss", notification_id);
}

/// Shows the popup as a persistent desktop notification
#[derive(Debug, Default)]
pub struct DesktopBackend {
    events: Option<mpsc::UnboundedSender<PopupEvent>>,
    /// Daemon notification id for each popup on screen
    notifications: HashMap<u64, u32>,
}

impl DesktopBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowBackend for DesktopBackend {
    fn attach(&mut self, events: mpsc::UnboundedSender<PopupEvent>) {
        self.events = Some(events);
    }

    fn show_popup(&mut self, popup: &PopupWindow) -> Result<()> {
        let events = self.events.clone();
        let notification_id = run_blocking(|| show_and_watch(popup.id, popup.message(), events))?;
        debug!("Popup {} shown as notification {}", popup.id, notification_id);
        self.notifications.insert(popup.id, notification_id);
        Ok(())
    }

    fn close_popup(&mut self, popup: &PopupWindow) {
        if let Some(notification_id) = self.notifications.remove(&popup.id) {
            dismiss(notification_id);
        }
    }

    fn forget_popup(&mut self, popup: &PopupWindow) {
        self.notifications.remove(&popup.id);
    }

    fn focus_main(&mut self, main: &MainWindow) {
        debug!("Focusing main window ({}x{})", main.width, main.height);
    }
}

/// Logs popups instead of showing them, for servers and terminals without a desktop
#[derive(Debug, Default)]
pub struct HeadlessBackend;

impl HeadlessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WindowBackend for HeadlessBackend {
    fn show_popup(&mut self, popup: &PopupWindow) -> Result<()> {
        info!("[popup {}] {}", popup.id, popup.message());
        Ok(())
    }

    fn close_popup(&mut self, popup: &PopupWindow) {
        info!("[popup {}] closed", popup.id);
    }

    fn focus_main(&mut self, _main: &MainWindow) {
        debug!("Main window focused");
    }
}

/// Backend selected at startup
pub enum AnyBackend {
    Desktop(DesktopBackend),
    Headless(HeadlessBackend),
}

impl AnyBackend {
    pub fn from_headless_flag(headless: bool) -> Self {
        if headless {
            AnyBackend::Headless(HeadlessBackend::new())
        } else {
            AnyBackend::Desktop(DesktopBackend::new())
        }
    }
}

impl WindowBackend for AnyBackend {
    fn attach(&mut self, events: mpsc::UnboundedSender<PopupEvent>) {
        match self {
            AnyBackend::Desktop(b) => b.attach(events),
            AnyBackend::Headless(b) => b.attach(events),
        }
    }

    fn show_popup(&mut self, popup: &PopupWindow) -> Result<()> {
        match self {
            AnyBackend::Desktop(b) => b.show_popup(popup),
            AnyBackend::Headless(b) => b.show_popup(popup),
        }
    }

    fn close_popup(&mut self, popup: &PopupWindow) {
        match self {
            AnyBackend::Desktop(b) => b.close_popup(popup),
            AnyBackend::Headless(b) => b.close_popup(popup),
        }
    }

    fn forget_popup(&mut self, popup: &PopupWindow) {
        match self {
            AnyBackend::Desktop(b) => b.forget_popup(popup),
            AnyBackend::Headless(b) => b.forget_popup(popup),
        }
    }

    fn is_alive(&self, popup: &PopupWindow) -> bool {
        match self {
            AnyBackend::Desktop(b) => b.is_alive(popup),
            AnyBackend::Headless(b) => b.is_alive(popup),
        }
    }

    fn focus_main(&mut self, main: &MainWindow) {
        match self {
            AnyBackend::Desktop(b) => b.focus_main(main),
            AnyBackend::Headless(b) => b.focus_main(main),
        }
    }
}
