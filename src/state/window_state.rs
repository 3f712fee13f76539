//! Window coordinator: owns the main window, the popup and the drink counter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::channel::{ToCoordinator, ToMain};
use crate::services::WindowBackend;

pub const MAIN_WINDOW_WIDTH: u32 = 510;
pub const MAIN_WINDOW_HEIGHT: u32 = 390;
pub const POPUP_WIDTH: u32 = 400;
pub const POPUP_HEIGHT: u32 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainWindow {
    pub width: u32,
    pub height: u32,
    pub open: bool,
}

impl MainWindow {
    pub fn new() -> Self {
        Self {
            width: MAIN_WINDOW_WIDTH,
            height: MAIN_WINDOW_HEIGHT,
            open: true,
        }
    }
}

impl Default for MainWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// The reminder popup. `count` is its only load parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupWindow {
    pub id: u64,
    pub count: u64,
    pub width: u32,
    pub height: u32,
    pub always_on_top: bool,
    pub skip_taskbar: bool,
    pub opened_at: DateTime<Utc>,
}

impl PopupWindow {
    fn new(id: u64, count: u64) -> Self {
        Self {
            id,
            count,
            width: POPUP_WIDTH,
            height: POPUP_HEIGHT,
            always_on_top: true,
            skip_taskbar: true,
            opened_at: Utc::now(),
        }
    }

    /// Text shown inside the popup
    pub fn message(&self) -> String {
        let glasses = if self.count == 1 { "glass" } else { "glasses" };
        format!(
            "Time to drink water! That's {} {} since you started.",
            self.count, glasses
        )
    }
}

/// Read-only view of the coordinator for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowStatus {
    pub drink_counter: u64,
    pub popup: Option<PopupWindow>,
    pub main_window_open: bool,
}

impl WindowStatus {
    pub fn new() -> Self {
        Self {
            drink_counter: 0,
            popup: None,
            main_window_open: true,
        }
    }
}

impl Default for WindowStatus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WindowCoordinator<B> {
    backend: B,
    main_window: MainWindow,
    popup: Option<PopupWindow>,
    drink_counter: u64,
    next_popup_id: u64,
}

impl<B: WindowBackend> WindowCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            main_window: MainWindow::new(),
            popup: None,
            drink_counter: 0,
            next_popup_id: 0,
        }
    }

    pub fn drink_counter(&self) -> u64 {
        self.drink_counter
    }

    pub fn popup(&self) -> Option<&PopupWindow> {
        self.popup.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn status(&self) -> WindowStatus {
        WindowStatus {
            drink_counter: self.drink_counter,
            popup: self.popup.clone(),
            main_window_open: self.main_window.open,
        }
    }

    /// Dispatch a message from the main window. Returns the reply to send back, if any.
    pub fn handle(&mut self, msg: ToCoordinator) -> Option<ToMain> {
        match msg {
            ToCoordinator::OpenPopup => self.handle_open_popup(),
            ToCoordinator::StopPopup => self.handle_stop_popup(),
        }
    }

    fn has_live_popup(&self) -> bool {
        self.popup
            .as_ref()
            .is_some_and(|popup| self.backend.is_alive(popup))
    }

    /// Show a popup unless a live one already exists
    pub fn handle_open_popup(&mut self) -> Option<ToMain> {
        if self.has_live_popup() {
            debug!("Popup already open, ignoring open-popup");
            return None;
        }

        self.next_popup_id += 1;
        let popup = PopupWindow::new(self.next_popup_id, self.drink_counter + 1);

        if let Err(e) = self.backend.show_popup(&popup) {
            // Report the popup as closed so the scheduler keeps its loop going
            error!("Failed to open popup: {}", e);
            self.popup = None;
            return Some(ToMain::PopupClosed);
        }

        self.drink_counter = popup.count;
        info!("Popup {} opened, drink counter is {}", popup.id, self.drink_counter);
        self.popup = Some(popup);
        None
    }

    /// Close the popup if one is open
    pub fn handle_stop_popup(&mut self) -> Option<ToMain> {
        let popup = self.popup.take()?;
        if !self.backend.is_alive(&popup) {
            debug!("Popup {} already destroyed", popup.id);
            return None;
        }

        self.backend.close_popup(&popup);
        self.finish_close(&popup)
    }

    /// The popup identified by `popup_id` was closed by the user
    pub fn on_popup_window_closed(&mut self, popup_id: u64) -> Option<ToMain> {
        match self.popup.take() {
            Some(popup) if popup.id == popup_id => {
                self.backend.close_popup(&popup);
                self.finish_close(&popup)
            }
            other => {
                debug!("Close event for popup {} that is not open", popup_id);
                self.popup = other;
                None
            }
        }
    }

    /// The windowing system removed the popup on its own (user dismissed the notification)
    pub fn on_popup_window_dismissed(&mut self, popup_id: u64) -> Option<ToMain> {
        match self.popup.take() {
            Some(popup) if popup.id == popup_id => {
                self.backend.forget_popup(&popup);
                self.finish_close(&popup)
            }
            other => {
                debug!("Dismissal of popup {} that is not open", popup_id);
                self.popup = other;
                None
            }
        }
    }

    /// The main window is gone; close any popup without notifying anyone
    pub fn on_main_window_closed(&mut self) {
        self.main_window.open = false;
        if let Some(popup) = self.popup.take() {
            if self.backend.is_alive(&popup) {
                self.backend.close_popup(&popup);
            }
        }
    }

    fn finish_close(&mut self, popup: &PopupWindow) -> Option<ToMain> {
        info!("Popup {} closed", popup.id);
        if self.main_window.open {
            self.backend.focus_main(&self.main_window);
        }
        Some(ToMain::PopupClosed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ReminderError, Result};
    use std::collections::HashSet;

    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub shown: Vec<PopupWindow>,
        pub closed: Vec<u64>,
        pub forgotten: Vec<u64>,
        pub focus_count: usize,
        pub destroyed: HashSet<u64>,
        pub fail_next: bool,
    }

    impl WindowBackend for RecordingBackend {
        fn show_popup(&mut self, popup: &PopupWindow) -> Result<()> {
            if self.fail_next {
                self.fail_next = false;
                return Err(ReminderError::Display("no display".to_string()));
            }
            self.shown.push(popup.clone());
            Ok(())
        }

        fn close_popup(&mut self, popup: &PopupWindow) {
            self.closed.push(popup.id);
        }

        fn forget_popup(&mut self, popup: &PopupWindow) {
            self.forgotten.push(popup.id);
        }

        fn is_alive(&self, popup: &PopupWindow) -> bool {
            !self.destroyed.contains(&popup.id)
        }

        fn focus_main(&mut self, _main: &MainWindow) {
            self.focus_count += 1;
        }
    }

    fn coordinator() -> WindowCoordinator<RecordingBackend> {
        WindowCoordinator::new(RecordingBackend::default())
    }

    #[test]
    fn test_open_popup_increments_counter_once() {
        let mut coordinator = coordinator();
        assert_eq!(coordinator.handle_open_popup(), None);
        assert_eq!(coordinator.drink_counter(), 1);

        // Second open while the first is alive is a no-op
        assert_eq!(coordinator.handle_open_popup(), None);
        assert_eq!(coordinator.drink_counter(), 1);
        assert_eq!(coordinator.backend().shown.len(), 1);
    }

    #[test]
    fn test_popup_receives_counter_and_window_flags() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();

        let popup = coordinator.popup().unwrap();
        assert_eq!(popup.count, 1);
        assert!(popup.always_on_top);
        assert!(popup.skip_taskbar);
        assert_eq!((popup.width, popup.height), (POPUP_WIDTH, POPUP_HEIGHT));
        assert_eq!(coordinator.backend().shown[0].count, 1);
    }

    #[test]
    fn test_counter_keeps_growing_across_popups() {
        let mut coordinator = coordinator();
        for expected in 1..=3 {
            coordinator.handle_open_popup();
            let id = coordinator.popup().unwrap().id;
            assert_eq!(coordinator.drink_counter(), expected);
            assert_eq!(coordinator.on_popup_window_closed(id), Some(ToMain::PopupClosed));
        }
        assert!(coordinator.popup().is_none());
    }

    #[test]
    fn test_destroyed_popup_is_replaced() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();
        let id = coordinator.popup().unwrap().id;
        coordinator.backend.destroyed.insert(id);

        coordinator.handle_open_popup();
        assert_eq!(coordinator.drink_counter(), 2);
        assert_ne!(coordinator.popup().unwrap().id, id);
    }

    #[test]
    fn test_stop_popup_closes_and_notifies() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();
        let id = coordinator.popup().unwrap().id;

        assert_eq!(coordinator.handle_stop_popup(), Some(ToMain::PopupClosed));
        assert!(coordinator.popup().is_none());
        assert_eq!(coordinator.backend().closed, vec![id]);
        assert_eq!(coordinator.backend().focus_count, 1);
    }

    #[test]
    fn test_stop_popup_without_popup_is_noop() {
        let mut coordinator = coordinator();
        assert_eq!(coordinator.handle(ToCoordinator::StopPopup), None);
        assert!(coordinator.backend().closed.is_empty());
    }

    #[test]
    fn test_stop_popup_on_destroyed_popup_clears_silently() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();
        let id = coordinator.popup().unwrap().id;
        coordinator.backend.destroyed.insert(id);

        assert_eq!(coordinator.handle_stop_popup(), None);
        assert!(coordinator.popup().is_none());
        assert!(coordinator.backend().closed.is_empty());
    }

    #[test]
    fn test_stale_close_event_is_ignored() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();
        let id = coordinator.popup().unwrap().id;

        assert_eq!(coordinator.on_popup_window_closed(id + 10), None);
        assert_eq!(coordinator.popup().map(|p| p.id), Some(id));
    }

    #[test]
    fn test_no_focus_after_main_window_closed() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();
        coordinator.on_main_window_closed();

        assert!(coordinator.popup().is_none());
        assert!(!coordinator.status().main_window_open);
        assert_eq!(coordinator.backend().focus_count, 0);
        assert_eq!(coordinator.backend().closed.len(), 1);
    }

    #[test]
    fn test_failed_open_does_not_count() {
        let mut coordinator = coordinator();
        coordinator.backend.fail_next = true;

        assert_eq!(coordinator.handle_open_popup(), Some(ToMain::PopupClosed));
        assert_eq!(coordinator.drink_counter(), 0);
        assert!(coordinator.popup().is_none());

        coordinator.handle_open_popup();
        assert_eq!(coordinator.drink_counter(), 1);
    }

    #[test]
    fn test_dismissed_popup_notifies_without_closing_again() {
        let mut coordinator = coordinator();
        coordinator.handle_open_popup();
        let id = coordinator.popup().unwrap().id;

        assert_eq!(coordinator.on_popup_window_dismissed(id + 1), None);
        assert!(coordinator.popup().is_some());

        assert_eq!(coordinator.on_popup_window_dismissed(id), Some(ToMain::PopupClosed));
        assert!(coordinator.popup().is_none());
        assert!(coordinator.backend().closed.is_empty());
        assert_eq!(coordinator.backend().forgotten, vec![id]);
        assert_eq!(coordinator.backend().focus_count, 1);

        // The watcher for a popup closed by stop reports a stale id
        coordinator.handle_open_popup();
        let next = coordinator.popup().unwrap().id;
        coordinator.handle_stop_popup();
        assert_eq!(coordinator.on_popup_window_dismissed(next), None);
        assert_eq!(coordinator.drink_counter(), 2);
    }

    #[test]
    fn test_popup_message_pluralizes() {
        assert!(PopupWindow::new(1, 1).message().contains("1 glass "));
        assert!(PopupWindow::new(2, 4).message().contains("4 glasses"));
    }
}
