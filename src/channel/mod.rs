//! Notification channel between the main window and the window coordinator
//!
//! Two fire-and-forget queues, one per direction. Each endpoint can only send
//! the messages its side owns. Ordering is preserved per sender.

pub mod messages;

use tokio::sync::mpsc;
use tracing::{debug, warn};

pub use messages::{ToCoordinator, ToMain};

/// Create a connected pair of endpoints
pub fn notification_channel() -> (MainEndpoint, CoordinatorEndpoint) {
    let (to_coordinator_tx, to_coordinator_rx) = mpsc::unbounded_channel();
    let (to_main_tx, to_main_rx) = mpsc::unbounded_channel();

    (
        MainEndpoint {
            tx: to_coordinator_tx,
            rx: to_main_rx,
        },
        CoordinatorEndpoint {
            tx: to_main_tx,
            rx: to_coordinator_rx,
        },
    )
}

/// The main window's side of the channel
#[derive(Debug)]
pub struct MainEndpoint {
    tx: mpsc::UnboundedSender<ToCoordinator>,
    rx: mpsc::UnboundedReceiver<ToMain>,
}

impl MainEndpoint {
    /// Send without waiting. Returns false if the coordinator is gone.
    pub fn send(&self, msg: ToCoordinator) -> bool {
        debug!("main -> coordinator: {}", msg.name());
        if self.tx.send(msg).is_err() {
            warn!("Coordinator is gone, dropping {} message", msg.name());
            return false;
        }
        true
    }

    /// Next message from the coordinator, `None` once it has shut down
    pub async fn recv(&mut self) -> Option<ToMain> {
        self.rx.recv().await
    }
}

/// The window coordinator's side of the channel
#[derive(Debug)]
pub struct CoordinatorEndpoint {
    tx: mpsc::UnboundedSender<ToMain>,
    rx: mpsc::UnboundedReceiver<ToCoordinator>,
}

impl CoordinatorEndpoint {
    pub fn send(&self, msg: ToMain) -> bool {
        debug!("coordinator -> main: {}", msg.name());
        if self.tx.send(msg).is_err() {
            warn!("Main window is gone, dropping {} message", msg.name());
            return false;
        }
        true
    }

    /// Next message from the main window, `None` once it has shut down
    pub async fn recv(&mut self) -> Option<ToCoordinator> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_flow_both_ways_in_order() {
        let (mut main, mut coordinator) = notification_channel();

        assert!(main.send(ToCoordinator::OpenPopup));
        assert!(main.send(ToCoordinator::StopPopup));
        assert_eq!(coordinator.recv().await, Some(ToCoordinator::OpenPopup));
        assert_eq!(coordinator.recv().await, Some(ToCoordinator::StopPopup));

        assert!(coordinator.send(ToMain::PopupClosed));
        assert_eq!(main.recv().await, Some(ToMain::PopupClosed));
    }

    #[tokio::test]
    async fn test_send_after_peer_dropped_is_reported() {
        let (main, coordinator) = notification_channel();
        drop(coordinator);
        assert!(!main.send(ToCoordinator::OpenPopup));
    }

    #[tokio::test]
    async fn test_recv_ends_when_peer_dropped() {
        let (main, mut coordinator) = notification_channel();
        drop(main);
        assert_eq!(coordinator.recv().await, None);
    }
}
