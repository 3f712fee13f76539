//! Window coordinator background task

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::{
    channel::CoordinatorEndpoint,
    services::WindowBackend,
    state::{WindowCoordinator, WindowStatus},
};

/// Events raised by the popup window itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    /// The user closed the popup
    Closed { popup_id: u64 },
    /// The windowing system already removed the popup
    Dismissed { popup_id: u64 },
}

/// Background task that owns the popup and the drink counter
pub async fn window_coordinator_task<B: WindowBackend>(
    mut coordinator: WindowCoordinator<B>,
    mut endpoint: CoordinatorEndpoint,
    mut popup_events: mpsc::UnboundedReceiver<PopupEvent>,
    status_tx: watch::Sender<WindowStatus>,
) {
    info!("Starting window coordinator task");
    let _ = status_tx.send(coordinator.status());

    loop {
        tokio::select! {
            msg = endpoint.recv() => match msg {
                Some(msg) => {
                    debug!("Coordinator received {}", msg.name());
                    if let Some(reply) = coordinator.handle(msg) {
                        endpoint.send(reply);
                    }
                }
                None => {
                    info!("Main window closed, shutting down window coordinator");
                    coordinator.on_main_window_closed();
                    let _ = status_tx.send(coordinator.status());
                    break;
                }
            },

            Some(event) = popup_events.recv() => match event {
                PopupEvent::Closed { popup_id } => {
                    if let Some(reply) = coordinator.on_popup_window_closed(popup_id) {
                        endpoint.send(reply);
                    }
                }
                PopupEvent::Dismissed { popup_id } => {
                    if let Some(reply) = coordinator.on_popup_window_dismissed(popup_id) {
                        endpoint.send(reply);
                    }
                }
            },
        }

        let _ = status_tx.send(coordinator.status());
    }
}
