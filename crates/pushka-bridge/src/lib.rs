//! Communication bridge between the notification host and the backend.
//!
//! This crate defines the types and protocols used to connect a host (the
//! process that receives pushes from the delivery service and renders
//! whatever the backend hands back) with an asynchronous backend responsible
//! for attachment enrichment, startup routing, and token bookkeeping.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The host sends commands (e.g., enrich a notification, relay a received
//!   payload, evaluate the startup state).
//! - The backend pushes events (e.g., enriched notifications, relayed
//!   `didReceiveRemoteNotification` events, state changes).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns.

pub mod app_state;
pub mod config;
pub mod notification;

use serde::Serialize;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the host of state updates.
///
/// These are typically sent in response to host requests or to push
/// asynchronous events (e.g., relayed notifications, startup routing).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum MessageFromBackend {
    /// Response to the configuration request from the host.
    ConfigurationResponse(config::Config),
    /// The enrichment pipeline delivered content for a request. Sent exactly
    /// once per [`MessageToBackend::EnrichNotification`].
    NotificationEnriched {
        /// Identifier the host attached to the originating request.
        request_id: u64,
        /// Delivered content, with or without an attachment.
        notification: notification::EnrichedNotification,
    },
    /// In-process `didReceiveRemoteNotification` broadcast.
    RemoteNotificationReceived(notification::NotificationReceivedEvent),
    /// How a notification arriving in the foreground should be presented.
    PresentationOptions(Vec<notification::PresentationOption>),
    /// Result reported back for a background data delivery.
    BackgroundFetchCompleted(notification::BackgroundFetchResult),
    /// The startup routing state was published.
    AppStateChanged(app_state::AppState),
}

/// Commands issued by the host to control or query the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Enrich a delivered notification with its image attachment.
    EnrichNotification {
        /// Host-chosen identifier echoed back in the reply.
        request_id: u64,
        /// Original content as delivered by the push service.
        content: notification::NotificationContent,
    },
    /// A remote notification reached the app along one of the delivery paths.
    RemoteNotification {
        payload: notification::NotificationPayload,
        origin: notification::DeliveryOrigin,
    },
    /// Decide which of the startup screens to show.
    EvaluateAppState,
    /// The messaging SDK handed out a (possibly missing) registration token.
    RegistrationToken(Option<String>),
    /// The platform registered the device and returned its raw push token.
    DeviceToken(Vec<u8>),
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// host and backend.
pub struct BridgeChannels {
    /// Receiver used by the host to get messages from the backend.
    pub host_rx: Receiver<MessageFromBackend>,
    /// Sender used by the host to send commands to the backend.
    pub host_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the host.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the host.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_host_tx, to_host_rx) = mpsc::channel(buffer);
        Self {
            host_tx: to_backend_tx,
            host_rx: to_host_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_host_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
