//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! replies and events back to the host over the bridge.

use std::sync::Arc;

use pushka_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the host.
    pub tx: Sender<MessageFromBackend>,
}

impl AppContext {
    /// Read and dispatch messages from the host until it closes the bridge.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a host message: {message:?}");
            self.dispatch_message(message).await;
        }
        log::info!("Host closed the bridge, backend loop finished");
    }

    /// Dispatches a host message down to the matching service handler.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::EnrichNotification {
                request_id,
                content,
            } => {
                services::enrichment_service::handle_enrich_request(
                    self.clone(),
                    request_id,
                    content,
                )
                .await;
            }
            MessageToBackend::RemoteNotification { payload, origin } => {
                services::notification_service::handle_remote_notification(
                    self.clone(),
                    payload,
                    origin,
                )
                .await;
            }
            MessageToBackend::EvaluateAppState => {
                services::bootstrap_service::handle_evaluate_request(self.clone()).await;
            }
            MessageToBackend::RegistrationToken(token) => {
                services::notification_service::handle_registration_token(self.clone(), token)
                    .await;
            }
            MessageToBackend::DeviceToken(bytes) => {
                services::notification_service::handle_device_token(self.clone(), bytes).await;
            }
        }
    }

    /// Send a message to the host. A host that already hung up is logged,
    /// not treated as fatal.
    pub async fn send(&self, message: MessageFromBackend) {
        if let Err(error) = self.tx.send(message).await {
            log::warn!("Host is gone, dropping {:?}", error.0);
        }
    }
}
