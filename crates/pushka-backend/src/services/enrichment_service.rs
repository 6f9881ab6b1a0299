use std::time::Duration;

use pushka_bridge::{
    MessageFromBackend,
    notification::{EnrichedNotification, NotificationContent},
};
use tokio::sync::oneshot;

/// Runs one enrichment the way an extension host would: the handler's output
/// is awaited until `extension_deadline_secs`, after which the expiry signal
/// is raised and the best attempt is taken instead. Exactly one
/// [`MessageFromBackend::NotificationEnriched`] is sent per request.
pub async fn handle_enrich_request(
    context: super::AppContextHandle,
    request_id: u64,
    content: NotificationContent,
) {
    let (enricher, scope, deadline) = {
        let state = context.state.read().await;
        (
            state.enricher.clone(),
            state.scratch_dir.join(format!("request-{request_id}")),
            Duration::from_secs(state.config.enrichment.extension_deadline_secs),
        )
    };

    tokio::spawn(async move {
        let fallback = content.clone();
        let (delivered_tx, mut delivered_rx) = oneshot::channel();
        let session = enricher.did_receive(content, scope, move |notification| {
            let _ = delivered_tx.send(notification);
        });

        let delivered = match tokio::time::timeout(deadline, &mut delivered_rx).await {
            Ok(delivered) => delivered,
            Err(_) => {
                log::warn!(
                    "Request {request_id} hit the {}s extension deadline",
                    deadline.as_secs()
                );
                session.time_will_expire();
                delivered_rx.await
            }
        };

        let notification = delivered.unwrap_or_else(|_| {
            log::error!("Request {request_id} lost its completion handler");
            EnrichedNotification::unmodified(fallback)
        });
        context
            .send(MessageFromBackend::NotificationEnriched {
                request_id,
                notification,
            })
            .await;

        session.join().await;
    });
}
