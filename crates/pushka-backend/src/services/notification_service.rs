use pushka_bridge::{
    MessageFromBackend,
    notification::{
        BackgroundFetchResult, DeliveryOrigin, NotificationPayload, NotificationReceivedEvent,
        PresentationOption,
    },
};

use crate::token::{format_device_token, record_registration_token};

/// Options used for every notification presented while the app is in front.
pub const FOREGROUND_PRESENTATION: [PresentationOption; 4] = [
    PresentationOption::Banner,
    PresentationOption::List,
    PresentationOption::Sound,
    PresentationOption::Badge,
];

/// Action identifiers the platform uses for built-in responses.
const DEFAULT_ACTION: &str = "com.apple.UNNotificationDefaultActionIdentifier";
const DISMISS_ACTION: &str = "com.apple.UNNotificationDismissActionIdentifier";

/// Republishes a received payload as `didReceiveRemoteNotification` and
/// answers the delivery path that brought it in. Replies go out from a
/// spawned task so a slow host never stalls the dispatch loop.
pub async fn handle_remote_notification(
    context: super::AppContextHandle,
    payload: NotificationPayload,
    origin: DeliveryOrigin,
) {
    match &origin {
        DeliveryOrigin::Response { action } => {
            log::info!("User responded to notification ({})", classify_action(action));
        }
        other => log::info!("Remote notification received ({other:?})"),
    }

    let answer = match origin {
        DeliveryOrigin::Foreground => Some(MessageFromBackend::PresentationOptions(
            FOREGROUND_PRESENTATION.to_vec(),
        )),
        DeliveryOrigin::Background => Some(MessageFromBackend::BackgroundFetchCompleted(
            BackgroundFetchResult::NewData,
        )),
        DeliveryOrigin::Launch | DeliveryOrigin::Response { .. } => None,
    };
    let event = NotificationReceivedEvent::new(payload, origin);

    tokio::spawn(async move {
        context
            .send(MessageFromBackend::RemoteNotificationReceived(event))
            .await;
        if let Some(answer) = answer {
            context.send(answer).await;
        }
    });
}

pub async fn handle_registration_token(context: super::AppContextHandle, token: Option<String>) {
    let store = context.state.read().await.token_store.clone();
    record_registration_token(store.as_ref(), token);
}

pub async fn handle_device_token(_context: super::AppContextHandle, bytes: Vec<u8>) {
    log::info!("Device registered for remote notifications");
    log::debug!("Device token: {}", format_device_token(&bytes));
}

fn classify_action(action: &str) -> &'static str {
    match action {
        DEFAULT_ACTION => "default",
        DISMISS_ACTION => "dismiss",
        _ => "custom",
    }
}
