use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name under which received payloads are rebroadcast inside the process.
pub const DID_RECEIVE_REMOTE_NOTIFICATION: &str = "didReceiveRemoteNotification";

/// Opaque push payload: string keys mapped to arbitrary nested JSON values.
///
/// The payload is supplied by the delivery service and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct NotificationPayload(Map<String, Value>);

impl NotificationPayload {
    /// Follows `path` through nested objects and returns the value at its end.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }
}

/// Visible content of a delivered notification plus the payload it came with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub badge: Option<u32>,
    pub sound: Option<String>,
    /// Full payload as delivered, used to locate the image reference.
    pub user_info: NotificationPayload,
}

impl NotificationContent {
    /// Builds content from an APNs-shaped payload. `aps.alert` may be either
    /// a plain string (the body) or an object with `title`, `subtitle` and
    /// `body` fields. Missing fields are left empty.
    pub fn from_payload(payload: NotificationPayload) -> Self {
        let mut content = NotificationContent::default();

        match payload.lookup(&["aps", "alert"]) {
            Some(Value::String(body)) => content.body = body.clone(),
            Some(Value::Object(alert)) => {
                let field = |key: &str| {
                    alert
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                content.title = field("title");
                content.subtitle = field("subtitle");
                content.body = field("body");
            }
            _ => {}
        }

        content.badge = payload
            .lookup(&["aps", "badge"])
            .and_then(Value::as_u64)
            .and_then(|badge| u32::try_from(badge).ok());
        content.sound = payload
            .lookup(&["aps", "sound"])
            .and_then(Value::as_str)
            .map(ToString::to_string);
        content.user_info = payload;
        content
    }
}

/// A downloaded media file ready to be shown alongside a notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttachmentDescriptor {
    /// Fixed logical identifier of the attachment.
    pub identifier: String,
    /// File extension the stored file carries, without the leading dot.
    pub extension: String,
    /// Type hint handed to the renderer (e.g. `public.png`).
    pub media_type: String,
    /// Scoped, single-use file holding the image bytes. Cleanup belongs to
    /// whoever owns the scope.
    pub location: PathBuf,
}

/// Notification content handed back to the host, with at most one attachment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnrichedNotification {
    pub content: NotificationContent,
    pub attachment: Option<AttachmentDescriptor>,
}

impl EnrichedNotification {
    /// The content exactly as it was delivered.
    pub fn unmodified(content: NotificationContent) -> Self {
        Self {
            content,
            attachment: None,
        }
    }

    pub fn with_attachment(content: NotificationContent, attachment: AttachmentDescriptor) -> Self {
        Self {
            content,
            attachment: Some(attachment),
        }
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Path along which a remote notification reached the app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryOrigin {
    /// The app was launched by opening the notification.
    Launch,
    /// Silent/background data delivery.
    Background,
    /// Delivered while the app was in the foreground.
    Foreground,
    /// The user acted on a displayed notification.
    Response { action: String },
}

/// Event rebroadcast to in-process subscribers for every received payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationReceivedEvent {
    /// Always [`DID_RECEIVE_REMOTE_NOTIFICATION`].
    pub name: &'static str,
    pub origin: DeliveryOrigin,
    pub payload: NotificationPayload,
    pub received_at: DateTime<Utc>,
}

impl NotificationReceivedEvent {
    pub fn new(payload: NotificationPayload, origin: DeliveryOrigin) -> Self {
        Self {
            name: DID_RECEIVE_REMOTE_NOTIFICATION,
            origin,
            payload,
            received_at: Utc::now(),
        }
    }
}

/// How a foreground notification should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationOption {
    Banner,
    List,
    Sound,
    Badge,
}

/// Outcome of processing a background data delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFetchResult {
    NewData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> NotificationPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn lookup_walks_nested_objects() {
        let payload = payload(json!({
            "fcm_options": { "image": "https://a/x.png" },
            "image": 7
        }));

        assert_eq!(
            payload.lookup(&["fcm_options", "image"]),
            Some(&json!("https://a/x.png"))
        );
        assert_eq!(payload.lookup(&["image", "nested"]), None);
        assert_eq!(payload.lookup(&[]), None);
    }

    #[test]
    fn content_from_alert_object() {
        let content = NotificationContent::from_payload(payload(json!({
            "aps": {
                "alert": { "title": "Sale", "subtitle": "Today", "body": "50% off" },
                "badge": 3,
                "sound": "default"
            }
        })));

        assert_eq!(content.title, "Sale");
        assert_eq!(content.subtitle, "Today");
        assert_eq!(content.body, "50% off");
        assert_eq!(content.badge, Some(3));
        assert_eq!(content.sound.as_deref(), Some("default"));
        assert_eq!(content.user_info.lookup(&["aps", "badge"]), Some(&json!(3)));
    }

    #[test]
    fn content_from_alert_string() {
        let content =
            NotificationContent::from_payload(payload(json!({ "aps": { "alert": "hello" } })));

        assert_eq!(content.title, "");
        assert_eq!(content.body, "hello");
        assert_eq!(content.badge, None);
    }

    #[test]
    fn received_event_carries_relay_name() {
        let event = NotificationReceivedEvent::new(
            payload(json!({ "k": "v" })),
            DeliveryOrigin::Foreground,
        );
        assert_eq!(event.name, "didReceiveRemoteNotification");
        assert_eq!(event.payload.lookup(&["k"]), Some(&json!("v")));
    }
}
