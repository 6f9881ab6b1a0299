use pushka_bridge::notification::NotificationPayload;
use reqwest::Url;
use serde_json::Value;

/// One way an image reference can be encoded in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// `fcm_options.image`, set by the messaging console.
    FcmOptionsImage,
    /// `aps.mutable-content`. Conventionally a `1` flag rather than a URL;
    /// only string values are considered, so flag payloads fall through.
    ApsMutableContent,
    /// Top-level `image`.
    Image,
    /// Top-level `attachment-url`.
    AttachmentUrl,
}

impl ExtractionRule {
    /// Key path to the field, matched case-sensitively.
    pub fn path(self) -> &'static [&'static str] {
        match self {
            ExtractionRule::FcmOptionsImage => &["fcm_options", "image"],
            ExtractionRule::ApsMutableContent => &["aps", "mutable-content"],
            ExtractionRule::Image => &["image"],
            ExtractionRule::AttachmentUrl => &["attachment-url"],
        }
    }
}

/// Rules in priority order. The first one that yields a valid URL wins.
pub const EXTRACTION_RULES: [ExtractionRule; 4] = [
    ExtractionRule::FcmOptionsImage,
    ExtractionRule::ApsMutableContent,
    ExtractionRule::Image,
    ExtractionRule::AttachmentUrl,
];

/// Image URL located in a payload, plus the rule that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub url: Url,
    pub rule: ExtractionRule,
}

/// Locates the image URL in `payload`, trying [`EXTRACTION_RULES`] in order.
///
/// A rule only matches when its field holds a string that parses as a URL.
/// Results are never merged across rules.
pub fn extract_image_url(payload: &NotificationPayload) -> Option<ImageReference> {
    EXTRACTION_RULES.iter().find_map(|&rule| {
        let raw = payload.lookup(rule.path()).and_then(Value::as_str)?;
        match Url::parse(raw) {
            Ok(url) => Some(ImageReference { url, rule }),
            Err(error) => {
                log::debug!("Ignoring {:?} value {raw:?}: {error}", rule.path());
                None
            }
        }
    })
}
