use reqwest::Url;

/// Extension used when neither the URL nor the response says otherwise.
pub const DEFAULT_EXTENSION: &str = "jpg";

const JPEG_TYPE: &str = "public.jpeg";
const PNG_TYPE: &str = "public.png";
const GIF_TYPE: &str = "com.compuserve.gif";
// No universal identifier exists for WebP.
const WEBP_TYPE: &str = "org.webmproject.webp";

/// File extension and type hint chosen for a downloaded attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentType {
    pub extension: &'static str,
    pub media_type: &'static str,
}

/// Picks the attachment type for a download.
///
/// The URL suffix wins when it is a recognized image extension. Otherwise the
/// response MIME type is mapped, and JPEG is the final fallback.
pub fn resolve_attachment_type(url: &Url, mime_type: Option<&str>) -> AttachmentType {
    let extension = extension_from_url(url)
        .or_else(|| mime_type.and_then(extension_from_mime))
        .unwrap_or(DEFAULT_EXTENSION);

    AttachmentType {
        extension,
        media_type: media_type_for_extension(extension),
    }
}

fn extension_from_url(url: &Url) -> Option<&'static str> {
    let last_segment = url.path_segments()?.next_back()?;
    let (_, suffix) = last_segment.rsplit_once('.')?;
    match suffix.to_ascii_lowercase().as_str() {
        "jpg" => Some("jpg"),
        "jpeg" => Some("jpeg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        _ => None,
    }
}

fn extension_from_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Type identifier for `extension`, defaulting to JPEG's.
pub fn media_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => PNG_TYPE,
        "gif" => GIF_TYPE,
        "webp" => WEBP_TYPE,
        _ => JPEG_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(url: &str, mime_type: Option<&str>) -> AttachmentType {
        resolve_attachment_type(&Url::parse(url).unwrap(), mime_type)
    }

    #[test]
    fn unknown_suffix_defers_to_mime_type() {
        let resolved = resolve("https://cdn.example/x.bin", Some("image/gif"));
        assert_eq!(resolved.extension, "gif");
        assert_eq!(resolved.media_type, "com.compuserve.gif");
    }

    #[test]
    fn recognized_suffix_beats_mime_type() {
        let resolved = resolve("https://cdn.example/photo.PNG?size=large", Some("image/jpeg"));
        assert_eq!(resolved.extension, "png");
        assert_eq!(resolved.media_type, "public.png");
    }

    #[test]
    fn png_mime_type_without_suffix() {
        let resolved = resolve("https://cdn.example/render", Some("image/png"));
        assert_eq!(
            resolved,
            AttachmentType {
                extension: "png",
                media_type: "public.png"
            }
        );
    }

    #[test]
    fn jpeg_suffix_is_kept_verbatim() {
        let resolved = resolve("https://cdn.example/a.jpeg", None);
        assert_eq!(resolved.extension, "jpeg");
        assert_eq!(resolved.media_type, "public.jpeg");
    }

    #[test]
    fn webp_uses_vendor_identifier() {
        let resolved = resolve("https://cdn.example/a", Some("image/webp"));
        assert_eq!(resolved.extension, "webp");
        assert_eq!(resolved.media_type, "org.webmproject.webp");
    }

    #[test]
    fn falls_back_to_jpeg() {
        let resolved = resolve("https://cdn.example/a.bin", Some("application/octet-stream"));
        assert_eq!(resolved.extension, "jpg");
        assert_eq!(resolved.media_type, "public.jpeg");

        assert_eq!(resolve("https://cdn.example/", None).extension, "jpg");
        assert_eq!(media_type_for_extension("tiff"), "public.jpeg");
    }
}
