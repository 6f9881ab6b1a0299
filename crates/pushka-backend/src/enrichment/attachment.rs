use std::path::Path;

use pushka_bridge::notification::AttachmentDescriptor;

use super::{fetcher::remove_if_exists, media_type::AttachmentType};
use crate::error::AttachmentError;

/// Logical identifier every attachment is created with.
pub const ATTACHMENT_IDENTIFIER: &str = "image";

/// Moves the downloaded file next to itself as `image.<extension>` and
/// describes it.
///
/// The move consumes `local_file`; calling this twice for the same download
/// fails with [`AttachmentError::Move`].
pub async fn build_attachment(
    local_file: &Path,
    attachment_type: AttachmentType,
) -> Result<AttachmentDescriptor, AttachmentError> {
    let target = local_file.with_file_name(format!(
        "{ATTACHMENT_IDENTIFIER}.{}",
        attachment_type.extension
    ));
    let move_error = |source| AttachmentError::Move {
        from: local_file.to_path_buf(),
        to: target.clone(),
        source,
    };

    tokio::fs::metadata(local_file).await.map_err(move_error)?;
    remove_if_exists(&target).await.map_err(move_error)?;
    tokio::fs::rename(local_file, &target)
        .await
        .map_err(move_error)?;

    Ok(AttachmentDescriptor {
        identifier: ATTACHMENT_IDENTIFIER.to_string(),
        extension: attachment_type.extension.to_string(),
        media_type: attachment_type.media_type.to_string(),
        location: target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::fetcher::DOWNLOAD_FILE_NAME;

    const PNG: AttachmentType = AttachmentType {
        extension: "png",
        media_type: "public.png",
    };

    #[tokio::test]
    async fn renames_download_to_typed_file() {
        let scope = tempfile::tempdir().unwrap();
        let download = scope.path().join(DOWNLOAD_FILE_NAME);
        std::fs::write(&download, b"png-bytes").unwrap();

        let attachment = build_attachment(&download, PNG).await.unwrap();

        assert_eq!(attachment.identifier, "image");
        assert_eq!(attachment.extension, "png");
        assert_eq!(attachment.media_type, "public.png");
        assert_eq!(attachment.location, scope.path().join("image.png"));
        assert_eq!(std::fs::read(&attachment.location).unwrap(), b"png-bytes");
        assert!(!download.exists());
    }

    #[tokio::test]
    async fn consumed_download_cannot_be_built_again() {
        let scope = tempfile::tempdir().unwrap();
        let download = scope.path().join(DOWNLOAD_FILE_NAME);
        std::fs::write(&download, b"png-bytes").unwrap();

        build_attachment(&download, PNG).await.unwrap();
        let error = build_attachment(&download, PNG).await.unwrap_err();

        let AttachmentError::Move { from, to, .. } = error;
        assert_eq!(from, download);
        assert_eq!(to, scope.path().join("image.png"));
        // The first attachment must survive the failed second attempt.
        assert!(scope.path().join("image.png").exists());
    }
}
