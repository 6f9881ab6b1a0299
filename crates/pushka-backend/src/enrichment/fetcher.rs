use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use futures_util::StreamExt;
use reqwest::Url;
use tokio::sync::watch;

use crate::error::FetchError;

/// Hard ceiling for attachment downloads: 10 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Name of the file the download is written to inside the caller's scope.
/// Derived from the attachment identifier, never from the remote path.
pub const DOWNLOAD_FILE_NAME: &str = "image.download";

/// A completed download, already written to its scoped location.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// Declared length when the server sent one, otherwise the byte count.
    pub content_length: u64,
    /// Lowercased MIME type without parameters, if the server declared one.
    pub mime_type: Option<String>,
    pub source_url: Url,
    pub location: PathBuf,
}

/// Downloads a single resource under a size ceiling and a time budget.
#[derive(Debug, Clone)]
pub struct BoundedFetcher {
    client: reqwest::Client,
    size_ceiling: u64,
    time_budget: Duration,
}

impl BoundedFetcher {
    /// Creates a fetcher enforcing [`MAX_ATTACHMENT_BYTES`].
    pub fn new(client: reqwest::Client, time_budget: Duration) -> Self {
        Self {
            client,
            size_ceiling: MAX_ATTACHMENT_BYTES,
            time_budget,
        }
    }

    /// Downloads `url` and writes the body to `scope/`[`DOWNLOAD_FILE_NAME`].
    ///
    /// Flipping `cancel` to `true` abandons the request. The in-flight
    /// response is dropped, which closes its connection.
    pub async fn fetch(
        &self,
        url: &Url,
        scope: &Path,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<FetchedImage, FetchError> {
        if *cancel.borrow_and_update() {
            return Err(FetchError::Cancelled);
        }

        tokio::select! {
            result = tokio::time::timeout(self.time_budget, self.download(url, scope)) => {
                match result {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Network(format!(
                        "download timed out after {} seconds",
                        self.time_budget.as_secs()
                    ))),
                }
            }
            _ = cancelled(&mut cancel) => Err(FetchError::Cancelled),
        }
    }

    async fn download(&self, url: &Url, scope: &Path) -> Result<FetchedImage, FetchError> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::Network(format!(
                    "unsupported URL scheme '{other}'"
                )));
            }
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|error| FetchError::Network(error.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "server responded with HTTP {}",
                response.status().as_u16()
            )));
        }

        let declared_length = response.content_length();
        if let Some(declared) = declared_length {
            if declared > self.size_ceiling {
                return Err(FetchError::TooLarge {
                    size: declared,
                    limit: self.size_ceiling,
                });
            }
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty());
        let source_url = response.url().clone();

        let capacity = declared_length.unwrap_or(0).min(self.size_ceiling) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk =
                chunk.map_err(|error| FetchError::Network(error.without_url().to_string()))?;
            let size = (bytes.len() + chunk.len()) as u64;
            if size > self.size_ceiling {
                return Err(FetchError::TooLarge {
                    size,
                    limit: self.size_ceiling,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let location = write_scoped(scope, &bytes).await?;
        log::debug!(
            "Downloaded {} bytes from {source_url} into {location:?}",
            bytes.len()
        );

        Ok(FetchedImage {
            content_length: declared_length.unwrap_or(bytes.len() as u64),
            bytes,
            mime_type,
            source_url,
            location,
        })
    }
}

/// Writes `bytes` once into the scope, replacing whatever was there before.
async fn write_scoped(scope: &Path, bytes: &[u8]) -> Result<PathBuf, FetchError> {
    tokio::fs::create_dir_all(scope).await?;
    let location = scope.join(DOWNLOAD_FILE_NAME);
    remove_if_exists(&location).await?;
    tokio::fs::write(&location, bytes).await?;
    Ok(location)
}

pub(crate) async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

/// Resolves once `cancel` reads `true`. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
