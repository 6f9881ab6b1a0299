//! Failure taxonomy for the enrichment pipeline and the startup check.
//!
//! None of these reach the end user. Enrichment failures degrade to
//! delivering the original content, and readiness failures degrade to the
//! static fallback screen.

use std::path::PathBuf;

/// Reasons an image download did not produce usable bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// DNS, TLS, transport, timeout, non-2xx status or an unsupported scheme.
    #[error("network error: {0}")]
    Network(String),
    /// The response is larger than the attachment ceiling. Either the declared
    /// length or the streamed byte count went over.
    #[error("resource too large ({size} bytes > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    /// The downloaded bytes could not be written to the scoped location.
    #[error("failed to store downloaded bytes: {0}")]
    Io(#[from] std::io::Error),
    /// The caller's deadline elapsed before the download finished.
    #[error("download cancelled")]
    Cancelled,
}

/// The downloaded file could not be turned into an attachment.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// Moving the download into its final, typed location failed (disk full,
    /// permissions, or the source was already consumed).
    #[error("failed to move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why an enrichment ended without an attachment.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// No extraction rule produced a URL. This is the normal no-op path.
    #[error("no image URL found in payload")]
    NoUrlFound,
    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchError),
    #[error("attachment could not be built: {0}")]
    ResolveFailed(#[from] AttachmentError),
    /// The host deadline was reached before the pipeline completed.
    #[error("deadline reached before enrichment completed")]
    TimedOut,
}

/// The readiness check could not produce an answer.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("readiness request failed: {0}")]
    Request(String),
    #[error("readiness task aborted: {0}")]
    Aborted(String),
}
