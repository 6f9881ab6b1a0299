//! Image attachment enrichment for delivered notifications.
//!
//! The pipeline runs in a short, deadline-bounded window:
//! payload → [`extractor`] → [`fetcher`] → [`media_type`] → [`attachment`],
//! orchestrated by [`service::NotificationEnricher`]. Any failure along the
//! way degrades to delivering the original content, and the host's callback
//! is guarded by a [`latch::CompletionLatch`] so it runs exactly once.

pub mod attachment;
pub mod extractor;
pub mod fetcher;
pub mod latch;
pub mod media_type;
pub mod service;

pub use service::{EnrichmentSession, EnrichmentStage, NotificationEnricher};
