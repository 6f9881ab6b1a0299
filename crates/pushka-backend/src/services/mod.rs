//! Backend service handlers for host-driven requests.
//!
//! Each handler operates on the shared `AppContext`, performs its side
//! effects (network, filesystem) and reports back to the host. Long-running
//! work is spawned so the dispatch loop keeps draining the bridge.

pub mod bootstrap_service;
pub mod config_service;
pub mod enrichment_service;
pub mod notification_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
