//! Backend runtime entry point and public API surface.
//!
//! This crate owns the notification enrichment pipeline and the startup
//! state machine, routes bridge messages to services, and manages shared
//! state used by asynchronous tasks.

mod app;
pub mod bootstrap;
pub mod config;
pub mod enrichment;
pub mod error;
mod runtime;
mod services;
mod state;
pub mod token;

pub use crate::runtime::{run, serve};
