//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, shared state, and the message
//! dispatch loop that listens to host requests.

use std::{sync::Arc, thread};

use pushka_bridge::{MessageFromBackend, MessageToBackend, config::Config};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::state::State;

/// Initialize backend state and start processing host messages.
async fn setup_backend(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let config = match crate::config::load_config().await {
        Ok(config) => config,
        Err(error) => {
            log::error!("Failed to load config, using defaults: {error}");
            Config::default()
        }
    };
    serve(config, rx, tx).await;
}

/// Builds state from `config` and handles host messages until `rx` closes.
pub async fn serve(config: Config, rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let state = Arc::new(RwLock::new(State::from_config(config)));
    let context = Arc::new(AppContext { state, tx });
    context.consume_bridge_messages(rx).await;
}

/// Spawn the backend runtime and begin processing bridge messages.
pub fn run(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        runtime.block_on(async { setup_backend(rx, tx).await });
    });
}
