use pushka_bridge::MessageFromBackend;

/// Publishes the current startup state, then settles it in the background
/// and publishes the outcome.
pub async fn handle_evaluate_request(context: super::AppContextHandle) {
    let bootstrap = context.state.read().await.bootstrap.clone();

    tokio::spawn(async move {
        context
            .send(MessageFromBackend::AppStateChanged(bootstrap.state()))
            .await;
        let state = bootstrap.evaluate().await;
        context.send(MessageFromBackend::AppStateChanged(state)).await;
    });
}
