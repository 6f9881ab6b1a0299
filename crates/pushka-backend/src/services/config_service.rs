/// Handles an incoming configuration request (see
/// [`pushka_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request(context: super::AppContextHandle) {
    let config = context.state.read().await.config.clone();
    tokio::spawn(async move {
        context
            .send(pushka_bridge::MessageFromBackend::ConfigurationResponse(
                config,
            ))
            .await;
    });
}
