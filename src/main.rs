mod console;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .expect("failed to build logger instance");

    let channels = pushka_bridge::BridgeChannels::default();
    pushka_backend::run(channels.backend_rx, channels.backend_tx);
    console::run(channels.host_rx, channels.host_tx)
}
