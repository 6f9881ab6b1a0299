//! Line-oriented host for the backend.
//!
//! Every non-empty stdin line is a JSON push payload. It is relayed as a
//! background delivery and enriched; every backend event is printed to
//! stdout as one JSON object per line. The host exits once stdin is closed,
//! every enrichment has been answered and the startup state has settled.

use pushka_bridge::{
    MessageFromBackend, MessageToBackend,
    notification::{DeliveryOrigin, NotificationContent, NotificationPayload},
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    sync::mpsc::{Receiver, Sender},
};

/// Runs the console host on the calling thread.
pub fn run(rx: Receiver<MessageFromBackend>, tx: Sender<MessageToBackend>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        rx,
        tx,
    ))
}

/// Feeds `input` to the backend and writes its events to `output`.
///
/// Commands are forwarded from their own task, so replies keep draining
/// while the backend applies back-pressure.
async fn drive<R, W>(
    input: R,
    mut output: W,
    mut rx: Receiver<MessageFromBackend>,
    tx: Sender<MessageToBackend>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    tx.send(MessageToBackend::EvaluateAppState).await?;
    let mut forwarder = tokio::spawn(forward_lines(input, tx.clone()));

    let mut submitted: Option<u64> = None;
    let mut answered = 0u64;
    let mut state_settled = false;

    while submitted != Some(answered) || !state_settled {
        tokio::select! {
            sent = &mut forwarder, if submitted.is_none() => {
                submitted = Some(sent??);
            }
            message = rx.recv() => {
                let Some(message) = message else {
                    log::warn!("Backend closed the bridge");
                    break;
                };
                match &message {
                    MessageFromBackend::NotificationEnriched { .. } => answered += 1,
                    MessageFromBackend::AppStateChanged(state) => {
                        state_settled = state.is_terminal();
                    }
                    _ => {}
                }

                let mut line = serde_json::to_string(&message)?;
                line.push('\n');
                output.write_all(line.as_bytes()).await?;
                output.flush().await?;
            }
        }
    }

    Ok(())
}

/// Sends a relay and an enrichment request per payload line. Returns how
/// many enrichments were requested.
async fn forward_lines<R>(input: R, tx: Sender<MessageToBackend>) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut request_id = 0u64;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let payload: NotificationPayload = match serde_json::from_str(&line) {
            Ok(payload) => payload,
            Err(error) => {
                log::warn!("Skipping line that is not a JSON object: {error}");
                continue;
            }
        };

        request_id += 1;
        tx.send(MessageToBackend::RemoteNotification {
            payload: payload.clone(),
            origin: DeliveryOrigin::Background,
        })
        .await?;
        tx.send(MessageToBackend::EnrichNotification {
            request_id,
            content: NotificationContent::from_payload(payload),
        })
        .await?;
    }

    Ok(request_id)
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, time::Duration};

    use pushka_bridge::{BridgeChannels, config::Config};

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn long_input_is_fully_answered_with_small_channels() {
        let scratch = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.enrichment.scratch_dir = Some(scratch.path().to_path_buf());
        config.bootstrap.target_url = Some("https://deep.link/home".to_string());

        let BridgeChannels {
            host_rx,
            host_tx,
            backend_rx,
            backend_tx,
        } = BridgeChannels::new(4);
        tokio::spawn(pushka_backend::serve(config, backend_rx, backend_tx));

        let mut input = "{}\n".repeat(200);
        input.push_str("not json\n\n");
        let mut output = Vec::new();

        tokio::time::timeout(
            Duration::from_secs(30),
            drive(Cursor::new(input.into_bytes()), &mut output, host_rx, host_tx),
        )
        .await
        .expect("console host finished")
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        let count = |event: &str| {
            output
                .lines()
                .filter(|line| line.contains(&format!("\"event\":\"{event}\"")))
                .count()
        };
        assert_eq!(count("notification_enriched"), 200);
        assert_eq!(count("remote_notification_received"), 200);
        assert_eq!(count("background_fetch_completed"), 200);
        assert!(output.contains("\"data\":\"supplementary\""));
    }
}
