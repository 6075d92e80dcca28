use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::Transport;

const POLL_BUFFER: usize = 4;

/// Shortest wait between fetches. A zero period would spin the runtime.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fetch `path` now and then every `period`, yielding each successful payload.
///
/// Failed fetches are logged and skipped. The task exits once `token` is
/// cancelled or the receiver is dropped. `period` is at least [`MIN_PERIOD`].
pub fn poll(
    transport: Arc<dyn Transport>,
    path: String,
    period: Duration,
    token: CancellationToken,
) -> mpsc::Receiver<Value> {
    let (tx, rx) = mpsc::channel(POLL_BUFFER);
    let period = period.max(MIN_PERIOD);

    tokio::spawn(async move {
        loop {
            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = transport.get(&path) => result,
            };

            match fetched {
                Ok(value) => {
                    let sent = tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        sent = tx.send(value) => sent,
                    };
                    if sent.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(path = %path, error = ?err, "Poll failed, keeping last payload");
                }
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }
        }
        debug!(path = %path, "Polling stopped");
    });

    rx
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::testing::ScriptedTransport;

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_is_skipped_until_next_period() {
        let transport = ScriptedTransport::new();
        transport.fail("rulelist");
        transport.reply("rulelist", json!([{"id": 1}]));

        let start = Instant::now();
        let mut rx = poll(
            transport.clone(),
            "rulelist".to_string(),
            Duration::from_millis(500),
            CancellationToken::new(),
        );

        assert_eq!(rx.recv().await, Some(json!([{"id": 1}])));
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert_eq!(transport.get_count("rulelist"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_still_waits_between_fetches() {
        let transport = ScriptedTransport::new();
        transport.reply("rulelist", json!([]));

        let start = Instant::now();
        let mut rx = poll(
            transport.clone(),
            "rulelist".to_string(),
            Duration::ZERO,
            CancellationToken::new(),
        );
        for _ in 0..5 {
            assert!(rx.recv().await.is_some());
        }
        assert_eq!(start.elapsed(), MIN_PERIOD * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_closes_the_stream() {
        let transport = ScriptedTransport::new();
        transport.reply("rulelist", json!([]));
        let token = CancellationToken::new();

        let mut rx = poll(
            transport.clone(),
            "rulelist".to_string(),
            Duration::from_millis(100),
            token.clone(),
        );
        assert!(rx.recv().await.is_some());

        token.cancel();
        while rx.recv().await.is_some() {}

        let fetched = transport.get_count("rulelist");
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(transport.get_count("rulelist"), fetched);
    }
}
