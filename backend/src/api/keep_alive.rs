//! Periodic self-ping so hosted instances are not put to sleep.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::logs::log_warning;

/// Shortest accepted ping period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on a single ping.
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spawn a task that GETs `url` every `interval`. Failures are logged and ignored.
///
/// Intervals below one second are raised to one second.
pub fn spawn(url: String, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        let client = match reqwest::Client::builder()
            .timeout(interval.min(MAX_REQUEST_TIMEOUT))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                log_warning(format!("Keep-alive disabled: {}", e));
                return;
            }
        };

        let mut ticker = tokio::time::interval(interval);
        // A slow ping delays the next one instead of bursting to catch up
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = client.get(&url).send().await {
                log_warning(format!("Keep-alive ping to {} failed: {}", url, e));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_interval_does_not_panic() {
        let handle = spawn("http://127.0.0.1:9/".to_string(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        handle.abort();
        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
