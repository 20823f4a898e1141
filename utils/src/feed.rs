//! Live fee samples from a chain's WebSocket RPC.
//!
//! Each [`FeeFeed`] owns one tokio task. The task connects, emits a sample
//! for the latest block, then one sample per new head. When the connection
//! drops it waits `reconnect_delay` and connects again, until the shutdown
//! token is cancelled.

use std::time::Duration;

use alloy::{
    eips::BlockNumberOrTag,
    providers::{Provider, ProviderBuilder, WsConnect},
};
use gasboard_common::{chain::ChainId, sample::FeeSample};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use url::Url;

const WEI_PER_GWEI: f64 = 1e9;

#[derive(Debug)]
pub enum FeedEvent {
    Sample(ChainId, FeeSample),
    Error(ChainId, crate::Error),
    EthUsdPrice(f64),
}

/// Builds a sample from raw header fields. Both fees arrive in wei, the
/// block timestamp in seconds.
pub fn sample_from_header(
    base_fee_per_gas: Option<u64>,
    priority_fee_wei: u128,
    timestamp_secs: u64,
) -> FeeSample {
    FeeSample {
        base_fee: base_fee_per_gas.unwrap_or(0) as f64 / WEI_PER_GWEI,
        priority_fee: priority_fee_wei as f64 / WEI_PER_GWEI,
        timestamp: timestamp_secs.saturating_mul(1000).min(i64::MAX as u64) as i64,
    }
}

pub struct FeeFeed {
    chain: ChainId,
    url: Url,
    reconnect_delay: Duration,
}

impl FeeFeed {
    pub fn new(chain: ChainId, url: Url, reconnect_delay: Duration) -> Self {
        Self {
            chain,
            url,
            reconnect_delay,
        }
    }

    pub fn spawn<F>(self, shutdown: CancellationToken, on_event: F) -> tokio::task::JoinHandle<()>
    where
        F: Fn(FeedEvent) + Send + Sync + 'static,
    {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = self.run_connection(&on_event) => {
                        if let Err(err) = result {
                            tracing::warn!(chain = %self.chain, error = %err, "fee feed disconnected");
                            on_event(FeedEvent::Error(self.chain, err));
                        }
                    }
                    _ = shutdown.cancelled() => break,
                }

                tokio::select! {
                    _ = tokio::time::sleep(self.reconnect_delay) => {}
                    _ = shutdown.cancelled() => break,
                }
            }
            tracing::debug!(chain = %self.chain, "fee feed stopped");
        })
    }

    /// Runs until the subscription ends. Only returns `Ok` if the node
    /// closes the stream without an error.
    async fn run_connection<F>(&self, on_event: &F) -> crate::Result<()>
    where
        F: Fn(FeedEvent),
    {
        tracing::info!(chain = %self.chain, url = %self.url, "connecting fee feed");
        let provider = ProviderBuilder::new()
            .connect_ws(WsConnect::new(self.url.as_str()))
            .await?;

        let latest = provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or(crate::Error::BlockNotFound(self.chain))?;
        let priority_fee = provider.get_max_priority_fee_per_gas().await?;
        on_event(FeedEvent::Sample(
            self.chain,
            sample_from_header(
                latest.header.base_fee_per_gas,
                priority_fee,
                latest.header.timestamp,
            ),
        ));

        let mut subscription = provider.subscribe_blocks().await?;
        loop {
            let header = match subscription.recv().await {
                Ok(header) => header,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(chain = %self.chain, skipped, "fee feed lagged behind new heads");
                    continue;
                }
                Err(RecvError::Closed) => return Err(crate::Error::SubscriptionClosed(self.chain)),
            };

            // A failed priority fee lookup skips this block but keeps the connection.
            match provider.get_max_priority_fee_per_gas().await {
                Ok(priority_fee) => on_event(FeedEvent::Sample(
                    self.chain,
                    sample_from_header(header.base_fee_per_gas, priority_fee, header.timestamp),
                )),
                Err(err) => on_event(FeedEvent::Error(self.chain, err.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_wei_to_gwei_and_seconds_to_millis() {
        let sample = sample_from_header(Some(25_000_000_000), 1_500_000_000, 1_700_000_000);
        assert_eq!(sample.base_fee, 25.0);
        assert_eq!(sample.priority_fee, 1.5);
        assert_eq!(sample.timestamp, 1_700_000_000_000);
        assert_eq!(sample.total_fee(), 26.5);
    }

    #[test]
    fn missing_base_fee_counts_as_zero() {
        let sample = sample_from_header(None, 0, 0);
        assert_eq!(sample, FeeSample::zero(0));
    }

    #[tokio::test]
    async fn cancelled_feed_stops_without_events() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let (tx, rx) = std::sync::mpsc::channel();
        let url = Url::parse("ws://127.0.0.1:9").unwrap();

        FeeFeed::new(ChainId::Ethereum, url, Duration::from_millis(10))
            .spawn(shutdown, move |event| {
                let _ = tx.send(format!("{event:?}"));
            })
            .await
            .unwrap();

        // select! may have polled the connect attempt once, which cannot
        // have produced a sample.
        assert!(rx.try_iter().all(|event| !event.starts_with("Sample")));
    }

    #[tokio::test]
    async fn unreachable_node_reports_errors_and_keeps_retrying() {
        let shutdown = CancellationToken::new();
        let (tx, rx) = std::sync::mpsc::channel();
        let url = Url::parse("ws://127.0.0.1:9").unwrap();

        let handle = FeeFeed::new(ChainId::Ethereum, url, Duration::from_millis(20)).spawn(
            shutdown.clone(),
            move |event| {
                let _ = tx.send(event);
            },
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let events: Vec<FeedEvent> = rx.try_iter().collect();
        let errors = events
            .iter()
            .filter(|event| matches!(event, FeedEvent::Error(ChainId::Ethereum, _)))
            .count();
        assert!(errors >= 2, "expected reconnect attempts, got {events:?}");
        assert_eq!(errors, events.len());
    }
}
