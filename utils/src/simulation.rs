//! Synthetic fee data for `Mode::Simulation`: a bounded multiplicative
//! random walk per chain plus one for the ETH/USD price.

use std::{collections::HashMap, time::Duration};

use gasboard_common::{chain::ChainId, sample::FeeSample};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::feed::FeedEvent;

/// Largest relative move per step.
const MAX_STEP: f64 = 0.08;

#[derive(Clone, Copy, Debug)]
struct Level {
    base_fee: f64,
    priority_fee: f64,
}

fn starting_level(chain: ChainId) -> Level {
    match chain {
        ChainId::Ethereum => Level {
            base_fee: 20.0,
            priority_fee: 1.5,
        },
        ChainId::Polygon => Level {
            base_fee: 35.0,
            priority_fee: 30.0,
        },
        ChainId::Arbitrum => Level {
            base_fee: 0.01,
            priority_fee: 0.0,
        },
    }
}

pub struct RandomWalk {
    rng: StdRng,
    levels: HashMap<ChainId, Level>,
    eth_usd_price: f64,
}

impl RandomWalk {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            levels: HashMap::new(),
            eth_usd_price: 2_500.0,
        }
    }

    fn step(&mut self, value: f64, floor: f64, ceiling: f64) -> f64 {
        let factor = 1.0 + self.rng.gen_range(-MAX_STEP..=MAX_STEP);
        (value * factor).clamp(floor, ceiling)
    }

    pub fn next_sample(&mut self, chain: ChainId, timestamp_ms: i64) -> FeeSample {
        let start = starting_level(chain);
        let current = *self.levels.entry(chain).or_insert(start);

        let base_fee = self.step(current.base_fee, start.base_fee / 10.0, start.base_fee * 10.0);
        let priority_fee = self.step(
            current.priority_fee,
            start.priority_fee / 10.0,
            start.priority_fee * 10.0,
        );
        let next = Level {
            base_fee,
            priority_fee,
        };
        self.levels.insert(chain, next);

        FeeSample {
            base_fee,
            priority_fee,
            timestamp: timestamp_ms,
        }
    }

    pub fn next_price(&mut self) -> f64 {
        self.eth_usd_price = self.step(self.eth_usd_price, 500.0, 10_000.0);
        self.eth_usd_price
    }
}

/// Emits one sample per chain and one price every `tick` until `shutdown`
/// is cancelled. The first batch goes out immediately.
pub fn spawn_simulated_feed<F>(
    chains: Vec<ChainId>,
    tick: Duration,
    seed: Option<u64>,
    shutdown: CancellationToken,
    on_event: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn(FeedEvent) + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut walk = RandomWalk::new(seed);
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = chrono::Utc::now().timestamp_millis();
                    for chain in &chains {
                        on_event(FeedEvent::Sample(*chain, walk.next_sample(*chain, now)));
                    }
                    on_event(FeedEvent::EthUsdPrice(walk.next_price()));
                }
                _ = shutdown.cancelled() => break,
            }
        }
        tracing::debug!("simulated feed stopped");
    })
}
