//! Session state for the dashboard: per-chain fee history, the USD price and
//! the simulator inputs. Owned by the UI loop and mutated only through the
//! methods below; readers that need to react to changes call
//! [`GasStore::subscribe`].

use std::{
    collections::{HashMap, VecDeque},
    fmt::Display,
    str::FromStr,
    sync::mpsc,
};

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    chain::ChainId,
    ohlc::{self, Candle, Interval},
    sample::{FeeSample, OhlcPoint},
};

/// Number of points retained per chain.
pub const HISTORY_LIMIT: usize = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Live,
    Simulation,
}

impl Mode {
    pub fn toggle(&self) -> Mode {
        match self {
            Mode::Live => Mode::Simulation,
            Mode::Simulation => Mode::Live,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Live => write!(f, "live"),
            Mode::Simulation => write!(f, "simulation"),
        }
    }
}

impl FromStr for Mode {
    type Err = crate::Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "simulation" | "sim" => Ok(Mode::Simulation),
            _ => Err(crate::Error::UnknownMode(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
    Mode(Mode),
    GasFee(ChainId),
    EthUsdPrice(f64),
    TransactionValue(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChainState {
    current_fee: FeeSample,
    history: VecDeque<OhlcPoint>,
}

impl ChainState {
    fn new(now_ms: i64) -> Self {
        Self {
            current_fee: FeeSample::zero(now_ms),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn current_fee(&self) -> &FeeSample {
        &self.current_fee
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &OhlcPoint> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// True until the first sample for this chain has been recorded.
    pub fn is_loading(&self) -> bool {
        self.history.is_empty()
    }

    fn record(&mut self, sample: FeeSample) {
        if let Some(last) = self.history.back() {
            if sample.timestamp < last.timestamp {
                tracing::debug!(
                    previous = last.timestamp,
                    current = sample.timestamp,
                    "fee sample arrived out of order"
                );
            }
        }

        self.current_fee = sample;
        self.history.push_back(OhlcPoint::flat(&sample));
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

#[derive(Debug)]
pub struct GasStore {
    mode: Mode,
    chains: HashMap<ChainId, ChainState>,
    eth_usd_price: f64,
    transaction_value: f64,
    subscribers: Vec<mpsc::Sender<StoreChange>>,
}

impl Default for GasStore {
    fn default() -> Self {
        GasStore::new(ChainId::iter())
    }
}

impl GasStore {
    /// Creates a store tracking `chains`, each starting with a zero-valued
    /// sample and no history.
    pub fn new(chains: impl IntoIterator<Item = ChainId>) -> Self {
        let now_ms = chrono::Utc::now().timestamp_millis();
        Self {
            mode: Mode::default(),
            chains: chains
                .into_iter()
                .map(|chain| (chain, ChainState::new(now_ms)))
                .collect(),
            eth_usd_price: 0.0,
            transaction_value: 0.0,
            subscribers: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns a receiver that gets every change applied after this call.
    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: StoreChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.notify(StoreChange::Mode(mode));
    }

    /// Replaces the chain's current fee and appends a flat candle for it,
    /// keeping the last [`HISTORY_LIMIT`] points.
    pub fn update_gas_fee(&mut self, chain: ChainId, sample: FeeSample) -> crate::Result<()> {
        sample.validate()?;

        let state = self
            .chains
            .get_mut(&chain)
            .ok_or_else(|| crate::Error::InvalidChainId(chain.to_string()))?;
        state.record(sample);

        self.notify(StoreChange::GasFee(chain));
        Ok(())
    }

    /// Zero means "not available yet".
    pub fn update_eth_usd_price(&mut self, price: f64) -> crate::Result<()> {
        if !price.is_finite() || price < 0.0 {
            return Err(crate::Error::InvalidPrice(price));
        }

        self.eth_usd_price = price;
        self.notify(StoreChange::EthUsdPrice(price));
        Ok(())
    }

    pub fn set_transaction_value(&mut self, value: f64) -> crate::Result<()> {
        if !value.is_finite() {
            return Err(crate::Error::InvalidTransactionValue(value));
        }

        self.transaction_value = value;
        self.notify(StoreChange::TransactionValue(value));
        Ok(())
    }

    pub fn eth_usd_price(&self) -> f64 {
        self.eth_usd_price
    }

    pub fn eth_usd_price_available(&self) -> Option<f64> {
        (self.eth_usd_price > 0.0).then_some(self.eth_usd_price)
    }

    pub fn transaction_value(&self) -> f64 {
        self.transaction_value
    }

    pub fn chain(&self, chain: ChainId) -> Option<&ChainState> {
        self.chains.get(&chain)
    }

    /// Tracked chains in declaration order.
    pub fn chains(&self) -> impl Iterator<Item = (ChainId, &ChainState)> {
        ChainId::iter().filter_map(|chain| self.chains.get(&chain).map(|state| (chain, state)))
    }

    pub fn tracked_chains(&self) -> Vec<ChainId> {
        self.chains().map(|(chain, _)| chain).collect()
    }

    /// The chain's history bucketed into `interval` candles in `tz`.
    pub fn candles<Tz: TimeZone>(&self, chain: ChainId, interval: Interval, tz: &Tz) -> Vec<Candle> {
        self.chain(chain)
            .map(|state| ohlc::bucket(state.history(), interval, tz))
            .unwrap_or_default()
    }
}
