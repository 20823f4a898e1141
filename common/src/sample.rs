use serde::{Deserialize, Serialize};

/// One observation of network fee conditions. Fees are in Gwei and the
/// timestamp is in milliseconds since the unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSample {
    pub base_fee: f64,
    pub priority_fee: f64,
    pub timestamp: i64,
}

impl FeeSample {
    pub fn new(base_fee: f64, priority_fee: f64, timestamp: i64) -> crate::Result<Self> {
        let sample = Self {
            base_fee,
            priority_fee,
            timestamp,
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Placeholder used for every chain until its first observation arrives.
    pub fn zero(timestamp: i64) -> Self {
        Self {
            base_fee: 0.0,
            priority_fee: 0.0,
            timestamp,
        }
    }

    pub fn total_fee(&self) -> f64 {
        self.base_fee + self.priority_fee
    }

    pub fn validate(&self) -> crate::Result<()> {
        let valid = |fee: f64| fee.is_finite() && fee >= 0.0;
        if valid(self.base_fee) && valid(self.priority_fee) {
            Ok(())
        } else {
            Err(crate::Error::InvalidFeeSample {
                base_fee: self.base_fee,
                priority_fee: self.priority_fee,
            })
        }
    }
}

/// A single candlestick. `timestamp` is in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OhlcPoint {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcPoint {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Degenerate candle where all four values are the sample's total fee.
    pub fn flat(sample: &FeeSample) -> Self {
        let total = sample.total_fee();
        Self::new(sample.timestamp, total, total, total, total)
    }
}

impl From<&FeeSample> for OhlcPoint {
    fn from(sample: &FeeSample) -> Self {
        OhlcPoint::flat(sample)
    }
}
