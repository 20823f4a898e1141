//! Aggregation of fee observations into wall-clock aligned candles.
//!
//! Buckets are computed in the timezone passed by the caller, so the same
//! input always produces the same candles for a given timezone.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::sample::{FeeSample, OhlcPoint};

/// Anything with a timestamp (ms) and OHLC-like values.
pub trait Observation {
    fn timestamp_ms(&self) -> i64;

    fn close_value(&self) -> f64;

    fn open_value(&self) -> f64 {
        self.close_value()
    }

    fn high_value(&self) -> f64 {
        self.close_value()
    }

    fn low_value(&self) -> f64 {
        self.close_value()
    }
}

impl Observation for FeeSample {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp
    }

    fn close_value(&self) -> f64 {
        self.total_fee()
    }
}

impl Observation for OhlcPoint {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp
    }

    fn close_value(&self) -> f64 {
        self.close
    }

    fn open_value(&self) -> f64 {
        self.open
    }

    fn high_value(&self) -> f64 {
        self.high
    }

    fn low_value(&self) -> f64 {
        self.low
    }
}

impl Observation for Candle {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp.saturating_mul(1000)
    }

    fn close_value(&self) -> f64 {
        self.close
    }

    fn open_value(&self) -> f64 {
        self.open
    }

    fn high_value(&self) -> f64 {
        self.high
    }

    fn low_value(&self) -> f64 {
        self.low
    }
}

impl<T: Observation> Observation for &T {
    fn timestamp_ms(&self) -> i64 {
        T::timestamp_ms(*self)
    }

    fn close_value(&self) -> f64 {
        T::close_value(*self)
    }

    fn open_value(&self) -> f64 {
        T::open_value(*self)
    }

    fn high_value(&self) -> f64 {
        T::high_value(*self)
    }

    fn low_value(&self) -> f64 {
        T::low_value(*self)
    }
}

/// Output of [`bucket`]. `timestamp` is the bucket start in whole seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    #[default]
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl Interval {
    /// Width in minutes. Always a divisor of 60.
    pub fn minutes(&self) -> u32 {
        match self {
            Interval::OneMinute => 1,
            Interval::FiveMinutes => 5,
            Interval::FifteenMinutes => 15,
            Interval::ThirtyMinutes => 30,
            Interval::OneHour => 60,
        }
    }

    pub fn seconds(&self) -> i64 {
        i64::from(self.minutes()) * 60
    }

    /// Start of the wall-clock window containing `timestamp_ms` in `tz`, in
    /// milliseconds. Seconds and sub-seconds are zeroed and the minute is
    /// floored to a multiple of the interval width.
    pub fn bucket_start_millis<Tz: TimeZone>(&self, timestamp_ms: i64, tz: &Tz) -> Option<i64> {
        let local = tz.timestamp_millis_opt(timestamp_ms).single()?;
        let into_window = i64::from(local.minute() % self.minutes()) * 60_000
            + i64::from(local.second()) * 1_000
            + i64::from(local.timestamp_subsec_millis());
        Some(timestamp_ms - into_window)
    }

    /// Picks an interval by its position in the chart's shortcut row (1-5).
    pub fn from_shortcut(key: char) -> Option<Interval> {
        match key {
            '1' => Some(Interval::OneMinute),
            '2' => Some(Interval::FiveMinutes),
            '3' => Some(Interval::FifteenMinutes),
            '4' => Some(Interval::ThirtyMinutes),
            '5' => Some(Interval::OneHour),
            _ => None,
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let interval = match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
        };
        write!(f, "{interval}")
    }
}

impl FromStr for Interval {
    type Err = crate::Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        match value.trim() {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" | "60m" => Ok(Interval::OneHour),
            _ => Err(crate::Error::UnknownInterval(value.to_string())),
        }
    }
}

/// Groups observations into candles aligned to `interval` boundaries in `tz`.
///
/// Input may be unordered. Inside a bucket, observations are stably sorted by
/// timestamp, so `open` comes from the earliest and `close` from the latest
/// one; ties keep their arrival order. `high`/`low` span every value of every
/// observation in the bucket. The result is sorted by bucket start.
pub fn bucket<I, O, Tz>(points: I, interval: Interval, tz: &Tz) -> Vec<Candle>
where
    I: IntoIterator<Item = O>,
    O: Observation,
    Tz: TimeZone,
{
    let mut buckets: BTreeMap<i64, Vec<O>> = BTreeMap::new();

    for point in points {
        let timestamp = point.timestamp_ms();
        let Some(start) = interval.bucket_start_millis(timestamp, tz) else {
            tracing::warn!(timestamp, "observation outside the representable time range");
            continue;
        };
        buckets.entry(start).or_default().push(point);
    }

    buckets
        .into_iter()
        .filter_map(|(start, mut points)| {
            points.sort_by_key(|p| p.timestamp_ms());
            let first = points.first()?;
            let last = points.last()?;

            let (high, low) = points.iter().fold(
                (f64::NEG_INFINITY, f64::INFINITY),
                |(high, low), p| {
                    let values = [p.open_value(), p.high_value(), p.low_value(), p.close_value()];
                    (
                        values.iter().copied().fold(high, f64::max),
                        values.iter().copied().fold(low, f64::min),
                    )
                },
            );

            Some(Candle {
                timestamp: start.div_euclid(1000),
                open: first.open_value(),
                high,
                low,
                close: last.close_value(),
            })
        })
        .collect()
}
