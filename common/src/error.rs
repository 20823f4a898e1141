use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Chain identifier '{0}' is not recognized.")]
    InvalidChainId(String),

    #[error("Fee sample is invalid. (base fee: {base_fee}, priority fee: {priority_fee})")]
    InvalidFeeSample { base_fee: f64, priority_fee: f64 },

    #[error("Price {0} is not a valid USD price.")]
    InvalidPrice(f64),

    #[error("Transaction value {0} is not a finite number.")]
    InvalidTransactionValue(f64),

    #[error("Unknown mode '{0}', expected 'live' or 'simulation'.")]
    UnknownMode(String),

    #[error("Unknown interval '{0}', expected one of 1m, 5m, 15m, 30m, 1h.")]
    UnknownInterval(String),
}
