pub mod chain;
pub mod cost;
pub mod error;
pub mod ohlc;
pub mod sample;
pub mod store;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
