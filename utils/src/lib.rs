pub mod config;
pub mod disk_storage;
pub mod error;
pub mod feed;
pub mod log;
pub mod network;
pub mod price_manager;
pub mod reqwest;
pub mod simulation;

pub use error::{Result, UtilsError as Error};

pub use reqwest::Reqwest;
