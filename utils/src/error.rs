use std::path::PathBuf;

use gasboard_common::chain::ChainId;
use url::Url;

use crate::reqwest::{ReqwestErrorContext, ReqwestInnerError, ReqwestStage};

pub type Result<T> = std::result::Result<T, UtilsError>;

#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    #[error(transparent)]
    Core(#[from] gasboard_common::Error),

    #[error("Failed to get base directories.")]
    BaseDirsFailed,

    #[error("Failed to create directory: {0:?}. (Error: {1:?})")]
    CreateDirAllFailed(PathBuf, std::io::Error),

    #[error("Failed to read the file: {0}. (Error: {1:?})")]
    FileReadFailed(PathBuf, std::io::Error),

    #[error("Failed to write to the file: {0}. (Error: {1:?})")]
    FileWriteFailed(PathBuf, std::io::Error),

    #[error("Parsing the toml file failed: {0}. (Error: {1:?})")]
    TomlParsingFailed(PathBuf, toml::de::Error),

    #[error("Formatting to toml format failed: {0}. (Error: {1:?})")]
    TomlFormattingFailed(String, toml::ser::Error),

    #[error("Failed to parse URL: {0}. (Error: {1:?})")]
    UrlParsingFailed(String, url::ParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("WebSocket RPC URL not configured for {0}. Set it in the config or pass it on the command line.")]
    RpcUrlNotFound(ChainId),

    #[error("Please check your internet connection, the URL seems to be unreachable: {0}")]
    Internet(Url),

    #[error("Request '{url}' failed at stage '{stage:?}' (Error='{inner:?}', Context='{context:?}')", url = context.url)]
    ReqwestFailed {
        stage: ReqwestStage,
        context: Box<ReqwestErrorContext>,
        inner: ReqwestInnerError,
    },

    #[error("Reqwest builder missing error context, this is a bug please report it.")]
    ReqwestErrorContextMissing,

    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),

    #[error("Failed to read slot0 from the Uniswap pool. (Error: {0:?})")]
    UniswapSlot0(Box<alloy::contract::Error>),

    #[error("Latest block not returned by the {0} node.")]
    BlockNotFound(ChainId),

    #[error("New block subscription closed for {0}.")]
    SubscriptionClosed(ChainId),

    #[error("CoinGecko response did not contain an ETH/USD price.")]
    CoinGeckoPriceMissing,

    #[error("Uniswap pool reported a zero price.")]
    ZeroPoolPrice,

    #[error(transparent)]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("No ETH/USD price source returned a price.")]
    NoPrice,

    #[error("Invalid log level: {0}. Expected one of trace, debug, info, warn, error.")]
    InvalidLogLevel(String),

    #[error("Failed to initialise logging: {0}")]
    LoggingInit(String),
}

impl UtilsError {
    pub fn is_connect(&self) -> bool {
        match self {
            Self::ReqwestFailed { inner, .. } => inner.is_connect(),
            Self::Internet(_) => true,
            Self::Transport(err) => err.is_transport_error(),
            _ => false,
        }
    }
}
