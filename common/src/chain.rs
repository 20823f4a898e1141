use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Chains whose fees are tracked by the dashboard.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Ethereum,
    Polygon,
    Arbitrum,
}

impl ChainId {
    pub fn all() -> Vec<ChainId> {
        Self::iter().collect()
    }

    /// Lower-case identifier used in config files and the CLI.
    pub fn key(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Polygon => "polygon",
            ChainId::Arbitrum => "arbitrum",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "Ethereum",
            ChainId::Polygon => "Polygon",
            ChainId::Arbitrum => "Arbitrum",
        }
    }

    pub fn evm_chain_id(&self) -> u64 {
        match self {
            ChainId::Ethereum => 1,
            ChainId::Polygon => 137,
            ChainId::Arbitrum => 42161,
        }
    }

    pub fn gas_units(&self) -> &'static str {
        "Gwei"
    }

    pub fn color_rgb(&self) -> (u8, u8, u8) {
        match self {
            ChainId::Ethereum => (0x62, 0x7E, 0xEA),
            ChainId::Polygon => (0x82, 0x47, 0xE5),
            ChainId::Arbitrum => (0x28, 0xA0, 0xF0),
        }
    }

    /// The chain after this one, wrapping around.
    pub fn next(&self) -> ChainId {
        let all = Self::all();
        let idx = all.iter().position(|c| c == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ChainId {
    type Err = crate::Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        let trimmed = value.trim();
        Self::iter()
            .find(|chain| {
                chain.key().eq_ignore_ascii_case(trimmed)
                    || chain.label().eq_ignore_ascii_case(trimmed)
                    || trimmed
                        .parse::<u64>()
                        .map(|id| id == chain.evm_chain_id())
                        .unwrap_or(false)
            })
            .ok_or_else(|| crate::Error::InvalidChainId(value.to_string()))
    }
}
