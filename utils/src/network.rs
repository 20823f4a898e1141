use std::collections::BTreeMap;

use gasboard_common::chain::ChainId;
use url::Url;

use crate::config::Config;

/// RPC endpoints resolved from the config. Only chains with a configured
/// WebSocket URL get a live feed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Endpoints {
    ws: BTreeMap<ChainId, Url>,
    eth_http: Option<Url>,
}

fn parse_url(raw: &str) -> crate::Result<Url> {
    raw.trim()
        .parse::<Url>()
        .map_err(|e| crate::Error::UrlParsingFailed(raw.to_string(), e))
}

impl Endpoints {
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let mut ws = BTreeMap::new();
        for (chain, raw) in [
            (ChainId::Ethereum, &config.ethereum_ws),
            (ChainId::Polygon, &config.polygon_ws),
            (ChainId::Arbitrum, &config.arbitrum_ws),
        ] {
            let Some(raw) = raw.as_deref().filter(|raw| !raw.trim().is_empty()) else {
                continue;
            };
            let url = parse_url(raw)?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(crate::Error::InvalidUrl(raw.to_string()));
            }
            ws.insert(chain, url);
        }

        let eth_http = config
            .eth_http_rpc
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_url)
            .transpose()?;

        Ok(Self { ws, eth_http })
    }

    pub fn ws_url(&self, chain: ChainId) -> crate::Result<&Url> {
        self.ws.get(&chain).ok_or(crate::Error::RpcUrlNotFound(chain))
    }

    pub fn eth_http_url(&self) -> Option<&Url> {
        self.eth_http.as_ref()
    }
}
