use clap::{Parser, Subcommand};
use gasboard_common::{chain::ChainId, store::Mode};
use gasboard_utils::config::Config;

#[derive(Parser, Debug)]
#[clap(version, subcommand_required = false, arg_required_else_help = false)]
#[command(
    name = "gasboard",
    bin_name = "gasboard",
    version,
    about = "Live gas fees for Ethereum, Polygon and Arbitrum"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// Start in `live` or `simulation` mode
    #[arg(long, env = "GASBOARD_MODE")]
    pub mode: Option<Mode>,

    /// Chain selected in the chart on startup
    #[arg(long, env = "GASBOARD_CHAIN")]
    pub chain: Option<ChainId>,

    /// WebSocket RPC for Ethereum
    #[arg(long, env = "GASBOARD_ETH_WS")]
    pub eth_ws: Option<String>,

    /// WebSocket RPC for Polygon
    #[arg(long, env = "GASBOARD_POLYGON_WS")]
    pub polygon_ws: Option<String>,

    /// WebSocket RPC for Arbitrum
    #[arg(long, env = "GASBOARD_ARBITRUM_WS")]
    pub arbitrum_ws: Option<String>,

    /// HTTP RPC for Ethereum, used to read the ETH/USD price from Uniswap
    #[arg(long, env = "GASBOARD_ETH_HTTP")]
    pub eth_http: Option<String>,

    #[arg(long, env = "GASBOARD_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Print the config file path and the resolved settings
    Config,

    /// Write the default settings to the config file
    #[command(alias = "init")]
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Flags and env vars take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.default_mode = mode;
        }

        let overrides = [
            (&self.eth_ws, &mut config.ethereum_ws),
            (&self.polygon_ws, &mut config.polygon_ws),
            (&self.arbitrum_ws, &mut config.arbitrum_ws),
            (&self.eth_http, &mut config.eth_http_rpc),
        ];
        for (value, field) in overrides {
            if value.is_some() {
                field.clone_from(value);
            }
        }

        if let Some(log_level) = &self.log_level {
            config.log_level.clone_from(log_level);
        }
    }
}
