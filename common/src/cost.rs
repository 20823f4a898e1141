//! USD cost simulation for a plain transfer on each tracked chain.

use crate::{chain::ChainId, store::GasStore};

/// Gas used by a simple native-token transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

const GWEI_PER_NATIVE: f64 = 1e9;

pub fn gas_cost_native(total_fee_gwei: f64, gas_limit: u64) -> f64 {
    total_fee_gwei * gas_limit as f64 / GWEI_PER_NATIVE
}

pub fn gas_cost_usd(total_fee_gwei: f64, gas_limit: u64, usd_price: f64) -> f64 {
    gas_cost_native(total_fee_gwei, gas_limit) * usd_price
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostEstimate {
    pub chain: ChainId,
    pub base_fee: f64,
    pub priority_fee: f64,
    pub gas_usd: f64,
}

impl GasStore {
    /// Cost of a transaction using `gas_limit` on every tracked chain, priced
    /// with the ETH/USD rate. `None` while the rate is unavailable.
    pub fn estimate_costs(&self, gas_limit: u64) -> Option<Vec<CostEstimate>> {
        let usd_price = self.eth_usd_price_available()?;

        Some(
            self.chains()
                .map(|(chain, state)| {
                    let fee = state.current_fee();
                    CostEstimate {
                        chain,
                        base_fee: fee.base_fee,
                        priority_fee: fee.priority_fee,
                        gas_usd: gas_cost_usd(fee.total_fee(), gas_limit, usd_price),
                    }
                })
                .collect(),
        )
    }

    pub fn transaction_value_usd(&self) -> Option<f64> {
        self.eth_usd_price_available()
            .map(|usd_price| self.transaction_value() * usd_price)
    }
}
