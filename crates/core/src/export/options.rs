use std::{path::PathBuf, sync::Arc, time::Duration};

use alloy::primitives::{utils::parse_ether, Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::network::{ForkEnvironment, ForkNetworkOptions, Network};
use crate::relay::RelayData;
use crate::shared::common_types::EvmAddress;
use crate::network::ChainInfoError;

pub const DEFAULT_CHAIN_OUTPUT_PATH: &str = "./local.json";
pub const DEFAULT_PORT: u16 = 8500;
pub const DEFAULT_RELAY_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_FUND_AMOUNT_ETHER: &str = "100";
pub const DEFAULT_LOCAL_CHAINS: [&str; 5] = ["Moonbeam", "Avalanche", "Fantom", "Ethereum", "Polygon"];

/// Called after every relay pass, with whatever that pass relayed.
pub type AfterRelay = Arc<dyn Fn(&RelayData) + Send + Sync>;

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Runs once per network, after it is funded and before the next network is created.
#[async_trait]
pub trait NetworkSetupHook: Send + Sync {
    async fn on_network(&self, network: &Network, info: &ChainExportInfo) -> Result<(), HookError>;
}

/// What gets written to the chain output file for every network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExportInfo {
    pub name: String,
    pub chain_id: u64,
    pub rpc: String,
    pub gateway: EvmAddress,
    pub gas_receiver: EvmAddress,
    pub const_address_deployer: EvmAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
}

impl ChainExportInfo {
    /// `index` is the network's position in the proxy, which is also its rpc path.
    pub fn new(network: &Network, port: u16, index: usize) -> Self {
        Self {
            name: network.name.clone(),
            chain_id: network.chain_id.u64(),
            rpc: format!("http://localhost:{}/{}", port, index),
            gateway: network.gateway,
            gas_receiver: network.gas_receiver,
            const_address_deployer: network.const_address_deployer,
            token_name: network.token_name.clone(),
            token_symbol: network.token_symbol.clone(),
        }
    }
}

/// Options of [`crate::create_and_export`]. Every field is optional; a missing or "empty"
/// value (empty path, port 0, interval 0, zero fund amount) takes the default. An explicitly
/// empty `chains` list is kept and creates no networks.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CreateLocalOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_to_fund: Option<Vec<EvmAddress>>,
    /// In wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_amount: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<Vec<String>>,
    /// In milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip)]
    pub after_relay: Option<AfterRelay>,
    #[serde(skip)]
    pub callback: Option<Arc<dyn NetworkSetupHook>>,
}

/// Options of [`crate::fork_and_export`]; see [`CreateLocalOptions`] for the defaulting rules.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CloneLocalOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_to_fund: Option<Vec<EvmAddress>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_amount: Option<U256>,
    /// `mainnet` or `testnet`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Empty forks every chain of the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_options: Option<ForkNetworkOptions>,
    #[serde(skip)]
    pub after_relay: Option<AfterRelay>,
    #[serde(skip)]
    pub callback: Option<Arc<dyn NetworkSetupHook>>,
}

/// Options with every default applied, shared by both export flavours.
#[derive(Clone)]
pub(crate) struct ExportSettings {
    pub chain_output_path: PathBuf,
    pub accounts_to_fund: Vec<Address>,
    pub fund_amount: U256,
    pub relay_interval: Duration,
    pub port: u16,
    pub after_relay: Option<AfterRelay>,
    pub callback: Option<Arc<dyn NetworkSetupHook>>,
}

pub fn default_fund_amount() -> U256 {
    parse_ether(DEFAULT_FUND_AMOUNT_ETHER).unwrap_or(U256::ZERO)
}

impl ExportSettings {
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        chain_output_path: Option<PathBuf>,
        accounts_to_fund: Option<Vec<EvmAddress>>,
        fund_amount: Option<U256>,
        relay_interval: Option<u64>,
        port: Option<u16>,
        after_relay: Option<AfterRelay>,
        callback: Option<Arc<dyn NetworkSetupHook>>,
    ) -> Self {
        Self {
            chain_output_path: chain_output_path
                .filter(|path| !path.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHAIN_OUTPUT_PATH)),
            accounts_to_fund: accounts_to_fund
                .unwrap_or_default()
                .into_iter()
                .map(EvmAddress::into_address)
                .collect(),
            fund_amount: fund_amount.filter(|amount| !amount.is_zero()).unwrap_or_else(default_fund_amount),
            relay_interval: Duration::from_millis(
                relay_interval.filter(|ms| *ms > 0).unwrap_or(DEFAULT_RELAY_INTERVAL_MS),
            ),
            port: port.filter(|port| *port > 0).unwrap_or(DEFAULT_PORT),
            after_relay,
            callback,
        }
    }
}

impl CreateLocalOptions {
    pub(crate) fn resolve(self) -> (Vec<String>, ExportSettings) {
        let chains = self
            .chains
            .unwrap_or_else(|| DEFAULT_LOCAL_CHAINS.iter().map(|name| name.to_string()).collect());

        let settings = ExportSettings::resolve(
            self.chain_output_path,
            self.accounts_to_fund,
            self.fund_amount,
            self.relay_interval,
            self.port,
            self.after_relay,
            self.callback,
        );

        (chains, settings)
    }
}

pub(crate) struct ForkSelection {
    pub env: ForkEnvironment,
    pub chains: Vec<String>,
    pub network_options: ForkNetworkOptions,
}

impl CloneLocalOptions {
    pub(crate) fn resolve(self) -> Result<(ForkSelection, ExportSettings), ChainInfoError> {
        let env = match self.env.as_deref() {
            None | Some("") => ForkEnvironment::default(),
            Some(env) => env.parse()?,
        };

        let selection = ForkSelection {
            env,
            chains: self.chains.unwrap_or_default(),
            network_options: self.network_options.unwrap_or_default(),
        };

        let settings = ExportSettings::resolve(
            self.chain_output_path,
            self.accounts_to_fund,
            self.fund_amount,
            self.relay_interval,
            self.port,
            self.after_relay,
            self.callback,
        );

        Ok((selection, settings))
    }
}
