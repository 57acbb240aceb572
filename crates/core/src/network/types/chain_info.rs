use std::{fmt::Display, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::common_types::EvmAddress;

#[derive(Error, Debug)]
pub enum ChainInfoError {
    #[error("need to specify mainnet or testnet")]
    InvalidEnvironment(String),

    #[error("Could not read chain info {path}: {source}")]
    CouldNotRead { path: String, source: std::io::Error },

    #[error("Chain info {path} is invalid: {source}")]
    InvalidChainInfo { path: String, source: serde_json::Error },
}

/// Everything needed to fork a deployed chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainCloneData {
    pub name: String,
    pub gateway: EvmAddress,
    pub rpc: String,
    pub gas_receiver: EvmAddress,
    pub const_address_deployer: EvmAddress,
    pub token_name: String,
    pub token_symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkEnvironment {
    #[default]
    Mainnet,
    Testnet,
}

impl Display for ForkEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForkEnvironment::Mainnet => write!(f, "mainnet"),
            ForkEnvironment::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for ForkEnvironment {
    type Err = ChainInfoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mainnet" => Ok(ForkEnvironment::Mainnet),
            "testnet" => Ok(ForkEnvironment::Testnet),
            other => Err(ChainInfoError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Mainnet and testnet deployments, read from a JSON file of the form
/// `{ "mainnet": [ChainCloneData..], "testnet": [ChainCloneData..] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainInfoTables {
    #[serde(default)]
    pub mainnet: Vec<ChainCloneData>,
    #[serde(default)]
    pub testnet: Vec<ChainCloneData>,
}

impl ChainInfoTables {
    pub fn from_file(path: &Path) -> Result<Self, ChainInfoError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path)
            .map_err(|source| ChainInfoError::CouldNotRead { path: display.clone(), source })?;

        serde_json::from_str(&contents)
            .map_err(|source| ChainInfoError::InvalidChainInfo { path: display, source })
    }

    pub fn for_environment(&self, env: ForkEnvironment) -> &[ChainCloneData] {
        match env {
            ForkEnvironment::Mainnet => &self.mainnet,
            ForkEnvironment::Testnet => &self.testnet,
        }
    }

    /// The chains of `env` to fork. An empty `names` selects the whole table; otherwise the
    /// table is filtered to those names and keeps its own order.
    pub fn select(&self, env: ForkEnvironment, names: &[String]) -> Vec<ChainCloneData> {
        let chains = self.for_environment(env);
        if names.is_empty() {
            return chains.to_vec();
        }

        chains.iter().filter(|chain| names.iter().any(|name| name == &chain.name)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: &'static str,
    pub token_name: &'static str,
    pub token_symbol: &'static str,
}

const TESTNET_TOKENS: [TokenMetadata; 5] = [
    TokenMetadata { name: "Moonbeam", token_name: "DEV", token_symbol: "DEV" },
    TokenMetadata { name: "Avalanche", token_name: "Avax", token_symbol: "AVAX" },
    TokenMetadata { name: "Fantom", token_name: "Fantom", token_symbol: "FTM" },
    TokenMetadata { name: "Ethereum", token_name: "Ether", token_symbol: "ETH" },
    TokenMetadata { name: "Polygon", token_name: "Matic", token_symbol: "MATIC" },
];

/// Native token name and symbol of the testnet chain called `name`, if it is a known one.
pub fn token_metadata(name: &str) -> Option<TokenMetadata> {
    TESTNET_TOKENS.iter().find(|token| token.name == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(name: &str) -> ChainCloneData {
        ChainCloneData {
            name: name.to_string(),
            gateway: EvmAddress::zero(),
            rpc: format!("https://{}.example", name.to_lowercase()),
            gas_receiver: EvmAddress::zero(),
            const_address_deployer: EvmAddress::zero(),
            token_name: "Token".to_string(),
            token_symbol: "TKN".to_string(),
        }
    }

    #[test]
    fn environment_must_be_mainnet_or_testnet() {
        assert_eq!("mainnet".parse::<ForkEnvironment>().unwrap(), ForkEnvironment::Mainnet);
        assert_eq!("testnet".parse::<ForkEnvironment>().unwrap(), ForkEnvironment::Testnet);

        let err = "devnet".parse::<ForkEnvironment>().unwrap_err();
        assert_eq!(err.to_string(), "need to specify mainnet or testnet");
    }

    #[test]
    fn empty_selection_takes_every_chain() {
        let tables = ChainInfoTables {
            mainnet: vec![chain("Ethereum"), chain("Avalanche")],
            testnet: vec![chain("Fantom")],
        };

        let selected = tables.select(ForkEnvironment::Mainnet, &[]);
        assert_eq!(selected, vec![chain("Ethereum"), chain("Avalanche")]);
    }

    #[test]
    fn selection_keeps_table_order_and_drops_unknown_names() {
        let tables = ChainInfoTables {
            mainnet: vec![chain("Ethereum"), chain("Avalanche"), chain("Polygon")],
            testnet: vec![],
        };

        let names = vec!["Polygon".to_string(), "Ethereum".to_string(), "Kava".to_string()];
        let selected: Vec<String> = tables
            .select(ForkEnvironment::Mainnet, &names)
            .into_iter()
            .map(|chain| chain.name)
            .collect();

        assert_eq!(selected, vec!["Ethereum", "Polygon"]);
        assert!(tables.select(ForkEnvironment::Testnet, &names).is_empty());
    }

    #[test]
    fn chain_info_uses_camel_case_keys() {
        let json = r#"{
            "mainnet": [{
                "name": "Avalanche",
                "gateway": "0x5029C0EFf6C34351a0CEc334542cDb22c7928f78",
                "rpc": "https://api.avax.network/ext/bc/C/rpc",
                "gasReceiver": "0x2d5d7d31F671F86C782533cc367F14109a082712",
                "constAddressDeployer": "0x98B2920D53612483F91F12Ed7754E51b4A77919e",
                "tokenName": "Avax",
                "tokenSymbol": "AVAX"
            }]
        }"#;

        let tables: ChainInfoTables = serde_json::from_str(json).unwrap();
        assert_eq!(tables.mainnet.len(), 1);
        assert_eq!(tables.mainnet[0].token_symbol, "AVAX");
        assert!(tables.testnet.is_empty());
    }

    #[test]
    fn knows_the_default_local_chains() {
        let avalanche = token_metadata("Avalanche").unwrap();
        assert_eq!(avalanche.token_symbol, "AVAX");
        assert!(token_metadata("Kava").is_none());
    }
}
