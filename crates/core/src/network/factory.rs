use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use alloy::providers::Provider;
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::contract::{
    deploy_contract, ArtifactError, ContractArtifact, DeployContractError, DeployOptions,
};
use crate::network::anvil::{AnvilConfig, AnvilError, AnvilInstance};
use crate::network::types::{ChainCloneData, ChainId, Network, NetworkError};
use crate::provider::{create_retry_client, create_wallet_client};
use crate::wallet::{NetworkWallets, WalletError};

/// First chain id handed out to created networks, each further network gets the next one.
pub const FIRST_LOCAL_CHAIN_ID: u64 = 2500;

#[derive(Error, Debug)]
pub enum CreateNetworkError {
    #[error("{0}")]
    Anvil(#[from] AnvilError),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("{0}")]
    Wallet(#[from] WalletError),

    #[error("{0}")]
    Artifact(#[from] ArtifactError),

    #[error("{0}")]
    Deploy(#[from] DeployContractError),

    #[error("Setting balance of {address} on {network} failed: {reason}")]
    SetBalance { network: String, address: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CreateNetworkOptions {
    pub name: String,
    /// Seed of the deterministic accounts, defaults to the name.
    pub seed: Option<String>,
    pub chain_id: Option<u64>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkNetworkOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anvil_args: Vec<String>,
}

/// Creates and forks networks for the export driver.
#[async_trait]
pub trait NetworkFactory: Send + Sync {
    async fn create_network(
        &self,
        options: CreateNetworkOptions,
    ) -> Result<Network, CreateNetworkError>;

    async fn fork_network(
        &self,
        chain: &ChainCloneData,
        options: &ForkNetworkOptions,
    ) -> Result<Network, CreateNetworkError>;
}

/// Paths of the compiled contracts deployed on every network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalContractArtifacts {
    /// Constructor `(address operator)`.
    pub gateway: PathBuf,
    /// Constructor `(address owner)`.
    pub gas_receiver: PathBuf,
    /// No constructor arguments.
    pub const_address_deployer: PathBuf,
}

struct LoadedArtifacts {
    gateway: ContractArtifact,
    gas_receiver: ContractArtifact,
    const_address_deployer: ContractArtifact,
}

impl LoadedArtifacts {
    fn load(paths: &LocalContractArtifacts) -> Result<Self, ArtifactError> {
        Ok(Self {
            gateway: ContractArtifact::from_file(&paths.gateway)?,
            gas_receiver: ContractArtifact::from_file(&paths.gas_receiver)?,
            const_address_deployer: ContractArtifact::from_file(&paths.const_address_deployer)?,
        })
    }
}

/// Runs every network as its own anvil process and deploys fresh local contracts on it, for
/// forks as well as for new chains, so the relayer's operator key is always the gateway's.
pub struct AnvilNetworkFactory {
    artifacts: LoadedArtifacts,
    created: AtomicU64,
}

impl AnvilNetworkFactory {
    pub fn new(artifacts: &LocalContractArtifacts) -> Result<Self, ArtifactError> {
        Ok(Self { artifacts: LoadedArtifacts::load(artifacts)?, created: AtomicU64::new(0) })
    }

    async fn setup(
        &self,
        name: &str,
        seed: &str,
        node: AnvilInstance,
    ) -> Result<Network, CreateNetworkError> {
        let rpc_url = node.rpc_url();
        let wallets = NetworkWallets::from_seed(seed)?;

        let provider = create_retry_client(&rpc_url).map_err(NetworkError::from)?;
        for account in wallets.accounts() {
            let address = account.address()?;
            provider
                .raw_request::<_, serde_json::Value>(
                    "anvil_setBalance".into(),
                    (address, account.balance),
                )
                .await
                .map_err(|e| CreateNetworkError::SetBalance {
                    network: name.to_string(),
                    address: address.to_string(),
                    reason: e.to_string(),
                })?;
        }

        let chain_id = ChainId::new(provider.get_chain_id().await.map_err(NetworkError::from)?);

        let deployer = wallets.owner();
        let deployer_provider =
            create_wallet_client(&rpc_url, deployer).map_err(NetworkError::from)?;

        info!("Deploying local contracts on {} ({})", name, chain_id);
        let const_address_deployer = deploy_contract(
            &deployer_provider,
            &self.artifacts.const_address_deployer,
            &[],
            DeployOptions::default(),
        )
        .await?;
        let gas_receiver = deploy_contract(
            &deployer_provider,
            &self.artifacts.gas_receiver,
            &wallets.owner().address().abi_encode(),
            DeployOptions::default(),
        )
        .await?;
        let gateway = deploy_contract(
            &deployer_provider,
            &self.artifacts.gateway,
            &wallets.operator().address().abi_encode(),
            DeployOptions::default(),
        )
        .await?;

        let start_block = provider.get_block_number().await.map_err(NetworkError::from)?;

        Ok(Network::new(
            name.to_string(),
            chain_id,
            rpc_url,
            gateway.into(),
            gas_receiver.into(),
            const_address_deployer.into(),
            wallets,
            Some(node),
        )
        .with_start_block(start_block))
    }
}

#[async_trait]
impl NetworkFactory for AnvilNetworkFactory {
    async fn create_network(
        &self,
        options: CreateNetworkOptions,
    ) -> Result<Network, CreateNetworkError> {
        let index = self.created.fetch_add(1, Ordering::SeqCst);
        let chain_id = options.chain_id.unwrap_or(FIRST_LOCAL_CHAIN_ID + index);

        info!("Creating {} with chain id {}", options.name, chain_id);
        let node = AnvilInstance::spawn(&AnvilConfig {
            port: options.port,
            chain_id: Some(chain_id),
            ..Default::default()
        })
        .await?;

        let seed = options.seed.as_deref().unwrap_or(&options.name);
        self.setup(&options.name, seed, node).await
    }

    async fn fork_network(
        &self,
        chain: &ChainCloneData,
        options: &ForkNetworkOptions,
    ) -> Result<Network, CreateNetworkError> {
        info!("Forking {} from {}", chain.name, chain.rpc);
        let node = AnvilInstance::spawn(&AnvilConfig {
            fork_url: Some(chain.rpc.clone()),
            fork_block_number: options.fork_block_number,
            extra_args: options.anvil_args.clone(),
            ..Default::default()
        })
        .await?;

        let network = self.setup(&chain.name, &chain.name, node).await?;
        Ok(network.with_token(Some(chain.token_name.clone()), Some(chain.token_symbol.clone())))
    }
}
