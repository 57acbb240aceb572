use std::{fs, path::Path};

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportErrorKind};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Could not read artifact {path}: {source}")]
    CouldNotRead { path: String, source: std::io::Error },

    #[error("Artifact {path} is not a valid contract artifact: {source}")]
    InvalidArtifact { path: String, source: serde_json::Error },

    #[error("Artifact {0} has no bytecode, is it an interface or abstract contract?")]
    EmptyBytecode(String),
}

#[derive(Error, Debug)]
pub enum DeployContractError {
    #[error("Contract {0} has no bytecode to deploy")]
    EmptyBytecode(String),

    #[error("Provider error: {0}")]
    RpcError(#[from] RpcError<TransportErrorKind>),

    #[error("Deployment receipt could not be fetched: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    #[error("Deployment of {0} reverted")]
    Reverted(String),

    #[error("Receipt for {0} has no contract address")]
    NoContractAddress(String),
}

/// Compiled contract as emitted by hardhat or forge.
///
/// Hardhat writes `bytecode` as a hex string while forge nests it as `{ "object": "0x.." }`;
/// both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    #[serde(default, rename = "contractName")]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub abi: serde_json::Value,
    #[serde(deserialize_with = "deserialize_bytecode")]
    pub bytecode: Bytes,
}

fn deserialize_bytecode<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBytecode {
        Hex(Bytes),
        Forge { object: Bytes },
    }

    Ok(match RawBytecode::deserialize(deserializer)? {
        RawBytecode::Hex(bytes) => bytes,
        RawBytecode::Forge { object } => object,
    })
}

impl ContractArtifact {
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path)
            .map_err(|source| ArtifactError::CouldNotRead { path: display.clone(), source })?;
        let artifact: ContractArtifact = serde_json::from_str(&contents)
            .map_err(|source| ArtifactError::InvalidArtifact { path: display.clone(), source })?;

        if artifact.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(display));
        }

        Ok(artifact)
    }

    pub fn name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or("contract")
    }

    /// Creation code followed by the abi encoded constructor arguments.
    pub fn deploy_code(&self, constructor_args: &[u8]) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(constructor_args);
        code.into()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub value: Option<U256>,
    pub gas_limit: Option<u64>,
}

/// Deploys `artifact` through a provider that carries the deployer's wallet and waits for the
/// receipt.
pub async fn deploy_contract(
    provider: &DynProvider,
    artifact: &ContractArtifact,
    constructor_args: &[u8],
    options: DeployOptions,
) -> Result<Address, DeployContractError> {
    if artifact.bytecode.is_empty() {
        return Err(DeployContractError::EmptyBytecode(artifact.name().to_string()));
    }

    let mut tx = TransactionRequest::default().with_deploy_code(artifact.deploy_code(constructor_args));
    if let Some(value) = options.value {
        tx = tx.with_value(value);
    }
    if let Some(gas_limit) = options.gas_limit {
        tx = tx.with_gas_limit(gas_limit);
    }

    let receipt = provider.send_transaction(tx).await?.get_receipt().await?;
    if !receipt.status() {
        return Err(DeployContractError::Reverted(artifact.name().to_string()));
    }

    let address = receipt
        .contract_address
        .ok_or_else(|| DeployContractError::NoContractAddress(artifact.name().to_string()))?;

    info!("Deployed {} at {}", artifact.name(), address);
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_hardhat_and_forge_artifacts() {
        let dir = tempfile::tempdir().unwrap();

        let hardhat = dir.path().join("Gateway.json");
        fs::write(
            &hardhat,
            r#"{ "contractName": "Gateway", "abi": [], "bytecode": "0x6080604052" }"#,
        )
        .unwrap();
        let artifact = ContractArtifact::from_file(&hardhat).unwrap();
        assert_eq!(artifact.name(), "Gateway");
        assert_eq!(artifact.bytecode, Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]));

        let forge = dir.path().join("GasReceiver.json");
        fs::write(&forge, r#"{ "abi": [], "bytecode": { "object": "0x6080" } }"#).unwrap();
        let artifact = ContractArtifact::from_file(&forge).unwrap();
        assert_eq!(artifact.name(), "contract");
        assert_eq!(artifact.bytecode, Bytes::from(vec![0x60, 0x80]));
    }

    #[test]
    fn interfaces_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IGateway.json");
        fs::write(&path, r#"{ "abi": [], "bytecode": "0x" }"#).unwrap();

        assert!(matches!(
            ContractArtifact::from_file(&path),
            Err(ArtifactError::EmptyBytecode(_))
        ));
    }

    #[test]
    fn constructor_args_are_appended() {
        let artifact = ContractArtifact {
            contract_name: None,
            abi: serde_json::Value::Null,
            bytecode: Bytes::from(vec![0x60, 0x80]),
        };

        assert_eq!(artifact.deploy_code(&[0x01, 0x02]), Bytes::from(vec![0x60, 0x80, 0x01, 0x02]));
    }
}
