use std::{fmt, sync::Arc};

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use super::ChainId;
use crate::network::anvil::{AnvilError, AnvilInstance};
use crate::provider::{create_retry_client, create_wallet_client, RetryClientError};
use crate::shared::common_types::EvmAddress;
use crate::wallet::NetworkWallets;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("{0}")]
    Provider(#[from] RetryClientError),

    #[error("Provider error: {0}")]
    RpcError(#[from] RpcError<TransportErrorKind>),

    #[error("Transaction receipt could not be fetched: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    #[error("Funding {to} on {network} reverted")]
    FundingReverted { network: String, to: Address },

    #[error("Network {0} has no user wallets")]
    NoUserWallet(String),

    #[error("{0}")]
    Anvil(#[from] AnvilError),
}

/// A running chain with the local gateway contracts deployed on it.
#[derive(Clone)]
pub struct Network {
    pub name: String,
    pub chain_id: ChainId,
    /// The node's own url, not the proxied one exported to other tooling.
    pub rpc_url: String,
    pub gateway: EvmAddress,
    pub gas_receiver: EvmAddress,
    pub const_address_deployer: EvmAddress,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    /// First block that can hold gateway events, the block the contracts were deployed in.
    pub start_block: u64,
    pub wallets: NetworkWallets,
    node: Option<Arc<Mutex<AnvilInstance>>>,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("gateway", &self.gateway)
            .field("gas_receiver", &self.gas_receiver)
            .field("const_address_deployer", &self.const_address_deployer)
            .finish()
    }
}

impl Network {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        chain_id: ChainId,
        rpc_url: String,
        gateway: EvmAddress,
        gas_receiver: EvmAddress,
        const_address_deployer: EvmAddress,
        wallets: NetworkWallets,
        node: Option<AnvilInstance>,
    ) -> Self {
        Self {
            name,
            chain_id,
            rpc_url,
            gateway,
            gas_receiver,
            const_address_deployer,
            token_name: None,
            token_symbol: None,
            start_block: 0,
            wallets,
            node: node.map(|node| Arc::new(Mutex::new(node))),
        }
    }

    pub fn with_token(mut self, token_name: Option<String>, token_symbol: Option<String>) -> Self {
        self.token_name = token_name;
        self.token_symbol = token_symbol;
        self
    }

    pub fn with_start_block(mut self, start_block: u64) -> Self {
        self.start_block = start_block;
        self
    }

    pub fn provider(&self) -> Result<DynProvider, NetworkError> {
        Ok(create_retry_client(&self.rpc_url)?)
    }

    pub fn wallet_provider(&self, signer: &PrivateKeySigner) -> Result<DynProvider, NetworkError> {
        Ok(create_wallet_client(&self.rpc_url, signer)?)
    }

    pub fn user_wallets(&self) -> &[PrivateKeySigner] {
        self.wallets.users()
    }

    /// Sends `amount` wei from the first user wallet to `to` and waits for it to be mined.
    pub async fn fund(&self, to: Address, amount: U256) -> Result<TxHash, NetworkError> {
        let user =
            self.user_wallets().first().ok_or_else(|| NetworkError::NoUserWallet(self.name.clone()))?;
        let provider = self.wallet_provider(user)?;

        let tx = TransactionRequest::default().with_to(to).with_value(amount);
        let receipt = provider.send_transaction(tx).await?.get_receipt().await?;
        if !receipt.status() {
            return Err(NetworkError::FundingReverted { network: self.name.clone(), to });
        }

        info!("Funded {} with {} wei on {}", to, amount, self.name);
        Ok(receipt.transaction_hash)
    }

    /// Stops the underlying node. Networks that were handed in already running are left alone.
    pub async fn stop(&self) -> Result<(), NetworkError> {
        if let Some(node) = &self.node {
            node.lock().await.stop().await?;
        }
        Ok(())
    }
}
