use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::ClientBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::layers::RetryBackoffLayer;
use reqwest::Url;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetryClientError {
    #[error("http provider cant be created for {0}: {1}")]
    HttpProviderCantBeCreated(String, String),
}

fn retry_client(rpc_url: &str) -> Result<alloy::rpc::client::RpcClient, RetryClientError> {
    let url = Url::parse(rpc_url).map_err(|e| {
        RetryClientError::HttpProviderCantBeCreated(rpc_url.to_string(), e.to_string())
    })?;

    // local nodes answer quickly, a handful of short retries covers anvil still booting
    let retry_layer = RetryBackoffLayer::new(10, 200, 660);
    Ok(ClientBuilder::default().layer(retry_layer).http(url))
}

/// Read-only provider for `rpc_url`.
pub fn create_retry_client(rpc_url: &str) -> Result<DynProvider, RetryClientError> {
    let client = retry_client(rpc_url)?;
    Ok(ProviderBuilder::new().connect_client(client).erased())
}

/// Provider that fills nonce, gas and chain id and signs with `signer`.
pub fn create_wallet_client(
    rpc_url: &str,
    signer: &PrivateKeySigner,
) -> Result<DynProvider, RetryClientError> {
    let client = retry_client(rpc_url)?;
    let wallet = EthereumWallet::from(signer.clone());
    Ok(ProviderBuilder::new().wallet(wallet).connect_client(client).erased())
}
