mod command;
pub use command::{
    approve_batch_data, approve_command, approve_contract_call_params,
    approve_contract_call_with_mint_params, group_by_destination, APPROVE_CONTRACT_CALL,
    APPROVE_CONTRACT_CALL_WITH_MINT,
};

pub mod contracts;

mod gateway_relayer;
pub use gateway_relayer::GatewayRelayer;

mod types;
pub use types::{
    GasLog, GasLogWithToken, PendingCall, RelayData, RelayOutcome, RelayedCall, TokenTransfer,
};

use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use thiserror::Error;

use crate::network::NetworkError;
use crate::shared::utils::LogIdError;
use crate::signing::SigningError;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Provider error: {0}")]
    RpcError(#[from] RpcError<TransportErrorKind>),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("Contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("Transaction receipt could not be fetched: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    #[error("Could not sign the approval batch: {0}")]
    Signing(#[from] SigningError),

    #[error("Could not decode event: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    #[error("{0}")]
    LogId(#[from] LogIdError),

    #[error("Transaction reverted: {0}")]
    Reverted(String),
}

/// One relay pass over every running network.
#[async_trait]
pub trait Relayer: Send + Sync {
    async fn relay(&self) -> Result<RelayData, RelayError>;

    /// Forgets everything relayed so far, including the gas logs.
    async fn reset(&self);
}
