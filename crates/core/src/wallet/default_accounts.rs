use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::signers::local::{LocalSignerError, PrivateKeySigner};
use alloy::sol_types::SolValue;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::wallet::WalletError;

/// 10^34 wei, enough that test accounts never run dry.
pub static DEFAULT_ACCOUNT_BALANCE: Lazy<U256> =
    Lazy::new(|| U256::from(10u64).pow(U256::from(34u64)));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultAccount {
    pub balance: U256,
    pub secret_key: B256,
}

impl DefaultAccount {
    pub fn signer(&self) -> Result<PrivateKeySigner, WalletError> {
        Ok(PrivateKeySigner::from_bytes(&self.secret_key).map_err(LocalSignerError::from)?)
    }

    pub fn address(&self) -> Result<Address, WalletError> {
        Ok(self.signer()?.address())
    }
}

/// Generates `n` deterministic accounts from `seed`.
///
/// The first key is `keccak256(abi.encode(seed))` and every following key is the keccak256 of
/// the previous one, so the same seed always yields the same accounts in the same order.
pub fn default_accounts(n: usize, seed: &str) -> Vec<DefaultAccount> {
    let mut key = keccak256(seed.to_string().abi_encode());

    let mut accounts = Vec::with_capacity(n);
    for _ in 0..n {
        accounts.push(DefaultAccount { balance: *DEFAULT_ACCOUNT_BALANCE, secret_key: key });
        key = keccak256(key);
    }

    accounts
}
