mod default_accounts;
pub use default_accounts::{default_accounts, DefaultAccount, DEFAULT_ACCOUNT_BALANCE};

mod network_wallets;
pub use network_wallets::{NetworkWallets, WalletRole, NETWORK_WALLET_COUNT};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Signing key error: {0}")]
    SigningKeyError(#[from] alloy::signers::local::LocalSignerError),

    #[error("Account index {index} is out of range, only {count} accounts were generated")]
    AccountOutOfRange { index: usize, count: usize },
}
