use std::fmt::Display;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::wallet::{default_accounts, DefaultAccount, WalletError};

/// Accounts generated for every network.
pub const NETWORK_WALLET_COUNT: usize = 20;

const OWNER_INDEX: usize = 0;
const OPERATOR_INDEX: usize = 1;
const RELAYER_INDEX: usize = 2;
const ADMIN_RANGE: std::ops::Range<usize> = 3..7;
const USER_RANGE: std::ops::Range<usize> = 10..NETWORK_WALLET_COUNT;

/// What a network account is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletRole {
    Owner,
    Operator,
    Relayer,
    Admin,
    User,
}

impl WalletRole {
    /// The role of the account at `index`, `None` for the unassigned ones.
    pub fn of(index: usize) -> Option<Self> {
        match index {
            OWNER_INDEX => Some(WalletRole::Owner),
            OPERATOR_INDEX => Some(WalletRole::Operator),
            RELAYER_INDEX => Some(WalletRole::Relayer),
            index if ADMIN_RANGE.contains(&index) => Some(WalletRole::Admin),
            index if USER_RANGE.contains(&index) => Some(WalletRole::User),
            _ => None,
        }
    }
}

impl Display for WalletRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletRole::Owner => write!(f, "owner"),
            WalletRole::Operator => write!(f, "operator"),
            WalletRole::Relayer => write!(f, "relayer"),
            WalletRole::Admin => write!(f, "admin"),
            WalletRole::User => write!(f, "user"),
        }
    }
}

/// The deterministic accounts of a network split into the roles the local contracts and the
/// relayer use.
#[derive(Debug, Clone)]
pub struct NetworkWallets {
    accounts: Vec<DefaultAccount>,
    signers: Vec<PrivateKeySigner>,
}

impl NetworkWallets {
    pub fn from_seed(seed: &str) -> Result<Self, WalletError> {
        let accounts = default_accounts(NETWORK_WALLET_COUNT, seed);
        let signers =
            accounts.iter().map(|account| account.signer()).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { accounts, signers })
    }

    pub fn accounts(&self) -> &[DefaultAccount] {
        &self.accounts
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(|signer| signer.address()).collect()
    }

    pub fn get(&self, index: usize) -> Result<&PrivateKeySigner, WalletError> {
        self.signers
            .get(index)
            .ok_or(WalletError::AccountOutOfRange { index, count: self.signers.len() })
    }

    pub fn owner(&self) -> &PrivateKeySigner {
        &self.signers[OWNER_INDEX]
    }

    pub fn operator(&self) -> &PrivateKeySigner {
        &self.signers[OPERATOR_INDEX]
    }

    pub fn relayer(&self) -> &PrivateKeySigner {
        &self.signers[RELAYER_INDEX]
    }

    pub fn admins(&self) -> &[PrivateKeySigner] {
        &self.signers[ADMIN_RANGE]
    }

    pub fn users(&self) -> &[PrivateKeySigner] {
        &self.signers[USER_RANGE]
    }
}
