use std::{error::Error, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    pub fn new(id: u64) -> Self {
        ChainId(id)
    }

    pub fn u64(&self) -> u64 {
        self.0
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct ParseChainIdError;

impl Display for ParseChainIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid chain id")
    }
}

impl Error for ParseChainIdError {}

impl FromStr for ChainId {
    type Err = ParseChainIdError;

    fn from_str(param: &str) -> Result<Self, Self::Err> {
        u64::from_str(param).map(ChainId).map_err(|_| ParseChainIdError)
    }
}

impl From<ChainId> for u64 {
    fn from(chain_id: ChainId) -> Self {
        chain_id.0
    }
}

impl From<u64> for ChainId {
    fn from(chain_id: u64) -> Self {
        ChainId(chain_id)
    }
}
