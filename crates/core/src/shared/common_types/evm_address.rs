use std::{error::Error, fmt::Display, str::FromStr};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Serialize, PartialEq, Eq, Hash, Deserialize, PartialOrd, Ord)]
pub struct EvmAddress(Address);

impl EvmAddress {
    /// Lower-cased `0x` prefixed hex.
    pub fn hex(&self) -> String {
        format!("{:?}", self.0)
    }

    /// EIP-55 checksummed form, the way addresses are exported to other tooling.
    pub fn checksummed(&self) -> String {
        self.0.to_checksum(None)
    }

    pub fn new(address: Address) -> Self {
        EvmAddress(address)
    }

    pub fn into_address(self) -> Address {
        self.0
    }

    pub fn zero() -> Self {
        Self(Address::ZERO)
    }
}

impl Display for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.checksummed())
    }
}

#[derive(Debug)]
pub struct ParseEvmAddressError(String);

impl Display for ParseEvmAddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid EVM address: {}", self.0)
    }
}

impl Error for ParseEvmAddressError {}

impl FromStr for EvmAddress {
    type Err = ParseEvmAddressError;

    fn from_str(param: &str) -> Result<Self, Self::Err> {
        Address::from_str(param.trim())
            .map(EvmAddress)
            .map_err(|e| ParseEvmAddressError(format!("{} ({})", param, e)))
    }
}

impl From<EvmAddress> for Address {
    fn from(address: EvmAddress) -> Self {
        address.0
    }
}

impl From<Address> for EvmAddress {
    fn from(address: Address) -> Self {
        EvmAddress(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lower_case_and_displays_checksummed() {
        let address: EvmAddress = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();

        assert_eq!(address.to_string(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(address.hex(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn rejects_garbage() {
        assert!("0x1234".parse::<EvmAddress>().is_err());
        assert!("not an address".parse::<EvmAddress>().is_err());
    }
}
