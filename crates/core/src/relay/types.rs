use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::Serialize;

/// Tokens sent along with a call, minted on the destination gateway when it is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTransfer {
    pub symbol: String,
    pub amount: U256,
}

/// A `ContractCall` or `ContractCallWithToken` seen on a source gateway that still has to be
/// approved and executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub command_id: B256,
    pub source_chain: String,
    pub source_address: Address,
    pub destination_chain: String,
    pub destination_contract_address: String,
    pub payload_hash: B256,
    pub payload: Bytes,
    pub source_tx_hash: B256,
    pub source_event_index: u64,
    pub token: Option<TokenTransfer>,
}

impl PendingCall {
    /// Source address the way the destination contract receives it, EIP-55 checksummed.
    pub fn source_address_string(&self) -> String {
        self.source_address.to_checksum(None)
    }

    pub fn destination_contract(&self) -> Option<Address> {
        self.destination_contract_address.parse().ok()
    }
}

/// Gas paid on a source chain for a call to another chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasLog {
    pub source_chain: String,
    pub source_address: Address,
    pub destination_chain: String,
    pub destination_address: String,
    pub payload_hash: B256,
    pub gas_fee_amount: U256,
    pub refund_address: Address,
    pub tx_hash: Option<TxHash>,
}

impl GasLog {
    /// Only calls without tokens, those are paid through [`GasLogWithToken`].
    pub fn pays_for(&self, call: &PendingCall) -> bool {
        call.token.is_none()
            && self.source_chain == call.source_chain
            && self.source_address == call.source_address
            && self.destination_chain == call.destination_chain
            && self.destination_address.eq_ignore_ascii_case(&call.destination_contract_address)
            && self.payload_hash == call.payload_hash
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RelayOutcome {
    Executed {
        #[serde(rename = "txHash")]
        tx_hash: TxHash,
    },
    Failed {
        reason: String,
    },
}

/// Gas paid on a source chain for a call that carries tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasLogWithToken {
    pub source_chain: String,
    pub source_address: Address,
    pub destination_chain: String,
    pub destination_address: String,
    pub payload_hash: B256,
    pub symbol: String,
    pub amount: U256,
    pub gas_fee_amount: U256,
    pub refund_address: Address,
    pub tx_hash: Option<TxHash>,
}

impl GasLogWithToken {
    pub fn pays_for(&self, call: &PendingCall) -> bool {
        let Some(token) = &call.token else {
            return false;
        };

        self.source_chain == call.source_chain
            && self.source_address == call.source_address
            && self.destination_chain == call.destination_chain
            && self.destination_address.eq_ignore_ascii_case(&call.destination_contract_address)
            && self.payload_hash == call.payload_hash
            && self.symbol == token.symbol
            && self.amount == token.amount
    }
}

impl RelayOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, RelayOutcome::Executed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedCall {
    pub command_id: B256,
    pub source_chain: String,
    pub source_address: String,
    pub destination_chain: String,
    pub destination_contract_address: String,
    pub payload_hash: B256,
    pub payload: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenTransfer>,
    pub gas_paid: Option<U256>,
    pub outcome: RelayOutcome,
}

impl RelayedCall {
    pub fn new(call: &PendingCall, gas_paid: Option<U256>, outcome: RelayOutcome) -> Self {
        Self {
            command_id: call.command_id,
            source_chain: call.source_chain.clone(),
            source_address: call.source_address_string(),
            destination_chain: call.destination_chain.clone(),
            destination_contract_address: call.destination_contract_address.clone(),
            payload_hash: call.payload_hash,
            payload: call.payload.clone(),
            token: call.token.clone(),
            gas_paid,
            outcome,
        }
    }
}

/// What a single relay pass did, keyed by command id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelayData {
    pub calls: BTreeMap<B256, RelayedCall>,
}

impl RelayData {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn executed(&self) -> usize {
        self.calls.values().filter(|call| call.outcome.is_executed()).count()
    }

    pub fn failed(&self) -> usize {
        self.calls.len() - self.executed()
    }
}
