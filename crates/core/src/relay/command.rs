use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;

use crate::network::ChainId;
use crate::relay::types::PendingCall;

pub const APPROVE_CONTRACT_CALL: &str = "approveContractCall";
pub const APPROVE_CONTRACT_CALL_WITH_MINT: &str = "approveContractCallWithMint";

/// `abi.encode(sourceChain, sourceAddress, contractAddress, payloadHash, sourceTxHash,
/// sourceEventIndex)`.
pub fn approve_contract_call_params(call: &PendingCall, contract_address: Address) -> Bytes {
    (
        call.source_chain.clone(),
        call.source_address_string(),
        contract_address,
        call.payload_hash,
        call.source_tx_hash,
        U256::from(call.source_event_index),
    )
        .abi_encode_params()
        .into()
}

/// `abi.encode(sourceChain, sourceAddress, contractAddress, payloadHash, symbol, amount,
/// sourceTxHash, sourceEventIndex)`. Calls without tokens are encoded with an empty symbol and a
/// zero amount.
pub fn approve_contract_call_with_mint_params(
    call: &PendingCall,
    contract_address: Address,
) -> Bytes {
    let (symbol, amount) = match &call.token {
        Some(token) => (token.symbol.clone(), token.amount),
        None => (String::new(), U256::ZERO),
    };

    (
        call.source_chain.clone(),
        call.source_address_string(),
        contract_address,
        call.payload_hash,
        symbol,
        amount,
        call.source_tx_hash,
        U256::from(call.source_event_index),
    )
        .abi_encode_params()
        .into()
}

/// The gateway command approving `call`, and its params.
pub fn approve_command(call: &PendingCall, contract_address: Address) -> (&'static str, Bytes) {
    match call.token {
        Some(_) => (
            APPROVE_CONTRACT_CALL_WITH_MINT,
            approve_contract_call_with_mint_params(call, contract_address),
        ),
        None => (APPROVE_CONTRACT_CALL, approve_contract_call_params(call, contract_address)),
    }
}

/// The batch a gateway on `chain_id` executes: `abi.encode(chainId, commandIds, commands,
/// params)` with one approval per call.
pub fn approve_batch_data(chain_id: ChainId, calls: &[(PendingCall, Address)]) -> Bytes {
    let command_ids: Vec<B256> = calls.iter().map(|(call, _)| call.command_id).collect();
    let (commands, params): (Vec<String>, Vec<Bytes>) = calls
        .iter()
        .map(|(call, contract_address)| {
            let (command, params) = approve_command(call, *contract_address);
            (command.to_string(), params)
        })
        .unzip();

    (U256::from(chain_id.u64()), command_ids, commands, params).abi_encode_params().into()
}

/// Groups calls by destination chain, keeping the order they were seen in within a group.
pub fn group_by_destination(calls: Vec<PendingCall>) -> BTreeMap<String, Vec<PendingCall>> {
    let mut groups: BTreeMap<String, Vec<PendingCall>> = BTreeMap::new();
    for call in calls {
        groups.entry(call.destination_chain.clone()).or_default().push(call);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::TokenTransfer;
    use alloy::primitives::{address, keccak256};

    fn call(index: u64, destination_chain: &str) -> PendingCall {
        let payload = Bytes::from(vec![index as u8; 4]);
        PendingCall {
            command_id: keccak256(format!("Avalanche:1:0:{}", index)),
            source_chain: "Avalanche".to_string(),
            source_address: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            destination_chain: destination_chain.to_string(),
            destination_contract_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
                .to_string(),
            payload_hash: keccak256(&payload),
            payload,
            source_tx_hash: keccak256("tx"),
            source_event_index: index,
            token: None,
        }
    }

    #[test]
    fn groups_keep_arrival_order() {
        let groups = group_by_destination(vec![
            call(0, "Fantom"),
            call(1, "Polygon"),
            call(2, "Fantom"),
        ]);

        assert_eq!(groups.len(), 2);
        let fantom: Vec<u64> = groups["Fantom"].iter().map(|c| c.source_event_index).collect();
        assert_eq!(fantom, vec![0, 2]);
        assert_eq!(groups["Polygon"].len(), 1);
    }

    #[test]
    fn batch_has_one_approval_per_call() {
        let contract = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
        let calls = vec![(call(0, "Fantom"), contract), (call(1, "Fantom"), contract)];

        let data = approve_batch_data(ChainId::new(2502), &calls);
        let (chain_id, command_ids, commands, params) =
            <(U256, Vec<B256>, Vec<String>, Vec<Bytes>)>::abi_decode_params(&data).unwrap();

        assert_eq!(chain_id, U256::from(2502u64));
        assert_eq!(command_ids, vec![calls[0].0.command_id, calls[1].0.command_id]);
        assert!(commands.iter().all(|command| command == APPROVE_CONTRACT_CALL));
        assert_eq!(params[1], approve_contract_call_params(&calls[1].0, contract));
    }

    #[test]
    fn params_carry_the_checksummed_source_address() {
        let pending = call(3, "Ethereum");
        let contract = pending.destination_contract().unwrap();
        let params = approve_contract_call_params(&pending, contract);

        let (source_chain, source_address, contract_address, payload_hash, _, event_index) =
            <(String, String, Address, B256, B256, U256)>::abi_decode_params(&params).unwrap();

        assert_eq!(source_chain, "Avalanche");
        assert_eq!(source_address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(contract_address, contract);
        assert_eq!(payload_hash, pending.payload_hash);
        assert_eq!(event_index, U256::from(3u64));
    }

    #[test]
    fn token_calls_are_approved_with_a_mint() {
        let contract = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
        let mut with_token = call(1, "Fantom");
        with_token.token =
            Some(TokenTransfer { symbol: "aUSDC".to_string(), amount: U256::from(5_000_000u64) });
        let calls = vec![(call(0, "Fantom"), contract), (with_token.clone(), contract)];

        let data = approve_batch_data(ChainId::new(2502), &calls);
        let (_, _, commands, params) =
            <(U256, Vec<B256>, Vec<String>, Vec<Bytes>)>::abi_decode_params(&data).unwrap();

        assert_eq!(commands, vec![APPROVE_CONTRACT_CALL, APPROVE_CONTRACT_CALL_WITH_MINT]);
        let (source_chain, _, contract_address, payload_hash, symbol, amount, _, event_index) =
            <(String, String, Address, B256, String, U256, B256, U256)>::abi_decode_params(
                &params[1],
            )
            .unwrap();
        assert_eq!(source_chain, "Avalanche");
        assert_eq!(contract_address, contract);
        assert_eq!(payload_hash, with_token.payload_hash);
        assert_eq!(symbol, "aUSDC");
        assert_eq!(amount, U256::from(5_000_000u64));
        assert_eq!(event_index, U256::from(1u64));
    }
}
