use std::collections::HashMap;

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::Filter;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::network::{Network, NetworkRegistry};
use crate::relay::command::{approve_batch_data, group_by_destination};
use crate::relay::contracts::{IExecutable, IGasReceiver, ILocalGateway};
use crate::relay::types::{
    GasLog, GasLogWithToken, PendingCall, RelayData, RelayOutcome, RelayedCall, TokenTransfer,
};
use crate::relay::{RelayError, Relayer};
use crate::shared::utils::log_id_for;
use crate::signing::get_signed_execute_input;

/// Relays `ContractCall`s and `ContractCallWithToken`s between the gateways of every network in
/// a registry.
///
/// Each pass reads the gateway and gas receiver logs since the previous pass, approves the
/// calls on their destination gateway with a batch signed by that gateway's operator, and then
/// executes them on the destination contracts from the relayer wallet.
pub struct GatewayRelayer {
    registry: NetworkRegistry,
    /// Last block already read, per network name.
    cursors: Mutex<HashMap<String, u64>>,
    gas_logs: Mutex<GasLogs>,
}

#[derive(Debug, Clone, Default)]
struct GasLogs {
    plain: Vec<GasLog>,
    with_token: Vec<GasLogWithToken>,
}

impl GasLogs {
    fn extend(&mut self, other: GasLogs) {
        self.plain.extend(other.plain);
        self.with_token.extend(other.with_token);
    }

    fn clear(&mut self) {
        self.plain.clear();
        self.with_token.clear();
    }
}

struct Collected {
    calls: Vec<PendingCall>,
    gas_logs: GasLogs,
    last_block: Option<u64>,
}

impl GatewayRelayer {
    pub fn new(registry: NetworkRegistry) -> Self {
        Self {
            registry,
            cursors: Mutex::new(HashMap::new()),
            gas_logs: Mutex::new(GasLogs::default()),
        }
    }

    pub async fn gas_logs(&self) -> Vec<GasLog> {
        self.gas_logs.lock().await.plain.clone()
    }

    pub async fn gas_logs_with_token(&self) -> Vec<GasLogWithToken> {
        self.gas_logs.lock().await.with_token.clone()
    }

    async fn collect(&self, network: &Network, from_block: u64) -> Result<Collected, RelayError> {
        let provider = network.provider()?;
        let latest = provider.get_block_number().await?;
        if from_block > latest {
            return Ok(Collected {
                calls: Vec::new(),
                gas_logs: GasLogs::default(),
                last_block: None,
            });
        }

        // one query for both kinds keeps them in the order the gateway emitted them
        let call_filter = Filter::new()
            .address(network.gateway.into_address())
            .event_signature(vec![
                ILocalGateway::ContractCall::SIGNATURE_HASH,
                ILocalGateway::ContractCallWithToken::SIGNATURE_HASH,
            ])
            .from_block(from_block)
            .to_block(latest);
        let mut calls = Vec::new();
        for log in provider.get_logs(&call_filter).await? {
            let command_id = log_id_for(&network.name, &log)?;
            let source_tx_hash = log.transaction_hash.unwrap_or_default();
            let source_event_index = log.log_index.unwrap_or_default();

            let with_token =
                log.topic0() == Some(&ILocalGateway::ContractCallWithToken::SIGNATURE_HASH);
            let call = if with_token {
                let event = log.log_decode::<ILocalGateway::ContractCallWithToken>()?.inner.data;
                PendingCall {
                    command_id,
                    source_chain: network.name.clone(),
                    source_address: event.sender,
                    destination_chain: event.destinationChain,
                    destination_contract_address: event.destinationContractAddress,
                    payload_hash: event.payloadHash,
                    payload: event.payload,
                    source_tx_hash,
                    source_event_index,
                    token: Some(TokenTransfer { symbol: event.symbol, amount: event.amount }),
                }
            } else {
                let event = log.log_decode::<ILocalGateway::ContractCall>()?.inner.data;
                PendingCall {
                    command_id,
                    source_chain: network.name.clone(),
                    source_address: event.sender,
                    destination_chain: event.destinationChain,
                    destination_contract_address: event.destinationContractAddress,
                    payload_hash: event.payloadHash,
                    payload: event.payload,
                    source_tx_hash,
                    source_event_index,
                    token: None,
                }
            };
            calls.push(call);
        }

        let gas_filter = Filter::new()
            .address(network.gas_receiver.into_address())
            .event_signature(IGasReceiver::NativeGasPaidForContractCall::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(latest);
        let mut gas_logs = GasLogs::default();
        for log in provider.get_logs(&gas_filter).await? {
            let tx_hash = log.transaction_hash;
            let event = log.log_decode::<IGasReceiver::NativeGasPaidForContractCall>()?.inner.data;

            gas_logs.plain.push(GasLog {
                source_chain: network.name.clone(),
                source_address: event.sourceAddress,
                destination_chain: event.destinationChain,
                destination_address: event.destinationAddress,
                payload_hash: event.payloadHash,
                gas_fee_amount: event.gasFeeAmount,
                refund_address: event.refundAddress,
                tx_hash,
            });
        }

        let token_gas_filter = Filter::new()
            .address(network.gas_receiver.into_address())
            .event_signature(IGasReceiver::NativeGasPaidForContractCallWithToken::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(latest);
        for log in provider.get_logs(&token_gas_filter).await? {
            let tx_hash = log.transaction_hash;
            let event =
                log.log_decode::<IGasReceiver::NativeGasPaidForContractCallWithToken>()?.inner.data;

            gas_logs.with_token.push(GasLogWithToken {
                source_chain: network.name.clone(),
                source_address: event.sourceAddress,
                destination_chain: event.destinationChain,
                destination_address: event.destinationAddress,
                payload_hash: event.payloadHash,
                symbol: event.symbol,
                amount: event.amount,
                gas_fee_amount: event.gasFeeAmount,
                refund_address: event.refundAddress,
                tx_hash,
            });
        }

        Ok(Collected { calls, gas_logs, last_block: Some(latest) })
    }

    /// Approves every call in one batch on `destination`, then executes them one by one.
    async fn relay_to(
        &self,
        destination: &Network,
        calls: Vec<PendingCall>,
        gas_logs: &GasLogs,
        data: &mut RelayData,
    ) {
        let mut approvable = Vec::new();
        for call in calls {
            let gas_paid = paid_gas(gas_logs, &call);
            match call.destination_contract() {
                Some(contract) => approvable.push((call, contract)),
                None => {
                    let reason = format!(
                        "{} is not a valid destination address",
                        call.destination_contract_address
                    );
                    data.calls.insert(
                        call.command_id,
                        RelayedCall::new(&call, gas_paid, RelayOutcome::Failed { reason }),
                    );
                }
            }
        }

        if approvable.is_empty() {
            return;
        }

        if let Err(e) = self.approve(destination, &approvable).await {
            error!("Approving {} calls on {} failed: {}", approvable.len(), destination.name, e);
            for (call, _) in &approvable {
                let outcome = RelayOutcome::Failed { reason: format!("approval failed: {}", e) };
                data.calls.insert(
                    call.command_id,
                    RelayedCall::new(call, paid_gas(gas_logs, call), outcome),
                );
            }
            return;
        }

        for (call, contract) in &approvable {
            let outcome = match self.execute(destination, call, *contract).await {
                Ok(tx_hash) => RelayOutcome::Executed { tx_hash },
                Err(e) => {
                    warn!("Executing {} on {} failed: {}", call.command_id, destination.name, e);
                    RelayOutcome::Failed { reason: e.to_string() }
                }
            };
            data.calls
                .insert(call.command_id, RelayedCall::new(call, paid_gas(gas_logs, call), outcome));
        }
    }

    async fn approve(
        &self,
        destination: &Network,
        calls: &[(PendingCall, Address)],
    ) -> Result<TxHash, RelayError> {
        let batch = approve_batch_data(destination.chain_id, calls);
        let input = get_signed_execute_input(&batch, destination.wallets.operator()).await?;

        let provider = destination.wallet_provider(destination.wallets.relayer())?;
        let gateway = ILocalGateway::new(destination.gateway.into_address(), provider);
        let receipt = gateway.execute(input).send().await?.get_receipt().await?;
        if !receipt.status() {
            return Err(RelayError::Reverted(format!("gateway execute on {}", destination.name)));
        }

        Ok(receipt.transaction_hash)
    }

    async fn execute(
        &self,
        destination: &Network,
        call: &PendingCall,
        contract: Address,
    ) -> Result<TxHash, RelayError> {
        let provider = destination.wallet_provider(destination.wallets.relayer())?;
        let executable = IExecutable::new(contract, provider);
        let pending = match &call.token {
            Some(token) => {
                executable
                    .executeWithToken(
                        call.command_id,
                        call.source_chain.clone(),
                        call.source_address_string(),
                        call.payload.clone(),
                        token.symbol.clone(),
                        token.amount,
                    )
                    .send()
                    .await?
            }
            None => {
                executable
                    .execute(
                        call.command_id,
                        call.source_chain.clone(),
                        call.source_address_string(),
                        call.payload.clone(),
                    )
                    .send()
                    .await?
            }
        };
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(RelayError::Reverted(format!("execute on {}", contract)));
        }

        Ok(receipt.transaction_hash)
    }
}

fn paid_gas(gas_logs: &GasLogs, call: &PendingCall) -> Option<U256> {
    let paid: Vec<U256> = gas_logs
        .plain
        .iter()
        .filter(|log| log.pays_for(call))
        .map(|log| log.gas_fee_amount)
        .chain(
            gas_logs.with_token.iter().filter(|log| log.pays_for(call)).map(|log| log.gas_fee_amount),
        )
        .collect();
    if paid.is_empty() {
        None
    } else {
        Some(paid.into_iter().fold(U256::ZERO, |total, amount| total.saturating_add(amount)))
    }
}

#[async_trait]
impl Relayer for GatewayRelayer {
    async fn relay(&self) -> Result<RelayData, RelayError> {
        let networks = self.registry.all().await;

        // read everything first so a failing node does not lose calls already read elsewhere
        let mut next_cursors = HashMap::new();
        let mut pending = Vec::new();
        let mut new_gas_logs = GasLogs::default();
        {
            let cursors = self.cursors.lock().await;
            for network in &networks {
                let from_block = cursors
                    .get(&network.name)
                    .map(|last| last + 1)
                    .unwrap_or(network.start_block);
                let collected = self.collect(network, from_block).await?;
                if let Some(last_block) = collected.last_block {
                    next_cursors.insert(network.name.clone(), last_block);
                }
                pending.extend(collected.calls);
                new_gas_logs.extend(collected.gas_logs);
            }
        }
        self.cursors.lock().await.extend(next_cursors);

        let gas_logs = {
            let mut stored = self.gas_logs.lock().await;
            stored.extend(new_gas_logs);
            stored.clone()
        };

        let mut data = RelayData::default();
        if pending.is_empty() {
            return Ok(data);
        }

        info!("Relaying {} contract calls", pending.len());
        for (destination_chain, calls) in group_by_destination(pending) {
            match networks.iter().find(|network| network.name == destination_chain) {
                Some(destination) => self.relay_to(destination, calls, &gas_logs, &mut data).await,
                None => warn!(
                    "Skipping {} calls to {}, no such network is running",
                    calls.len(),
                    destination_chain
                ),
            }
        }

        Ok(data)
    }

    async fn reset(&self) {
        self.gas_logs.lock().await.clear();
        self.cursors.lock().await.clear();
    }
}
