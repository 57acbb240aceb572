mod options;
pub use options::{
    default_fund_amount, AfterRelay, ChainExportInfo, CloneLocalOptions, CreateLocalOptions,
    HookError, NetworkSetupHook, DEFAULT_CHAIN_OUTPUT_PATH, DEFAULT_LOCAL_CHAINS, DEFAULT_PORT,
    DEFAULT_RELAY_INTERVAL_MS,
};

mod session;
pub use session::{destroy_exported, ExportSession};

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::info;

use crate::file::{set_json, WriteFileError};
use crate::network::{
    token_metadata, ChainCloneData, ChainInfoError, ChainInfoTables, CreateNetworkError,
    CreateNetworkOptions, ForkNetworkOptions, Network, NetworkError, NetworkFactory,
    NetworkRegistry,
};
use crate::relay::{GatewayRelayer, Relayer};
use crate::server::{listen, ServerError};
use options::ExportSettings;
use session::spawn_relay_loop;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    InvalidEnvironment(#[from] ChainInfoError),

    #[error("{0}")]
    CreateNetwork(#[from] CreateNetworkError),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("Setup hook failed for {network}: {reason}")]
    Callback { network: String, reason: String },

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("Could not write the chain output file: {0}")]
    WriteFile(#[from] WriteFileError),

    #[error("Could not listen for ctrl-c: {0}")]
    Signal(std::io::Error),
}

/// Where the networks of one export come from.
enum ChainSource {
    Create(Vec<String>),
    Fork { chains: Vec<ChainCloneData>, options: ForkNetworkOptions },
}

impl ChainSource {
    fn len(&self) -> usize {
        match self {
            ChainSource::Create(names) => names.len(),
            ChainSource::Fork { chains, .. } => chains.len(),
        }
    }

    async fn start(
        &self,
        index: usize,
        factory: &dyn NetworkFactory,
    ) -> Result<Network, CreateNetworkError> {
        match self {
            ChainSource::Create(names) => {
                let name = &names[index];
                let network = factory
                    .create_network(CreateNetworkOptions {
                        name: name.clone(),
                        seed: Some(name.clone()),
                        ..Default::default()
                    })
                    .await?;

                if network.token_name.is_some() {
                    return Ok(network);
                }
                Ok(match token_metadata(name) {
                    Some(token) => network.with_token(
                        Some(token.token_name.to_string()),
                        Some(token.token_symbol.to_string()),
                    ),
                    None => network,
                })
            }
            ChainSource::Fork { chains, options } => {
                factory.fork_network(&chains[index], options).await
            }
        }
    }
}

/// Creates a fresh local network for every chain name, funds the given accounts on each,
/// serves them behind one rpc proxy, relays between them and writes their details to the
/// chain output file.
pub async fn create_and_export(
    options: CreateLocalOptions,
    factory: Arc<dyn NetworkFactory>,
) -> Result<ExportSession, ExportError> {
    let (chains, settings) = options.resolve();
    export(ChainSource::Create(chains), factory, settings).await
}

/// Like [`create_and_export`], but every network is a fork of a live chain out of `tables`.
pub async fn fork_and_export(
    options: CloneLocalOptions,
    factory: Arc<dyn NetworkFactory>,
    tables: &ChainInfoTables,
) -> Result<ExportSession, ExportError> {
    let (selection, settings) = options.resolve()?;
    let chains = tables.select(selection.env, &selection.chains);
    info!("Forking {} {} chains", chains.len(), selection.env);

    export(ChainSource::Fork { chains, options: selection.network_options }, factory, settings)
        .await
}

async fn start_networks(
    source: &ChainSource,
    factory: &dyn NetworkFactory,
    registry: &NetworkRegistry,
    settings: &ExportSettings,
) -> Result<Vec<ChainExportInfo>, ExportError> {
    let mut chains = Vec::with_capacity(source.len());

    for index in 0..source.len() {
        let network = source.start(index, factory).await?;
        let position = registry.push(network.clone()).await;
        let info = ChainExportInfo::new(&network, settings.port, position);

        for account in &settings.accounts_to_fund {
            network.fund(*account, settings.fund_amount).await?;
        }

        if let Some(callback) = &settings.callback {
            callback.on_network(&network, &info).await.map_err(|e| ExportError::Callback {
                network: network.name.clone(),
                reason: e.to_string(),
            })?;
        }

        info!("{} is ready at {}", info.name, info.rpc);
        chains.push(info);
    }

    Ok(chains)
}

async fn export(
    source: ChainSource,
    factory: Arc<dyn NetworkFactory>,
    settings: ExportSettings,
) -> Result<ExportSession, ExportError> {
    let registry = NetworkRegistry::new();

    let chains = match start_networks(&source, factory.as_ref(), &registry, &settings).await {
        Ok(chains) => chains,
        Err(e) => {
            registry.stop_all().await;
            return Err(e);
        }
    };

    let server = match listen(settings.port, registry.clone()).await {
        Ok(server) => server,
        Err(e) => {
            registry.stop_all().await;
            return Err(e.into());
        }
    };

    let relayer: Arc<dyn Relayer> = Arc::new(GatewayRelayer::new(registry.clone()));
    let (relay_shutdown, relay_shutdown_rx) = oneshot::channel();
    let relay_task = spawn_relay_loop(
        relayer.clone(),
        settings.relay_interval,
        settings.after_relay.clone(),
        relay_shutdown_rx,
    );

    let mut session = ExportSession::new(
        registry,
        chains,
        settings.chain_output_path,
        relayer,
        server,
        relay_task,
        relay_shutdown,
    );

    if let Err(e) = set_json(session.chains(), session.chain_output_path()) {
        session.destroy().await?;
        return Err(e.into());
    }
    info!("Exported {} chains to {}", session.chains().len(), session.chain_output_path().display());

    Ok(session)
}
