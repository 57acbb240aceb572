use std::{path::PathBuf, sync::Arc};

use localnet_core::{
    CloneLocalOptions, fork_and_export,
    network::{AnvilNetworkFactory, ChainInfoTables},
};

use crate::{
    cli_interface::ExportArgs,
    commands::{create::ExportOverrides, error::ExportCommandError},
    console::{print_exported_chains, print_success_message},
    project_location::ProjectLocation,
};

pub struct ForkArgs<'a> {
    pub env: &'a Option<String>,
    pub chains: &'a Option<Vec<String>>,
    pub chain_info: &'a Option<String>,
    pub fork_block_number: Option<u64>,
    pub export: &'a ExportArgs,
}

pub async fn handle_fork(
    args: ForkArgs<'_>,
    project_location: &ProjectLocation,
) -> Result<(), ExportCommandError> {
    let config = project_location.config(false)?;
    let overrides = ExportOverrides::try_from(args.export)?;

    let chain_info_path = args
        .chain_info
        .as_ref()
        .map(PathBuf::from)
        .or(config.fork.chain_info_path)
        .ok_or(ExportCommandError::MissingChainInfo)?;
    let tables = ChainInfoTables::from_file(&chain_info_path)?;

    let mut options: CloneLocalOptions = config.fork.options;
    if args.env.is_some() {
        options.env = args.env.clone();
    }
    if args.chains.is_some() {
        options.chains = args.chains.clone();
    }
    if let Some(fork_block_number) = args.fork_block_number {
        let mut network_options = options.network_options.unwrap_or_default();
        network_options.fork_block_number = Some(fork_block_number);
        options.network_options = Some(network_options);
    }
    options.port = overrides.port.or(options.port);
    options.relay_interval = overrides.relay_interval.or(options.relay_interval);
    options.accounts_to_fund = overrides.accounts_to_fund.or(options.accounts_to_fund);
    options.fund_amount = overrides.fund_amount.or(options.fund_amount);
    options.chain_output_path = overrides.chain_output_path.or(options.chain_output_path);

    let factory = Arc::new(AnvilNetworkFactory::new(&config.artifacts)?);
    let session = fork_and_export(options, factory, &tables).await?;

    let output = session.chain_output_path().display().to_string();
    print_exported_chains(session.chains(), &output);

    session.wait_for_shutdown().await?;
    print_success_message("Stopped every fork.");
    Ok(())
}
