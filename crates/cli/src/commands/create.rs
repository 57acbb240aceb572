use std::{path::PathBuf, str::FromStr, sync::Arc};

use alloy::primitives::{U256, utils::parse_ether};
use localnet_core::{
    CreateLocalOptions, common_types::EvmAddress, create_and_export, network::AnvilNetworkFactory,
};

use crate::{
    cli_interface::ExportArgs,
    commands::error::ExportCommandError,
    console::{print_exported_chains, print_success_message},
    project_location::ProjectLocation,
};

/// The parts of [`ExportArgs`] that override the config, already parsed.
#[derive(Debug, Default, PartialEq)]
pub struct ExportOverrides {
    pub port: Option<u16>,
    pub relay_interval: Option<u64>,
    pub accounts_to_fund: Option<Vec<EvmAddress>>,
    pub fund_amount: Option<U256>,
    pub chain_output_path: Option<PathBuf>,
}

impl TryFrom<&ExportArgs> for ExportOverrides {
    type Error = ExportCommandError;

    fn try_from(args: &ExportArgs) -> Result<Self, Self::Error> {
        let accounts_to_fund = if args.fund.is_empty() {
            None
        } else {
            let accounts = args
                .fund
                .iter()
                .map(|address| {
                    EvmAddress::from_str(address)
                        .map_err(|_| ExportCommandError::InvalidAddress(address.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Some(accounts)
        };

        let fund_amount = match &args.fund_amount {
            Some(amount) => Some(
                parse_ether(amount).map_err(|_| ExportCommandError::InvalidAmount(amount.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            port: args.port,
            relay_interval: args.relay_interval_ms,
            accounts_to_fund,
            fund_amount,
            chain_output_path: args.output.as_ref().map(PathBuf::from),
        })
    }
}

pub async fn handle_create(
    chains: &Option<Vec<String>>,
    args: &ExportArgs,
    project_location: &ProjectLocation,
) -> Result<(), ExportCommandError> {
    let config = project_location.config(false)?;
    let overrides = ExportOverrides::try_from(args)?;

    let mut options: CreateLocalOptions = config.create;
    if chains.is_some() {
        options.chains = chains.clone();
    }
    options.port = overrides.port.or(options.port);
    options.relay_interval = overrides.relay_interval.or(options.relay_interval);
    options.accounts_to_fund = overrides.accounts_to_fund.or(options.accounts_to_fund);
    options.fund_amount = overrides.fund_amount.or(options.fund_amount);
    options.chain_output_path = overrides.chain_output_path.or(options.chain_output_path);

    let factory = Arc::new(AnvilNetworkFactory::new(&config.artifacts)?);
    let session = create_and_export(options, factory).await?;

    let output = session.chain_output_path().display().to_string();
    print_exported_chains(session.chains(), &output);

    session.wait_for_shutdown().await?;
    print_success_message("Stopped every network.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_args_override_nothing() {
        let overrides = ExportOverrides::try_from(&ExportArgs::default()).unwrap();
        assert_eq!(overrides, ExportOverrides::default());
    }

    #[test]
    fn parses_accounts_and_ether_amounts() {
        let args = ExportArgs {
            fund: vec!["0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string()],
            fund_amount: Some("1.5".to_string()),
            output: Some("./chains.json".to_string()),
            ..Default::default()
        };

        let overrides = ExportOverrides::try_from(&args).unwrap();

        assert_eq!(overrides.accounts_to_fund.map(|accounts| accounts.len()), Some(1));
        assert_eq!(overrides.fund_amount, Some(U256::from(1_500_000_000_000_000_000u128)));
        assert_eq!(overrides.chain_output_path, Some(PathBuf::from("./chains.json")));
    }

    #[test]
    fn rejects_bad_input() {
        let args = ExportArgs { fund: vec!["0x1234".to_string()], ..Default::default() };
        assert!(matches!(
            ExportOverrides::try_from(&args),
            Err(ExportCommandError::InvalidAddress(_))
        ));

        let args = ExportArgs { fund_amount: Some("lots".to_string()), ..Default::default() };
        assert!(matches!(
            ExportOverrides::try_from(&args),
            Err(ExportCommandError::InvalidAmount(_))
        ));
    }
}
