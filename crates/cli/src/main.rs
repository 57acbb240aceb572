use std::{env, path::PathBuf, str::FromStr};

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::Parser;
use localnet_core::{load_env_from_project_path, setup_info_logger};

use crate::commands::fork::ForkArgs;
use crate::project_location::ProjectLocation;
use crate::{
    cli_interface::{Cli, Commands},
    commands::{accounts, create, fork, get, init, random_id},
    error::CliError,
};

mod cli_interface;
mod commands;
mod console;
use console::print_error_message;

mod error;
mod project_location;

fn resolve_path(override_path: &Option<String>) -> Result<PathBuf, String> {
    let path = match override_path {
        Some(path) => {
            PathBuf::from_str(path).map_err(|_| format!("Invalid path provided: '{}'", path))?
        }
        None => env::current_dir().map_err(|_| "Failed to get current directory.".to_string())?,
    };

    path.canonicalize().map_err(|e| format!("Failed to resolve path '{}': {}", path.display(), e))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    setup_info_logger();

    match &cli.command {
        Commands::Init { path } => {
            let resolved_path = resolve_path(path).inspect_err(|e| print_error_message(e))?;

            init::handle_init(&resolved_path).inspect_err(|e| print_error_message(&e.to_string()))?;
        }
        Commands::Create { path, chains, export } => {
            let resolved_path = resolve_path(path).inspect_err(|e| print_error_message(e))?;
            load_env_from_project_path(&resolved_path);

            let project_location = ProjectLocation::new(resolved_path);
            create::handle_create(chains, export, &project_location)
                .await
                .inspect_err(|e| print_error_message(&e.to_string()))?;
        }
        Commands::Fork { path, env, chains, chain_info, fork_block_number, export } => {
            let resolved_path = resolve_path(path).inspect_err(|e| print_error_message(e))?;
            load_env_from_project_path(&resolved_path);

            let project_location = ProjectLocation::new(resolved_path);
            let args = ForkArgs {
                env,
                chains,
                chain_info,
                fork_block_number: *fork_block_number,
                export,
            };
            fork::handle_fork(args, &project_location)
                .await
                .inspect_err(|e| print_error_message(&e.to_string()))?;
        }
        Commands::Accounts { count, seed } => {
            accounts::handle_accounts(*count, seed)?;
        }
        Commands::RandomId => {
            random_id::handle_random_id();
        }
        Commands::Get { url } => {
            get::handle_get(url).await.inspect_err(|e| print_error_message(&e.to_string()))?;
        }
    }

    Ok(())
}
