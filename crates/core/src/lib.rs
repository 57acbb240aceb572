mod logger;
pub use logger::{mark_shutdown_started, setup_info_logger, setup_logger};
pub mod contract;
pub mod export;
pub use export::{
    create_and_export, destroy_exported, fork_and_export, ChainExportInfo, CloneLocalOptions,
    CreateLocalOptions, ExportError, ExportSession, NetworkSetupHook,
};
pub mod network;
mod provider;
pub use provider::{create_retry_client, create_wallet_client, RetryClientError};
pub mod relay;
mod server;
pub use server::{create_rpc_proxy_routes, listen, ServerError, ServerHandle};
mod shared;
pub use shared::{
    common_types,
    utils::{
        big_number_to_number, format_wei_to_eth, http_get, log_id, log_id_for, random_id,
        ConversionError, HttpGetError, LogIdError,
    },
};
mod environment;
mod file;
pub mod signing;
pub use signing::{get_signed_execute_input, get_signed_multisig_execute_input};
pub mod wallet;
pub use wallet::{default_accounts, DefaultAccount, WalletError, WalletRole};
mod yaml;

pub use contract::{deploy_contract, ContractArtifact, DeployOptions};
pub use environment::load_env_from_project_path;
pub use file::{remove_file_if_exists, set_json, write_file, WriteFileError};
pub use tracing::{error as localnet_error, info as localnet_info};
pub use yaml::{
    read, ForkConfig, LocalnetConfig, ReadYamlError, CONFIG_FILE_NAME, DEFAULT_CONFIG_YAML,
};
