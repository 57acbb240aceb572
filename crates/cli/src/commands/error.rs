use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectLocationError {
    #[error("Project configuration error: {0}")]
    ProjectConfig(String),
}

/// Errors that can occur during project initialization
#[derive(Error, Debug)]
pub enum InitError {
    #[error("{0} already exists")]
    AlreadyInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration write error: {0}")]
    ConfigWrite(#[from] localnet_core::WriteFileError),
}

/// Errors that can occur while creating or forking networks
#[derive(Error, Debug)]
pub enum ExportCommandError {
    #[error("{0}")]
    ProjectLocation(#[from] ProjectLocationError),

    #[error("Contract artifact error: {0}")]
    Artifact(#[from] localnet_core::contract::ArtifactError),

    #[error("{0}")]
    ChainInfo(#[from] localnet_core::network::ChainInfoError),

    #[error("No chain info file configured, pass --chain-info or set fork.chain_info_path")]
    MissingChainInfo,

    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Invalid ether amount {0}")]
    InvalidAmount(String),

    #[error("{0}")]
    Export(#[from] localnet_core::ExportError),
}
