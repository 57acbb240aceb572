use thiserror::Error;

use crate::commands::error::{ExportCommandError, InitError};

/// Top-level CLI error that composes all module-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Initialization error: {0}")]
    Init(#[from] InitError),

    #[error("{0}")]
    Export(#[from] ExportCommandError),

    #[error("{0}")]
    HttpGet(#[from] localnet_core::HttpGetError),

    #[error("Wallet operation error: {0}")]
    WalletError(#[from] localnet_core::WalletError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for CliError {
    fn from(err: String) -> Self {
        CliError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::error::ProjectLocationError;

    #[test]
    fn config_errors_surface_through_the_command_that_hit_them() {
        let err: CliError = ExportCommandError::from(ProjectLocationError::ProjectConfig(
            "Can not find yaml".to_string(),
        ))
        .into();

        assert!(matches!(err, CliError::Export(ExportCommandError::ProjectLocation(_))));
        assert_eq!(err.to_string(), "Project configuration error: Can not find yaml");
    }

    #[test]
    fn path_failures_are_internal_errors() {
        let err = CliError::from("Failed to get current directory.".to_string());
        assert_eq!(err.to_string(), "Internal error: Failed to get current directory.");
    }
}
