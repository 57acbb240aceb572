use std::path::PathBuf;

use localnet_core::{CONFIG_FILE_NAME, LocalnetConfig, read};

use crate::commands::error::ProjectLocationError;

#[derive(Debug, Clone)]
pub struct ProjectLocation {
    project_dir: PathBuf,
}

impl ProjectLocation {
    pub fn new(project_dir: PathBuf) -> Self {
        Self { project_dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE_NAME)
    }

    /// The project config, with its relative paths resolved against the project directory.
    pub fn config(&self, raw_yaml: bool) -> Result<LocalnetConfig, ProjectLocationError> {
        let config = read(&self.config_path(), raw_yaml).map_err(|e| {
            ProjectLocationError::ProjectConfig(format!(
                "Failed to read {}: {}, run `localnet init` to create one",
                self.config_path().display(),
                e
            ))
        })?;
        Ok(config.resolve_paths(&self.project_dir))
    }
}
