use std::path::Path;

use dotenvy::{dotenv, from_path};

/// Loads `.env` from the project directory, falling back to the usual lookup from the current
/// working directory when the project has none.
pub fn load_env_from_project_path(project_path: &Path) {
    if from_path(project_path.join(".env")).is_err() {
        dotenv().ok();
    }
}
