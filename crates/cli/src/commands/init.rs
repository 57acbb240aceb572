use std::path::Path;

use localnet_core::{CONFIG_FILE_NAME, DEFAULT_CONFIG_YAML, write_file};

use crate::{commands::error::InitError, console::print_success_message};

pub fn handle_init(path: &Path) -> Result<(), InitError> {
    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Err(InitError::AlreadyInitialized(config_path.display().to_string()));
    }

    write_file(&config_path, DEFAULT_CONFIG_YAML)?;

    let gitignore = path.join(".gitignore");
    if !gitignore.exists() {
        write_file(&gitignore, ".env\nlocal.json\n")?;
    }

    print_success_message(&format!(
        "Created {}, point `artifacts` at your compiled contracts before running `localnet create`",
        config_path.display()
    ));
    Ok(())
}
