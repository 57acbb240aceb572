use std::{fs, fs::File, io::Write, path::Path};

use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum WriteFileError {
    #[error("Could not create dir: {0}")]
    CouldNotCreateDir(std::io::Error),

    #[error("Could not write to the file: {0}")]
    CouldNotWrite(std::io::Error),

    #[error("Could not create the file: {0}")]
    CouldNotCreateFile(std::io::Error),

    #[error("Could not serialize to json: {0}")]
    CouldNotSerialize(#[from] serde_json::Error),

    #[error("Could not remove the file: {0}")]
    CouldNotRemove(std::io::Error),
}

fn create_parent_dirs(path: &Path) -> Result<(), WriteFileError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(WriteFileError::CouldNotCreateDir)?;
        }
    }
    Ok(())
}

/// Writes `contents` to `path`, creating parent directories and trimming trailing whitespace
/// from every line.
pub fn write_file(path: &Path, contents: &str) -> Result<(), WriteFileError> {
    create_parent_dirs(path)?;

    let cleaned_contents: String =
        contents.lines().map(|line| line.trim_end()).collect::<Vec<&str>>().join("\n");

    let mut file = File::create(path).map_err(WriteFileError::CouldNotCreateFile)?;
    file.write_all(cleaned_contents.as_bytes()).map_err(WriteFileError::CouldNotWrite)?;
    Ok(())
}

/// Serializes `data` as JSON indented with two spaces, terminated by a single `\n`, and writes
/// it to `path`. Parent directories are created when missing.
///
/// # Example
/// ```rust,no_run
/// use std::path::Path;
/// use localnet_core::set_json;
///
/// set_json(&serde_json::json!({ "name": "Avalanche" }), Path::new("out/local.json"))?;
/// # Ok::<(), localnet_core::WriteFileError>(())
/// ```
pub fn set_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), WriteFileError> {
    create_parent_dirs(path)?;

    let mut contents = serde_json::to_string_pretty(data)?;
    contents.push('\n');

    let mut file = File::create(path).map_err(WriteFileError::CouldNotCreateFile)?;
    file.write_all(contents.as_bytes()).map_err(WriteFileError::CouldNotWrite)?;
    Ok(())
}

/// Removes `path`, treating an already missing file as success.
pub fn remove_file_if_exists(path: &Path) -> Result<(), WriteFileError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WriteFileError::CouldNotRemove(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_json_uses_two_space_indent_and_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");

        set_json(&serde_json::json!([{ "name": "Fantom" }]), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[\n  {\n    \"name\": \"Fantom\"\n  }\n]\n");
    }

    #[test]
    fn write_file_trims_trailing_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("localnet.yaml");

        write_file(&path, "create:   \n  port: 8500  \n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "create:\n  port: 8500");
    }

    #[test]
    fn remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.json");

        assert!(remove_file_if_exists(&path).is_ok());

        fs::write(&path, "{}").unwrap();
        remove_file_if_exists(&path).unwrap();
        assert!(!path.exists());
    }
}
