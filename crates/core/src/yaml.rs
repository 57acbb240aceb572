use std::{
    env,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::{CloneLocalOptions, CreateLocalOptions};
use crate::localnet_error;
use crate::network::LocalContractArtifacts;

pub const CONFIG_FILE_NAME: &str = "localnet.yaml";

/// The `fork` section: fork options plus where the deployed chain table lives.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ForkConfig {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chain_info_path: Option<PathBuf>,
    #[serde(flatten)]
    pub options: CloneLocalOptions,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LocalnetConfig {
    #[serde(default)]
    pub create: CreateLocalOptions,
    #[serde(default)]
    pub fork: ForkConfig,
    pub artifacts: LocalContractArtifacts,
}

impl LocalnetConfig {
    /// Paths in the config are relative to the directory holding it.
    pub fn resolve_paths(mut self, project_path: &Path) -> Self {
        let absolute = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                project_path.join(path)
            }
        };

        self.artifacts = LocalContractArtifacts {
            gateway: absolute(self.artifacts.gateway),
            gas_receiver: absolute(self.artifacts.gas_receiver),
            const_address_deployer: absolute(self.artifacts.const_address_deployer),
        };
        self.fork.chain_info_path = self.fork.chain_info_path.map(absolute);
        // an empty output path means "use the default", keep it empty
        let output = |path: Option<PathBuf>| {
            path.map(|path| if path.as_os_str().is_empty() { path } else { absolute(path) })
        };
        self.create.chain_output_path = output(self.create.chain_output_path);
        self.fork.options.chain_output_path = output(self.fork.options.chain_output_path);
        self
    }
}

/// Written by `localnet init`.
pub const DEFAULT_CONFIG_YAML: &str = r#"# local networks created with `localnet create`
create:
  chain_output_path: ./local.json
  chains: [Moonbeam, Avalanche, Fantom, Ethereum, Polygon]
  port: 8500
  relay_interval: 2000
  # accounts_to_fund:
  #   - "0x..."
  # fund_amount: "100000000000000000000"

# forks of live chains with `localnet fork`
fork:
  env: mainnet
  chain_info_path: ./chain-info.json
  chains: []
  # fork_block_number pins every fork, anvil_args are passed to anvil as is
  # network_options:
  #   fork_block_number: 19000000
  #   anvil_args: ["--no-rate-limit"]

# compiled contracts deployed on every network, ${VAR} placeholders are read from the environment
artifacts:
  gateway: ./artifacts/LocalGateway.json
  gas_receiver: ./artifacts/GasReceiver.json
  const_address_deployer: ./artifacts/ConstAddressDeployer.json
"#;

#[derive(Error, Debug)]
pub enum ReadYamlError {
    #[error("Can not find yaml")]
    CanNotFindYaml,

    #[error("Can not read yaml")]
    CanNotReadYaml,

    #[error("Config is invalid yaml and does not match the struct - {0}")]
    ConfigInvalidYaml(String),

    #[error("Environment variable {0} not found")]
    EnvironmentVariableNotFound(String),
}

/// Substitutes `${VAR}` placeholders with environment variables.
fn substitute_env_variables(contents: &str) -> Result<String, ReadYamlError> {
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ReadYamlError::ConfigInvalidYaml(e.to_string()))?;

    let mut missing = None;
    let result = re.replace_all(contents, |caps: &Captures| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(val) => val,
            Err(_) => {
                localnet_error!("Environment variable {} not found", var_name);
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(ReadYamlError::EnvironmentVariableNotFound(var_name)),
        None => Ok(result.into_owned()),
    }
}

/// Reads and parses the localnet configuration YAML file.
pub fn read(file_path: &Path, raw_yaml: bool) -> Result<LocalnetConfig, ReadYamlError> {
    let mut file = File::open(file_path).map_err(|_| ReadYamlError::CanNotFindYaml)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|_| ReadYamlError::CanNotReadYaml)?;

    let substituted_contents =
        if raw_yaml { contents } else { substitute_env_variables(&contents)? };

    serde_yaml::from_str(&substituted_contents)
        .map_err(|e| ReadYamlError::ConfigInvalidYaml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn default_config_parses() {
        let config: LocalnetConfig = serde_yaml::from_str(DEFAULT_CONFIG_YAML).unwrap();

        assert_eq!(config.create.port, Some(8500));
        assert_eq!(config.create.chains.as_ref().map(Vec::len), Some(5));
        assert_eq!(config.fork.options.env.as_deref(), Some("mainnet"));
        assert_eq!(config.fork.options.chains, Some(vec![]));
        assert_eq!(config.fork.chain_info_path, Some(PathBuf::from("./chain-info.json")));
        assert_eq!(config.artifacts.gateway, PathBuf::from("./artifacts/LocalGateway.json"));
    }

    #[test]
    fn substitutes_environment_variables() {
        let dir = tempfile::tempdir().unwrap();
        env::set_var("LOCALNET_TEST_ARTIFACTS", "/opt/artifacts");
        let path = write_config(
            dir.path(),
            r#"
artifacts:
  gateway: ${LOCALNET_TEST_ARTIFACTS}/Gateway.json
  gas_receiver: ${LOCALNET_TEST_ARTIFACTS}/GasReceiver.json
  const_address_deployer: ${LOCALNET_TEST_ARTIFACTS}/Deployer.json
"#,
        );

        let config = read(&path, false).unwrap();
        assert_eq!(config.artifacts.gateway, PathBuf::from("/opt/artifacts/Gateway.json"));
        assert!(config.create.chains.is_none());

        let raw = read(&path, true).unwrap();
        assert_eq!(
            raw.artifacts.gateway,
            PathBuf::from("${LOCALNET_TEST_ARTIFACTS}/Gateway.json")
        );
    }

    #[test]
    fn missing_variable_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "artifacts:\n  gateway: ${LOCALNET_TEST_UNSET_VAR}\n");

        match read(&path, false) {
            Err(ReadYamlError::EnvironmentVariableNotFound(name)) => {
                assert_eq!(name, "LOCALNET_TEST_UNSET_VAR")
            }
            _ => panic!("expected a missing variable error"),
        }
    }

    #[test]
    fn missing_file_and_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read(&dir.path().join("nope.yaml"), false),
            Err(ReadYamlError::CanNotFindYaml)
        ));

        let path = write_config(dir.path(), "create: [not, a, map]\n");
        assert!(matches!(read(&path, false), Err(ReadYamlError::ConfigInvalidYaml(_))));
    }

    #[test]
    fn relative_paths_resolve_against_the_project() {
        let config: LocalnetConfig = serde_yaml::from_str(DEFAULT_CONFIG_YAML).unwrap();
        let config = config.resolve_paths(Path::new("/work/project"));

        assert_eq!(
            config.artifacts.gas_receiver,
            PathBuf::from("/work/project/./artifacts/GasReceiver.json")
        );
        assert_eq!(
            config.fork.chain_info_path,
            Some(PathBuf::from("/work/project/./chain-info.json"))
        );
        assert_eq!(
            config.create.chain_output_path,
            Some(PathBuf::from("/work/project/./local.json"))
        );
    }

    #[test]
    fn output_paths_resolve_against_the_project_unless_absolute_or_empty() {
        let yaml = r#"
create:
  chain_output_path: /tmp/local.json
fork:
  chain_output_path: out/fork.json
artifacts:
  gateway: ./artifacts/LocalGateway.json
  gas_receiver: ./artifacts/GasReceiver.json
  const_address_deployer: ./artifacts/ConstAddressDeployer.json
"#;
        let config: LocalnetConfig = serde_yaml::from_str(yaml).unwrap();
        let config = config.resolve_paths(Path::new("/work/project"));

        assert_eq!(config.create.chain_output_path, Some(PathBuf::from("/tmp/local.json")));
        assert_eq!(
            config.fork.options.chain_output_path,
            Some(PathBuf::from("/work/project/out/fork.json"))
        );

        let mut config: LocalnetConfig = serde_yaml::from_str(yaml).unwrap();
        config.create.chain_output_path = Some(PathBuf::new());
        let config = config.resolve_paths(Path::new("/work/project"));
        assert_eq!(config.create.chain_output_path, Some(PathBuf::new()));
    }
}
