use std::{net::TcpListener, process::Stdio, time::Duration};

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::info;

#[derive(Error, Debug)]
pub enum AnvilError {
    #[error("Anvil is not available, please install foundry: https://book.getfoundry.sh/ ({0})")]
    NotInstalled(String),

    #[error("Failed to start anvil: {0}")]
    Spawn(std::io::Error),

    #[error("Could not find a free local port: {0}")]
    NoFreePort(std::io::Error),

    #[error("Anvil on port {port} did not answer after {attempts} attempts")]
    NotReady { port: u16, attempts: u32 },

    #[error("Failed to stop anvil: {0}")]
    Stop(std::io::Error),
}

/// How a single anvil node should be launched.
#[derive(Debug, Clone, Default)]
pub struct AnvilConfig {
    /// `None` picks a free port.
    pub port: Option<u16>,
    /// Ignored when forking, the fork keeps the remote chain id.
    pub chain_id: Option<u64>,
    pub fork_url: Option<String>,
    pub fork_block_number: Option<u64>,
    /// Passed through to anvil untouched.
    pub extra_args: Vec<String>,
}

impl AnvilConfig {
    fn args(&self, port: u16) -> Vec<String> {
        let mut args = vec![
            "--host".to_string(),
            "127.0.0.1".to_string(),
            "--port".to_string(),
            port.to_string(),
            "--accounts".to_string(),
            "1".to_string(),
        ];

        match &self.fork_url {
            Some(fork_url) => {
                args.push("--fork-url".to_string());
                args.push(fork_url.clone());
                if let Some(block_number) = self.fork_block_number {
                    args.push("--fork-block-number".to_string());
                    args.push(block_number.to_string());
                }
            }
            None => {
                if let Some(chain_id) = self.chain_id {
                    args.push("--chain-id".to_string());
                    args.push(chain_id.to_string());
                }
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// A running anvil child process. The process is killed when this is dropped.
pub struct AnvilInstance {
    port: u16,
    process: Option<Child>,
}

impl AnvilInstance {
    pub async fn spawn(config: &AnvilConfig) -> Result<Self, AnvilError> {
        let output = Command::new("anvil")
            .arg("--version")
            .output()
            .await
            .map_err(|e| AnvilError::NotInstalled(e.to_string()))?;
        if !output.status.success() {
            return Err(AnvilError::NotInstalled(String::from_utf8_lossy(&output.stderr).into()));
        }

        let port = match config.port {
            Some(port) => port,
            None => free_port()?,
        };

        info!("Starting anvil on port {}", port);

        let child = Command::new("anvil")
            .env("FOUNDRY_DISABLE_NIGHTLY_WARNING", "true")
            .args(config.args(port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(AnvilError::Spawn)?;

        let instance = Self { port, process: Some(child) };
        // forks download state on the first requests, give them longer
        let attempts = if config.fork_url.is_some() { 60 } else { 20 };
        instance.wait_until_ready(attempts).await?;

        info!("Anvil is ready on port {}", port);
        Ok(instance)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn rpc_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    async fn wait_until_ready(&self, attempts: u32) -> Result<(), AnvilError> {
        let client = reqwest::Client::new();
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_chainId",
            "params": [],
            "id": 1
        });

        for attempt in 1..=attempts {
            match client.post(self.rpc_url()).json(&request_body).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    info!("Attempt {}/{}: anvil answered {}", attempt, attempts, response.status())
                }
                Err(_) => {}
            }

            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        Err(AnvilError::NotReady { port: self.port, attempts })
    }

    pub async fn stop(&mut self) -> Result<(), AnvilError> {
        if let Some(mut child) = self.process.take() {
            info!("Stopping anvil on port {}", self.port);
            child.kill().await.map_err(AnvilError::Stop)?;
            child.wait().await.map_err(AnvilError::Stop)?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }
}

impl Drop for AnvilInstance {
    fn drop(&mut self) {
        if let Some(mut child) = self.process.take() {
            let _ = child.start_kill();
        }
    }
}

fn free_port() -> Result<u16, AnvilError> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(AnvilError::NoFreePort)?;
    let port = listener.local_addr().map_err(AnvilError::NoFreePort)?.port();
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_chain_args_set_the_chain_id() {
        let config = AnvilConfig { chain_id: Some(2500), ..Default::default() };
        let args = config.args(9000);

        assert!(args.windows(2).any(|pair| pair == ["--port", "9000"]));
        assert!(args.windows(2).any(|pair| pair == ["--chain-id", "2500"]));
        assert!(!args.iter().any(|arg| arg == "--fork-url"));
    }

    #[test]
    fn fork_args_ignore_the_chain_id() {
        let config = AnvilConfig {
            chain_id: Some(2500),
            fork_url: Some("https://rpc.example".to_string()),
            fork_block_number: Some(19_000_000),
            extra_args: vec!["--no-rate-limit".to_string()],
            ..Default::default()
        };
        let args = config.args(9001);

        assert!(args.windows(2).any(|pair| pair == ["--fork-url", "https://rpc.example"]));
        assert!(args.windows(2).any(|pair| pair == ["--fork-block-number", "19000000"]));
        assert!(!args.iter().any(|arg| arg == "--chain-id"));
        assert_eq!(args.last().map(String::as_str), Some("--no-rate-limit"));
    }

    #[test]
    fn free_port_is_nonzero() {
        assert_ne!(free_port().unwrap(), 0);
    }
}
