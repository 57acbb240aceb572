use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{error, info};

use super::{AfterRelay, ChainExportInfo, ExportError};
use crate::file::remove_file_if_exists;
use crate::logger::mark_shutdown_started;
use crate::network::{Network, NetworkRegistry};
use crate::relay::Relayer;
use crate::server::ServerHandle;

/// Relays every `every`, starting one interval from now. A pass that overruns the interval
/// delays the next tick instead of overlapping with it.
pub(crate) fn spawn_relay_loop(
    relayer: Arc<dyn Relayer>,
    every: Duration,
    after_relay: Option<AfterRelay>,
    mut shutdown: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    match relayer.relay().await {
                        Ok(data) => {
                            if !data.is_empty() {
                                info!(
                                    "Relayed {} calls, {} failed",
                                    data.executed(),
                                    data.failed()
                                );
                            }
                            if let Some(after_relay) = &after_relay {
                                after_relay(&data);
                            }
                        }
                        Err(e) => error!("Relay pass failed: {}", e),
                    }
                }
            }
        }
    })
}

/// Everything started by an export: the networks, the rpc proxy and the relay loop.
pub struct ExportSession {
    registry: NetworkRegistry,
    chains: Vec<ChainExportInfo>,
    chain_output_path: PathBuf,
    relayer: Arc<dyn Relayer>,
    server: Option<ServerHandle>,
    relay_task: Option<JoinHandle<()>>,
    relay_shutdown: Option<oneshot::Sender<()>>,
}

impl ExportSession {
    pub(crate) fn new(
        registry: NetworkRegistry,
        chains: Vec<ChainExportInfo>,
        chain_output_path: PathBuf,
        relayer: Arc<dyn Relayer>,
        server: ServerHandle,
        relay_task: JoinHandle<()>,
        relay_shutdown: oneshot::Sender<()>,
    ) -> Self {
        Self {
            registry,
            chains,
            chain_output_path,
            relayer,
            server: Some(server),
            relay_task: Some(relay_task),
            relay_shutdown: Some(relay_shutdown),
        }
    }

    /// The exported chains, in the order they were written to the output file.
    pub fn chains(&self) -> &[ChainExportInfo] {
        &self.chains
    }

    pub async fn networks(&self) -> Vec<Network> {
        self.registry.all().await
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn chain_output_path(&self) -> &Path {
        &self.chain_output_path
    }

    /// Port of the rpc proxy while it runs.
    pub fn port(&self) -> Option<u16> {
        self.server.as_ref().map(ServerHandle::port)
    }

    pub fn is_running(&self) -> bool {
        self.server.is_some() || self.relay_task.is_some()
    }

    /// Stops the relay loop, the rpc proxy and every node, and forgets the relayer's gas logs.
    /// The chain output file is left in place. Calling it again does nothing.
    pub async fn destroy(&mut self) -> Result<(), ExportError> {
        if let Some(relay_shutdown) = self.relay_shutdown.take() {
            let _ = relay_shutdown.send(());
        }
        if let Some(relay_task) = self.relay_task.take() {
            if let Err(e) = relay_task.await {
                error!("Relay loop ended abnormally: {}", e);
            }
        }

        let server_result = match self.server.take() {
            Some(server) => server.stop().await,
            None => Ok(()),
        };

        self.registry.stop_all().await;
        self.relayer.reset().await;

        server_result?;
        Ok(())
    }

    /// Waits for ctrl-c, then removes the chain output file and destroys the session.
    pub async fn wait_for_shutdown(mut self) -> Result<(), ExportError> {
        tokio::signal::ctrl_c().await.map_err(ExportError::Signal)?;
        mark_shutdown_started();
        info!("Shutting down, removing {}", self.chain_output_path.display());

        let removed = remove_file_if_exists(&self.chain_output_path);
        self.destroy().await?;
        removed?;
        Ok(())
    }
}

/// Tears down what an export started. See [`ExportSession::destroy`].
pub async fn destroy_exported(session: &mut ExportSession) -> Result<(), ExportError> {
    session.destroy().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{RelayData, RelayError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRelayer {
        passes: AtomicUsize,
        resets: AtomicUsize,
        failing: bool,
    }

    #[async_trait]
    impl Relayer for CountingRelayer {
        async fn relay(&self) -> Result<RelayData, RelayError> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(RelayError::Reverted("gateway execute on Fantom".to_string()));
            }
            Ok(RelayData::default())
        }

        async fn reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn relay_loop_ticks_until_shut_down() {
        let relayer = Arc::new(CountingRelayer::default());
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_hook = seen.clone();
        let after_relay: AfterRelay = Arc::new(move |_: &RelayData| {
            seen_in_hook.fetch_add(1, Ordering::SeqCst);
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = spawn_relay_loop(
            relayer.clone(),
            Duration::from_millis(100),
            Some(after_relay),
            shutdown_rx,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(relayer.passes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let passes = relayer.passes.load(Ordering::SeqCst);
        assert!(passes >= 3);
        assert_eq!(seen.load(Ordering::SeqCst), passes);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_passes_skip_the_hook_and_keep_ticking() {
        let relayer = Arc::new(CountingRelayer { failing: true, ..Default::default() });
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_hook = seen.clone();
        let after_relay: AfterRelay = Arc::new(move |_: &RelayData| {
            seen_in_hook.fetch_add(1, Ordering::SeqCst);
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = spawn_relay_loop(
            relayer.clone(),
            Duration::from_millis(100),
            Some(after_relay),
            shutdown_rx,
        );

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(relayer.passes.load(Ordering::SeqCst) >= 3);
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn destroy_stops_everything_and_resets_the_relayer() {
        let registry = NetworkRegistry::new();
        let relayer = Arc::new(CountingRelayer::default());
        let server = crate::server::listen(0, registry.clone()).await.unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let relay_task =
            spawn_relay_loop(relayer.clone(), Duration::from_secs(3600), None, shutdown_rx);

        let mut session = ExportSession::new(
            registry,
            Vec::new(),
            PathBuf::from("./local.json"),
            relayer.clone(),
            server,
            relay_task,
            shutdown_tx,
        );
        assert!(session.is_running());
        assert!(session.port().is_some());

        destroy_exported(&mut session).await.unwrap();

        assert!(!session.is_running());
        assert_eq!(session.port(), None);
        assert_eq!(relayer.resets.load(Ordering::SeqCst), 1);
        assert_eq!(relayer.passes.load(Ordering::SeqCst), 0);
    }
}
