use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::error;

use crate::network::types::Network;

/// The networks of one export session, in creation order. The position of a network is the
/// index it is served under by the rpc proxy.
#[derive(Clone, Default)]
pub struct NetworkRegistry {
    networks: Arc<RwLock<Vec<Network>>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `network` and returns its index.
    pub async fn push(&self, network: Network) -> usize {
        let mut networks = self.networks.write().await;
        networks.push(network);
        networks.len() - 1
    }

    pub async fn get(&self, index: usize) -> Option<Network> {
        self.networks.read().await.get(index).cloned()
    }

    pub async fn find_by_name(&self, name: &str) -> Option<Network> {
        self.networks.read().await.iter().find(|network| network.name == name).cloned()
    }

    pub async fn all(&self) -> Vec<Network> {
        self.networks.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.networks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.networks.read().await.is_empty()
    }

    /// Stops every node and empties the registry. Failures are logged so one stuck node does
    /// not keep the others alive.
    pub async fn stop_all(&self) {
        let networks = std::mem::take(&mut *self.networks.write().await);
        for network in networks {
            if let Err(e) = network.stop().await {
                error!("Failed to stop {}: {}", network.name, e);
            }
        }
    }
}
