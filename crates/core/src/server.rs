use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tracing::{error, info};

use crate::network::NetworkRegistry;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Could not bind the rpc proxy to {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    #[error("Rpc proxy failed: {0}")]
    Serve(std::io::Error),
}

#[derive(Clone)]
struct ProxyState {
    registry: NetworkRegistry,
    client: reqwest::Client,
}

fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn health_check() -> Json<&'static str> {
    Json("healthy")
}

/// Forwards a JSON-RPC request to the node of network `index` and relays its answer verbatim.
async fn forward_rpc(
    State(state): State<ProxyState>,
    Path(index): Path<usize>,
    body: Bytes,
) -> Response {
    let Some(network) = state.registry.get(index).await else {
        return json_error(StatusCode::NOT_FOUND, format!("No network at index {}", index));
    };

    let upstream = match state
        .client
        .post(&network.rpc_url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("Forwarding to {} failed: {}", network.name, e);
            return json_error(StatusCode::BAD_GATEWAY, format!("{} is unreachable", network.name));
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.bytes().await {
        Ok(bytes) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            error!("Reading the answer of {} failed: {}", network.name, e);
            json_error(StatusCode::BAD_GATEWAY, format!("{} answered badly", network.name))
        }
    }
}

/// Routes of the rpc proxy: `POST /{index}` and `GET /health`.
pub fn create_rpc_proxy_routes(registry: NetworkRegistry) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/{index}", post(forward_rpc))
        .with_state(ProxyState { registry, client: reqwest::Client::new() })
}

/// A running rpc proxy.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stops accepting connections and waits for in-flight requests to finish.
    pub async fn stop(mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) => {
                error!("Rpc proxy task panicked: {}", e);
                Ok(())
            }
        }
    }
}

/// Serves every network of `registry` on `port`, network `i` under `http://localhost:{port}/{i}`.
/// Port `0` binds a random free port, see [`ServerHandle::port`].
pub async fn listen(port: u16, registry: NetworkRegistry) -> Result<ServerHandle, ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::Bind(addr, e))?;
    let local_addr = listener.local_addr().map_err(|e| ServerError::Bind(addr, e))?;

    let app = create_rpc_proxy_routes(registry);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .map_err(ServerError::Serve)
    });

    info!("Rpc proxy listening on {}", local_addr);
    Ok(ServerHandle { local_addr, shutdown: Some(shutdown_tx), task })
}
