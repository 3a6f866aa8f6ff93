//! HTTP endpoint emulating the panel that evaluates scripts inside the host
//!
//! `POST /` with `{"to_eval": "<code>"}` answers with the evaluation result
//! as plain text, exactly one evaluation at a time.

use std::{
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use axum::{extract::State, routing::post, Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::engine::HostEngine;

/// Simulated host configuration
#[derive(Debug, Clone)]
pub struct HostServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind; 0 picks a free one
    pub port: u16,
    /// Enable CORS, for browser-based clients
    pub enable_cors: bool,
}

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// The engine behind a mutex: the real host runs one script at a time
    pub engine: Arc<Mutex<HostEngine>>,
}

/// Request body sent by the bridge client
#[derive(Deserialize)]
pub struct EvalRequest {
    to_eval: String,
}

/// The simulated host endpoint
pub struct HostServer {
    config: HostServerConfig,
    state: AppState,
}

impl HostServer {
    pub fn new(config: HostServerConfig) -> Self {
        Self {
            config,
            state: AppState {
                engine: Arc::new(Mutex::new(HostEngine::new())),
            },
        }
    }

    /// Shared handle on the engine, for inspection
    pub fn engine(&self) -> Arc<Mutex<HostEngine>> {
        self.state.engine.clone()
    }

    /// Bind the configured address and serve until the process ends
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse::<SocketAddr>()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "simulated host listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Serve on a background thread with its own runtime. The server stops
    /// when the returned handle is dropped.
    pub fn spawn(self) -> Result<RunningHost> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = StdTcpListener::bind(&addr).with_context(|| format!("binding {addr}"))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let thread = thread::Builder::new()
            .name(format!("aebridge-host-{}", local_addr.port()))
            .spawn(move || {
                runtime.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => listener,
                        Err(e) => {
                            tracing::error!("cannot adopt listener: {e}");
                            return;
                        }
                    };
                    let shutdown = async {
                        let _ = shutdown_rx.await;
                    };
                    if let Err(e) = axum::serve(listener, router)
                        .with_graceful_shutdown(shutdown)
                        .await
                    {
                        tracing::error!("simulated host stopped: {e}");
                    }
                });
            })?;

        info!(addr = %local_addr, "simulated host running in background");
        Ok(RunningHost {
            addr: local_addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    fn router(self) -> Router {
        let mut router = Router::new()
            .route("/", post(evaluate_handler))
            .with_state(self.state);

        if self.config.enable_cors {
            router = router.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));
        }

        router.layer(TraceLayer::new_for_http())
    }
}

/// A simulated host serving on a background thread
pub struct RunningHost {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningHost {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl Drop for RunningHost {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Evaluate one script
async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvalRequest>,
) -> String {
    debug!(bytes = request.to_eval.len(), "evaluate");
    state.engine.lock().handle(&request.to_eval)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;

    async fn post(router: Router, body: serde_json::Value) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_evaluate_endpoint() {
        let server = HostServer::new(HostServerConfig::default());
        let (status, body) = post(
            server.router(),
            serde_json::json!({
                "to_eval": "try{\napp.version;\n}catch(e){e.error=true;ExtendJSON.stringify(e)}"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "24.0.0");
    }

    #[tokio::test]
    async fn test_rejects_malformed_body() {
        let server = HostServer::new(HostServerConfig::default());
        let (status, _) = post(server.router(), serde_json::json!({"code": "app;"})).await;
        assert!(status.is_client_error());
    }
}
