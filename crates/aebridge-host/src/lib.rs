//! # AE Bridge Host
//!
//! A stand-in for After Effects and its script panel, for tests and offline
//! demos of the bridge client:
//! - an HTTP endpoint speaking the panel's `{"to_eval": ...}` protocol
//! - a parser for the ExtendScript subset the client emits
//! - an in-memory project graph with the registry global

#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod registry;
pub mod scene;
pub mod script;
pub mod server;

pub use engine::HostEngine;
pub use error::{HostError, HostResult};
pub use registry::HostRegistry;
pub use scene::{HostValue, ObjRef, Scene};
pub use server::{HostServer, HostServerConfig, RunningHost};

/// Simulated host version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

impl Default for HostServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2000,
            enable_cors: false,
        }
    }
}

/// Start a simulated host on a free local port, for tests
pub fn spawn_ephemeral() -> anyhow::Result<RunningHost> {
    HostServer::new(HostServerConfig {
        port: 0,
        ..Default::default()
    })
    .spawn()
}
