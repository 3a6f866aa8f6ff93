use std::time::Duration;

/// Default address of the panel endpoint inside After Effects
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2000;

/// Global through which the host exposes registered objects
pub const REGISTRY_ACCESSOR: &str = "$._pydobe";

/// Client configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Host address of the panel endpoint
    pub host: String,
    /// Port of the panel endpoint
    pub port: u16,
    /// Timeout for the TCP liveness probe
    pub connect_timeout: Duration,
    /// Timeout for one evaluation round trip. `None` blocks until the host answers.
    pub request_timeout: Option<Duration>,
}

impl BridgeConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// `host:port`, as used by the liveness probe
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL of the evaluation endpoint
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(2),
            request_timeout: None,
        }
    }
}
