//! Transport channel to the host's remote-evaluation endpoint

use std::{
    io,
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    config::BridgeConfig,
    error::{BridgeError, Result},
};

/// A synchronous request/response channel to the host
pub trait Transport: Send {
    /// Fail with [`BridgeError::TransportUnavailable`] if the host cannot be reached
    fn check_live(&self) -> Result<()>;

    /// Run `code` on the host and return the raw response body
    fn send(&self, code: &str) -> Result<String>;
}

/// Request body understood by the panel endpoint
#[derive(Serialize)]
struct EvalRequest<'a> {
    to_eval: &'a str,
}

/// Wrap code so a host-side exception comes back as data instead of a modal
/// error dialog
pub fn guard(code: &str) -> String {
    format!("try{{\n{code}\n}}catch(e){{e.error=true;ExtendJSON.stringify(e)}}")
}

/// HTTP transport to the CEP panel listening inside After Effects
pub struct HttpTransport {
    client: Client,
    url: String,
    address: String,
    connect_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
            address: config.address(),
            connect_timeout: config.connect_timeout,
        })
    }

    fn unavailable(&self, source: io::Error) -> BridgeError {
        BridgeError::TransportUnavailable {
            address: self.address.clone(),
            source,
        }
    }
}

impl Transport for HttpTransport {
    fn check_live(&self) -> Result<()> {
        let addr = self
            .address
            .to_socket_addrs()
            .map_err(|e| self.unavailable(e))?
            .next()
            .ok_or_else(|| {
                self.unavailable(io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "address did not resolve",
                ))
            })?;

        TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map(|_| ())
            .map_err(|e| self.unavailable(e))
    }

    fn send(&self, code: &str) -> Result<String> {
        let body = EvalRequest {
            to_eval: &guard(code),
        };
        trace!(url = %self.url, "POST {}", body.to_eval);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    self.unavailable(io::Error::new(io::ErrorKind::ConnectionRefused, e))
                } else {
                    BridgeError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text()?;
        debug!(bytes = text.len(), "host responded");
        trace!("response: {text}");
        Ok(text)
    }
}
