use thiserror::Error;

/// Errors raised while talking to the host application
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The liveness probe could not reach the host endpoint
    #[error("Connection to {address} could not be established. Please ensure After Effects is running ({source})")]
    TransportUnavailable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Host endpoint answered with HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The scripting engine raised while running generated source text
    #[error("Host evaluation error: {message}")]
    HostEvaluation {
        message: String,
        name: Option<String>,
        line: Option<i64>,
    },

    /// A descriptor carried a type name missing from the dispatch table
    #[error("Unknown remote type '{0}', the dispatch table must be extended")]
    UnknownRemoteType(String),

    #[error("Expected a {expected} object, host reported '{actual}'")]
    UnexpectedRemoteType { expected: String, actual: String },

    /// Raised client-side before any network call
    #[error("Invalid value: {0}")]
    DomainValidation(String),

    #[error("Index {index} is out of range for a collection of length {length:?}")]
    IndexOutOfRange { index: isize, length: Option<usize> },

    #[error("Expected {expected}, got {actual}")]
    UnexpectedValue { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::DomainValidation(message.into())
    }

    pub fn unexpected_value(expected: &str, actual: impl std::fmt::Display) -> Self {
        Self::UnexpectedValue {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn unexpected_type(expected: &str, actual: &str) -> Self {
        Self::UnexpectedRemoteType {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// True when the failure happened inside the host's scripting engine
    pub fn is_host_error(&self) -> bool {
        matches!(self, Self::HostEvaluation { .. })
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
