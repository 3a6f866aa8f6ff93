use thiserror::Error;

/// Exceptions raised while evaluating a request. They are reported back to
/// the client the way the real engine reports a caught exception.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("{0}")]
    Syntax(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Reference(String),

    /// Generic host-side `Error`, e.g. an invalid argument to a method
    #[error("{0}")]
    Runtime(String),
}

impl HostError {
    pub fn syntax(message: impl Into<String>) -> Self {
        HostError::Syntax(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        HostError::Type(message.into())
    }

    pub fn reference(message: impl Into<String>) -> Self {
        HostError::Reference(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        HostError::Runtime(message.into())
    }

    /// The exception's constructor name
    pub fn name(&self) -> &'static str {
        match self {
            HostError::Syntax(_) => "SyntaxError",
            HostError::Type(_) => "TypeError",
            HostError::Reference(_) => "ReferenceError",
            HostError::Runtime(_) => "Error",
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;
