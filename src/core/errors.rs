/// Errors surfaced by the simulation engine and its transport.
///
/// Every variant is recoverable: the caller fixes the request (or the
/// deployment settings) and tries again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("encoding failure: {0}")]
    EncodingFailure(String),

    #[error("thread pool unavailable: {0}")]
    ThreadPool(String),
}

impl SimulationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SimulationError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidConfiguration { .. } | SimulationError::MalformedInput(_)
        )
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;
