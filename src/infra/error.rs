use thiserror::Error;

/// Failures raised while bringing infrastructure up, tagged with the
/// operation that failed so startup logs name the step.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database {operation} failed: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(operation: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Database {
            operation,
            message: error.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
