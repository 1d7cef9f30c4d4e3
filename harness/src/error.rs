use std::time::Duration;

use thiserror::Error;

use crate::engine::BodyHandle;

/// Top-level error type for the harness.
///
/// Only startup and the bounded results poll can fail. Degenerate timesteps,
/// failed geometry queries and missing visual bindings are absorbed where they
/// happen and never reach this type.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Failed to load mesh `{name}`: {reason}")]
    MeshLoad { name: String, reason: String },

    #[error("Simulation results not ready after {waited:?}")]
    SimulationTimeout { waited: Duration },

    #[error("Body {0:?} is not registered with this scene")]
    UnknownBody(BodyHandle),
}

impl HarnessError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
