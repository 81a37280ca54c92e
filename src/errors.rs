//! Error types for stack composition and hand-off

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{HostnameError, NetworkError, ValidationError};
use crate::graph::GraphError;
use crate::layers::LayerKind;

/// Errors that can occur while composing or submitting a stack
#[derive(Debug, Error)]
pub enum StackError {
    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A declaration input violated an invariant
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Address arithmetic failed
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// DNS name could not be derived
    #[error("DNS name error: {0}")]
    Dns(#[from] HostnameError),

    /// Resource graph rejected a declaration
    #[error("Resource graph error: {0}")]
    Graph(#[from] GraphError),

    /// A layer failed; no later layer was declared
    #[error("{layer} layer failed: {source}")]
    Layer {
        layer: LayerKind,
        #[source]
        source: Box<StackError>,
    },

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StackError {
    /// Attribute an error to the layer that raised it
    pub fn in_layer(layer: LayerKind, source: StackError) -> Self {
        StackError::Layer {
            layer,
            source: Box::new(source),
        }
    }
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}
