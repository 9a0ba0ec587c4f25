//! Bridge error types.

use syrlex_protocol::ProtocolError;

/// Errors surfaced by the bridge service.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Inbound wire document could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Broker publish failed.
    #[error("publish error: {0}")]
    Publish(String),

    /// State or discovery payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}
