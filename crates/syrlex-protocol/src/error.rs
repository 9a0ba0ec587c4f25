//! Error types for the wire protocol.

/// Errors produced while decoding appliance documents.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    /// The inbound XML did not parse or lacked the `sc`/`d`/`c` structure.
    #[error("malformed wire document: {0}")]
    MalformedDocument(String),
}
