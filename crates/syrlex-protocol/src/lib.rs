//! SyrConnect wire protocol for Syr LEX Plus water softeners.
//!
//! The appliance polls its configured server over HTTP and exchanges command
//! lists encoded as small XML documents. Every telemetry and configuration
//! field is addressed by a mnemonic (`getFLO`, `setRPW`, ...). This crate is
//! the pure, I/O-free half of the bridge:
//!
//! - [`wire`]: decode/encode the XML command-list documents
//! - [`commands`]: the canonical mnemonic tables and command sets
//! - [`weekday`]: the 7-bit regeneration schedule mask codec
//!
//! Everything here is synchronous and deterministic so the bridge service can
//! test the protocol surface without a broker or an appliance.

pub mod commands;
pub mod error;
pub mod weekday;
pub mod wire;

pub use commands::{derive_identifier, setter_for, CommandSet};
pub use error::ProtocolError;
