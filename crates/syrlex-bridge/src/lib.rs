//! HTTP-to-MQTT bridge core for SyrConnect water softeners.
//!
//! The appliance initiates everything: it polls the bridge's HTTP surface
//! with XML command lists, and the bridge answers with the getters it wants
//! filled plus any configuration setters queued from Home Assistant. On the
//! broker side the bridge publishes discovery descriptors once per device,
//! availability, and a JSON state record per complete poll, and consumes
//! command topics back into per-device setter queues.
//!
//! Two independent consumers share state only through [`DeviceRegistry`]:
//! the poll path (HTTP) and the command path (MQTT). The broker itself is
//! abstracted behind the [`MqttPublisher`] trait so tests can run the whole
//! pipeline against a recording publisher.

pub mod device;
pub mod discovery;
pub mod error;
pub mod http;
pub mod ingest;
pub mod publisher;
pub mod registry;
pub mod service;
pub mod telemetry;
pub mod topics;

pub use device::Device;
pub use error::BridgeError;
pub use publisher::{MqttPublisher, RumqttcPublisher};
pub use registry::DeviceRegistry;
pub use service::{BridgeConfig, BridgeService};
