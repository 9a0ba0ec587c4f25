//! Broker publish seam.

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};

use crate::error::BridgeError;

/// Outbound side of the broker connection.
///
/// The bridge core publishes through this trait only; the binary injects a
/// rumqttc-backed implementation, tests inject a recording one.
#[async_trait]
pub trait MqttPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), BridgeError>;
}

/// [`MqttPublisher`] backed by a rumqttc [`AsyncClient`].
pub struct RumqttcPublisher {
    client: AsyncClient,
}

impl RumqttcPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MqttPublisher for RumqttcPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), BridgeError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload)
            .await
            .map_err(|e| BridgeError::Publish(e.to_string()))
    }
}
