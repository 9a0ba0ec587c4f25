//! Bridge service: ties the registry, catalog, and publisher together.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use syrlex_protocol::commands::mnemonics;
use syrlex_protocol::{wire, CommandSet};

use crate::device::Device;
use crate::discovery::{catalog, EntityDescriptor};
use crate::error::BridgeError;
use crate::ingest::{parse_topic, setters_for_command, CommandTopic};
use crate::publisher::MqttPublisher;
use crate::registry::DeviceRegistry;
use crate::telemetry::build_state;
use crate::topics;

/// Static bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Topic namespace for state, availability, and command topics.
    pub namespace: String,
    /// Home Assistant discovery prefix.
    pub discovery_prefix: String,
    /// Extra telemetry mnemonic suffixes exposed as generic sensors.
    pub extra_sensors: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            namespace: "syr".to_string(),
            discovery_prefix: "homeassistant".to_string(),
            extra_sensors: Vec::new(),
        }
    }
}

/// The protocol bridge.
///
/// Two concurrent input streams call into this service: appliance HTTP polls
/// (via [`crate::http`]) and broker command messages. They share nothing but
/// the registry, whose locking gives the drain/enqueue guarantees.
pub struct BridgeService {
    config: BridgeConfig,
    command_set: CommandSet,
    entities: Vec<EntityDescriptor>,
    registry: DeviceRegistry,
    publisher: Arc<dyn MqttPublisher>,
}

impl BridgeService {
    pub fn new(config: BridgeConfig, publisher: Arc<dyn MqttPublisher>) -> Self {
        let command_set = CommandSet::new(&config.extra_sensors);
        let entities = catalog(&config.extra_sensors);
        Self {
            config,
            command_set,
            entities,
            registry: DeviceRegistry::new(),
            publisher,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Answer a basic poll: validate the document, return the identity
    /// getter list with empty values. No registry interaction.
    pub async fn handle_basic_poll(&self, document: &str) -> Result<String, BridgeError> {
        wire::decode(document)?;
        trace!("answering basic poll");
        Ok(wire::encode(self.command_set.basic(), HashMap::new()))
    }

    /// Answer a full poll.
    ///
    /// A complete payload with a resolvable identity registers the device on
    /// first contact and publishes a state record; an incomplete payload
    /// updates nothing. Either way the response carries the full getter list
    /// merged with the device's drained setters.
    pub async fn handle_full_poll(&self, document: &str) -> Result<String, BridgeError> {
        let commands = wire::decode(document)?;
        let complete = self.command_set.is_complete(&commands);

        let model = commands.get(mnemonics::MODEL).cloned().unwrap_or_default();
        let serial = commands.get(mnemonics::SERIAL).cloned().unwrap_or_default();

        let mut drained = HashMap::new();
        if !model.is_empty() && !serial.is_empty() {
            let device = if complete {
                let firmware = commands.get(mnemonics::FIRMWARE).cloned().unwrap_or_default();
                let base_url = commands
                    .get(mnemonics::IP_ADDRESS)
                    .filter(|ip| !ip.is_empty())
                    .map(|ip| format!("http://{ip}/"))
                    .unwrap_or_default();
                let (device, first_seen) =
                    self.registry
                        .identify_or_register(&model, &serial, &firmware, &base_url);
                if first_seen {
                    info!(identifier = %device.identifier, %model, %serial, "registering new device");
                    self.announce_device(&device).await?;
                }
                Some(device)
            } else {
                // Known devices still get their queued setters delivered on
                // partial polls; unknown ones wait for a complete payload.
                self.registry
                    .get(&syrlex_protocol::derive_identifier(&model, &serial))
            };

            if let Some(device) = device {
                if complete {
                    self.publish_state(&device, &commands).await?;
                }
                drained = device.drain_setters();
                if !drained.is_empty() {
                    debug!(
                        identifier = %device.identifier,
                        count = drained.len(),
                        "delivering queued setters"
                    );
                }
            }
        }
        if !complete {
            debug!("incomplete poll payload, telemetry withheld");
        }

        Ok(wire::encode(self.command_set.full(), drained))
    }

    /// Dispatch an inbound broker message. Failures are logged, never fatal.
    pub async fn handle_broker_message(&self, topic: &str, payload: &[u8]) {
        match parse_topic(&self.config.namespace, topic) {
            CommandTopic::Set { identifier, entity } => {
                let payload = String::from_utf8_lossy(payload);
                let setters = setters_for_command(entity, &payload);
                if setters.is_empty() {
                    debug!(topic, %payload, "ignoring unactionable command payload");
                    return;
                }
                if self.registry.get(identifier).is_none() {
                    debug!(identifier, entity, "dropping command for unknown device");
                    return;
                }
                for (mnemonic, value) in setters {
                    debug!(identifier, %mnemonic, %value, "queueing setter");
                    self.registry.enqueue_setter(identifier, &mnemonic, &value);
                }
            }
            CommandTopic::HubStatus => {
                if payload == b"online" {
                    info!("hub came online, re-announcing devices");
                    if let Err(e) = self.announce_all_devices().await {
                        warn!("re-announce failed: {e}");
                    }
                }
            }
            CommandTopic::Unmatched => {
                trace!(topic, "ignoring unmatched topic");
            }
        }
    }

    /// Publish the retained bridge availability marker. Called on every
    /// (re)connect; the broker last-will flips it back to `offline`.
    pub async fn announce_bridge_online(&self) -> Result<(), BridgeError> {
        self.publisher
            .publish(
                &topics::bridge_state(&self.config.namespace),
                b"online".to_vec(),
                true,
            )
            .await
    }

    /// One-time registration: every discovery descriptor, then availability.
    async fn announce_device(&self, device: &Device) -> Result<(), BridgeError> {
        for descriptor in &self.entities {
            let topic =
                descriptor.config_topic(&self.config.discovery_prefix, &device.identifier);
            let payload = descriptor.render(&self.config.namespace, device);
            let body = serde_json::to_vec(&payload)
                .map_err(|e| BridgeError::Serialization(e.to_string()))?;
            self.publisher.publish(&topic, body, true).await?;
        }
        self.publisher
            .publish(
                &topics::availability(&self.config.namespace, &device.identifier),
                b"online".to_vec(),
                true,
            )
            .await
    }

    /// Re-issue discovery and availability for every known device.
    async fn announce_all_devices(&self) -> Result<(), BridgeError> {
        for device in self.registry.all() {
            self.announce_device(&device).await?;
        }
        Ok(())
    }

    async fn publish_state(
        &self,
        device: &Device,
        commands: &HashMap<String, String>,
    ) -> Result<(), BridgeError> {
        let Some(state) = build_state(commands, &self.command_set) else {
            return Ok(());
        };
        let body = serde_json::to_vec(&state)
            .map_err(|e| BridgeError::Serialization(e.to_string()))?;
        debug!(identifier = %device.identifier, "publishing state");
        self.publisher
            .publish(
                &topics::state(&self.config.namespace, &device.identifier),
                body,
                false,
            )
            .await
    }
}
