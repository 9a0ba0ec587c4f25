//! Home Assistant discovery catalog.
//!
//! A fixed table of entity descriptors is rendered into retained discovery
//! payloads when a device is first seen. Rendering is pure: descriptor plus
//! device metadata in, topic plus JSON-shaped payload out. Optional fields
//! are modeled explicitly and omitted from the JSON when absent.

use serde::Serialize;

use syrlex_protocol::weekday;

use crate::device::Device;
use crate::topics;

/// Discovery node group shared by every entity of the bridge.
const NODE_GROUP: &str = "syr_watersoftening";

const MANUFACTURER: &str = "Syr";

/// Accepts `H:MM` and `HH:MM` with two-digit minutes.
const CLOCK_PATTERN: &str = "^([01]?[0-9]|2[0-3]):[0-5][0-9]$";

/// Entity type tag, named after the Home Assistant component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Sensor,
    BinarySensor,
    Number,
    Select,
    Text,
    Button,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Sensor => "sensor",
            Component::BinarySensor => "binary_sensor",
            Component::Number => "number",
            Component::Select => "select",
            Component::Text => "text",
            Component::Button => "button",
        }
    }

    /// Whether entities of this component accept commands.
    fn commandable(&self) -> bool {
        matches!(
            self,
            Component::Number | Component::Select | Component::Text | Component::Button
        )
    }

    /// Buttons are stateless; everything else reads the state record.
    fn has_state(&self) -> bool {
        !matches!(self, Component::Button)
    }
}

/// One entry of the discovery catalog.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub component: Component,
    /// Entity key: state-record field and `set_{entity}` command suffix.
    pub entity: String,
    pub name: String,
    pub device_class: Option<&'static str>,
    pub unit_of_measurement: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub options: Option<Vec<String>>,
    pub pattern: Option<&'static str>,
}

impl EntityDescriptor {
    fn new(component: Component, entity: &str, name: &str) -> Self {
        Self {
            component,
            entity: entity.to_string(),
            name: name.to_string(),
            device_class: None,
            unit_of_measurement: None,
            icon: None,
            min: None,
            max: None,
            options: None,
            pattern: None,
        }
    }

    fn device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }

    fn unit(mut self, unit: &'static str) -> Self {
        self.unit_of_measurement = Some(unit);
        self
    }

    fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    fn range(mut self, min: u32, max: u32) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Retained config topic for this entity on a given device.
    pub fn config_topic(&self, discovery_prefix: &str, identifier: &str) -> String {
        format!(
            "{discovery_prefix}/{component}/{NODE_GROUP}/{identifier}_{entity}/config",
            component = self.component.as_str(),
            entity = self.entity,
        )
    }

    /// Render the discovery payload for a device.
    pub fn render(&self, namespace: &str, device: &Device) -> DiscoveryPayload {
        let identifier = &device.identifier;
        DiscoveryPayload {
            name: self.name.clone(),
            device_class: self.device_class,
            unit_of_measurement: self.unit_of_measurement,
            icon: self.icon,
            state_topic: self
                .component
                .has_state()
                .then(|| topics::state(namespace, identifier)),
            command_topic: self
                .component
                .commandable()
                .then(|| format!("{namespace}/{identifier}/set_{}", self.entity)),
            availability: vec![
                AvailabilityRef {
                    topic: topics::bridge_state(namespace),
                },
                AvailabilityRef {
                    topic: topics::availability(namespace, identifier),
                },
            ],
            value_template: self
                .component
                .has_state()
                .then(|| format!("{{{{ value_json.{} }}}}", self.entity)),
            unique_id: format!("{}_{}", device.serial, self.entity),
            min: self.min,
            max: self.max,
            options: self.options.clone(),
            pattern: self.pattern,
            device: DeviceMetadata {
                identifiers: vec![device.serial.clone()],
                manufacturer: MANUFACTURER,
                name: device.model.clone(),
                model: device.model.clone(),
                sw_version: device.firmware_version.clone(),
                configuration_url: device.base_url.clone(),
            },
        }
    }
}

/// Discovery payload; `None` fields are absent from the JSON.
#[derive(Debug, Serialize)]
pub struct DiscoveryPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    pub availability: Vec<AvailabilityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
    pub unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
    pub device: DeviceMetadata,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityRef {
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceMetadata {
    pub identifiers: Vec<String>,
    pub manufacturer: &'static str,
    pub name: String,
    pub model: String,
    pub sw_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub configuration_url: String,
}

/// Build the full catalog, including one generic sensor per configured
/// extension suffix.
pub fn catalog(extension_suffixes: &[String]) -> Vec<EntityDescriptor> {
    let mut entities = vec![
        EntityDescriptor::new(Component::Sensor, "current_water_flow", "Current Water Flow")
            .unit("l/min")
            .icon("mdi:water"),
        EntityDescriptor::new(Component::Sensor, "salt_remaining", "Salt Remaining")
            .unit("weeks")
            .icon("mdi:cup"),
        EntityDescriptor::new(
            Component::Sensor,
            "remaining_resin_capacity",
            "Remaining Resin Capacity",
        )
        .unit("%")
        .icon("mdi:water-percent"),
        EntityDescriptor::new(
            Component::Sensor,
            "remaining_water_capacity",
            "Remaining Water Capacity",
        )
        .device_class("water")
        .unit("L"),
        EntityDescriptor::new(
            Component::Sensor,
            "total_water_consumption",
            "Total Water Consumption",
        )
        .device_class("water")
        .unit("L"),
        EntityDescriptor::new(
            Component::Sensor,
            "number_of_regenerations",
            "Number of Regenerations",
        )
        .icon("mdi:counter"),
        EntityDescriptor::new(Component::Sensor, "last_regeneration", "Last Regeneration")
            .device_class("timestamp"),
        EntityDescriptor::new(Component::Sensor, "status_message", "Status Message")
            .icon("mdi:message-text"),
        EntityDescriptor::new(
            Component::BinarySensor,
            "regeneration_running",
            "Regeneration Running",
        )
        .device_class("running"),
        EntityDescriptor::new(Component::Number, "salt_in_stock", "Salt in Stock")
            .device_class("weight")
            .unit("kg")
            .range(0, 25)
            .icon("mdi:cup"),
        EntityDescriptor::new(
            Component::Number,
            "regeneration_interval",
            "Regeneration Interval",
        )
        .unit("days")
        .range(1, 10),
        {
            let mut select = EntityDescriptor::new(
                Component::Select,
                "regeneration_week_days",
                "Regeneration Week Days",
            )
            .icon("mdi:calendar-week");
            select.options = Some(weekday::enumerate_options());
            select
        },
        {
            let mut text =
                EntityDescriptor::new(Component::Text, "regeneration_time", "Regeneration Time")
                    .icon("mdi:clock-outline");
            text.pattern = Some(CLOCK_PATTERN);
            text
        },
        EntityDescriptor::new(Component::Button, "start_regeneration", "Start Regeneration"),
    ];

    for suffix in extension_suffixes {
        entities.push(EntityDescriptor::new(
            Component::Sensor,
            &suffix.to_lowercase(),
            suffix,
        ));
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> Device {
        Device::new("LEXplus10S", "123456789", "1.9", "http://192.168.178.30/")
    }

    #[test]
    fn catalog_has_fixed_entities_plus_extensions() {
        assert_eq!(catalog(&[]).len(), 14);
        let extended = catalog(&["PRS".to_string(), "ABC".to_string()]);
        assert_eq!(extended.len(), 16);
        let extra = extended.last().unwrap();
        assert_eq!(extra.entity, "abc");
        assert_eq!(extra.component, Component::Sensor);
    }

    #[test]
    fn config_topic_embeds_component_and_identifier() {
        let descriptor = &catalog(&[])[0];
        assert_eq!(
            descriptor.config_topic("homeassistant", "lexplus10s123456789"),
            "homeassistant/sensor/syr_watersoftening/lexplus10s123456789_current_water_flow/config"
        );
    }

    #[test]
    fn sensor_payload_omits_absent_fields() {
        let device = device();
        let descriptor = EntityDescriptor::new(Component::Sensor, "status_message", "Status Message")
            .icon("mdi:message-text");
        let payload = serde_json::to_value(descriptor.render("syr", &device)).unwrap();
        assert_eq!(payload["state_topic"], "syr/lexplus10s123456789/state");
        assert_eq!(
            payload["value_template"],
            "{{ value_json.status_message }}"
        );
        assert_eq!(payload["device"]["manufacturer"], "Syr");
        assert!(payload.get("device_class").is_none());
        assert!(payload.get("command_topic").is_none());
        assert!(payload.get("min").is_none());
    }

    #[test]
    fn number_payload_carries_range_and_command_topic() {
        let device = device();
        let descriptor = catalog(&[])
            .into_iter()
            .find(|d| d.entity == "salt_in_stock")
            .unwrap();
        let payload = serde_json::to_value(descriptor.render("syr", &device)).unwrap();
        assert_eq!(payload["min"], 0);
        assert_eq!(payload["max"], 25);
        assert_eq!(
            payload["command_topic"],
            "syr/lexplus10s123456789/set_salt_in_stock"
        );
        assert_eq!(payload["unique_id"], "123456789_salt_in_stock");
    }

    #[test]
    fn select_payload_lists_all_options() {
        let device = device();
        let descriptor = catalog(&[])
            .into_iter()
            .find(|d| d.entity == "regeneration_week_days")
            .unwrap();
        let payload = serde_json::to_value(descriptor.render("syr", &device)).unwrap();
        assert_eq!(payload["options"].as_array().unwrap().len(), 128);
        assert_eq!(payload["options"][0], "(None)");
    }

    #[test]
    fn button_payload_has_no_state_binding() {
        let device = device();
        let descriptor = catalog(&[])
            .into_iter()
            .find(|d| d.entity == "start_regeneration")
            .unwrap();
        let payload = serde_json::to_value(descriptor.render("syr", &device)).unwrap();
        assert!(payload.get("state_topic").is_none());
        assert!(payload.get("value_template").is_none());
        assert_eq!(
            payload["command_topic"],
            "syr/lexplus10s123456789/set_start_regeneration"
        );
    }

    #[test]
    fn availability_references_bridge_and_device() {
        let device = device();
        let payload = serde_json::to_value(catalog(&[])[0].render("syr", &device)).unwrap();
        let availability = payload["availability"].as_array().unwrap();
        assert_eq!(availability[0]["topic"], "syr/bridge/state");
        assert_eq!(
            availability[1]["topic"],
            "syr/lexplus10s123456789/availability"
        );
    }
}
