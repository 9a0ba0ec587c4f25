//! MQTT topic layout.
//!
//! Every device-scoped topic embeds the registry identifier, so topic
//! addressing and registry addressing can never drift apart.

/// Home Assistant birth/last-will status topic.
pub const HUB_STATUS: &str = "homeassistant/status";

/// Device state topic (`{ns}/{identifier}/state`).
pub fn state(namespace: &str, identifier: &str) -> String {
    format!("{namespace}/{identifier}/state")
}

/// Device availability topic (`{ns}/{identifier}/availability`).
pub fn availability(namespace: &str, identifier: &str) -> String {
    format!("{namespace}/{identifier}/availability")
}

/// Bridge-wide availability topic, also the broker last-will target.
pub fn bridge_state(namespace: &str) -> String {
    format!("{namespace}/bridge/state")
}

/// Wildcard subscription covering every command topic in the namespace.
pub fn command_subscription(namespace: &str) -> String {
    format!("{namespace}/#")
}
