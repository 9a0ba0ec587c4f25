//! Canonical mnemonic tables and command sets.
//!
//! The appliance addresses every field by a short mnemonic. Getters carry a
//! `get` prefix, setters the same suffix with a `set` prefix. The bridge
//! answers every poll with a fixed, ordered getter list; order carries no
//! protocol meaning but keeps responses deterministic.

use std::collections::HashMap;

/// Getter mnemonics understood by the bridge.
pub mod mnemonics {
    /// Serial number.
    pub const SERIAL: &str = "getSRN";
    /// Firmware version.
    pub const FIRMWARE: &str = "getVER";
    /// MAC address.
    pub const MAC: &str = "getMAC";
    /// Device type code.
    pub const DEVICE_TYPE: &str = "getTYP";
    /// Model name.
    pub const MODEL: &str = "getCNA";
    /// Appliance IP address.
    pub const IP_ADDRESS: &str = "getIPA";

    /// Current water flow (l/min).
    pub const WATER_FLOW: &str = "getFLO";
    /// Salt remaining (weeks).
    pub const SALT_REMAINING: &str = "getSS1";
    /// Remaining resin capacity (%).
    pub const RESIN_CAPACITY: &str = "getCS1";
    /// Remaining water capacity (L).
    pub const WATER_CAPACITY: &str = "getRES";
    /// Total water consumption (L).
    pub const TOTAL_CONSUMPTION: &str = "getCOF";
    /// Number of regenerations.
    pub const REGENERATION_COUNT: &str = "getTOR";
    /// Last regeneration (unix seconds).
    pub const LAST_REGENERATION: &str = "getLAR";
    /// Regeneration running flag.
    pub const REGENERATION_RUNNING: &str = "getRG1";
    /// Status message.
    pub const STATUS_MESSAGE: &str = "getSTA";
    /// Salt in stock (kg).
    pub const SALT_STOCK: &str = "getSV1";
    /// Regeneration interval (days).
    pub const REGENERATION_INTERVAL: &str = "getRPD";
    /// Regeneration weekday mask.
    pub const REGENERATION_WEEKDAYS: &str = "getRPW";
    /// Scheduled regeneration hour.
    pub const REGENERATION_HOUR: &str = "getRTH";
    /// Scheduled regeneration minute.
    pub const REGENERATION_MINUTE: &str = "getRTM";

    /// Start-regeneration trigger setter, sent with value `"0"`.
    pub const START_REGENERATION: &str = "setSIR";
}

/// The six identity getters answered on the basic poll, in response order.
const BASIC: [&str; 6] = [
    mnemonics::SERIAL,
    mnemonics::FIRMWARE,
    mnemonics::MAC,
    mnemonics::DEVICE_TYPE,
    mnemonics::MODEL,
    mnemonics::IP_ADDRESS,
];

/// Telemetry and schedule getters appended to the full poll.
const TELEMETRY: [&str; 14] = [
    mnemonics::WATER_FLOW,
    mnemonics::SALT_REMAINING,
    mnemonics::RESIN_CAPACITY,
    mnemonics::WATER_CAPACITY,
    mnemonics::TOTAL_CONSUMPTION,
    mnemonics::REGENERATION_COUNT,
    mnemonics::LAST_REGENERATION,
    mnemonics::REGENERATION_RUNNING,
    mnemonics::STATUS_MESSAGE,
    mnemonics::SALT_STOCK,
    mnemonics::REGENERATION_INTERVAL,
    mnemonics::REGENERATION_WEEKDAYS,
    mnemonics::REGENERATION_HOUR,
    mnemonics::REGENERATION_MINUTE,
];

/// Derive the setter mnemonic matching a getter (`getRPW` -> `setRPW`).
pub fn setter_for(getter: &str) -> String {
    match getter.strip_prefix("get") {
        Some(suffix) => format!("set{suffix}"),
        None => getter.to_string(),
    }
}

/// Derive the registry identifier for a device.
///
/// Pure function of model and serial; the result keys the registry and forms
/// the device segment of every MQTT topic, so it must never change for a
/// running process.
pub fn derive_identifier(model: &str, serial: &str) -> String {
    format!("{model}{serial}").to_lowercase()
}

/// The ordered getter lists answered to the appliance.
///
/// Extension suffixes come from configuration (`EXTRA_SENSORS`); suffix
/// `XYZ` adds a `getXYZ` getter to the full set and a generic sensor
/// entity named `xyz`.
#[derive(Debug, Clone)]
pub struct CommandSet {
    basic: Vec<String>,
    full: Vec<String>,
    extension_suffixes: Vec<String>,
}

impl CommandSet {
    pub fn new(extension_suffixes: &[String]) -> Self {
        let basic: Vec<String> = BASIC.iter().map(|m| m.to_string()).collect();
        let mut full = basic.clone();
        full.extend(TELEMETRY.iter().map(|m| m.to_string()));
        full.extend(extension_suffixes.iter().map(|suffix| format!("get{suffix}")));
        Self {
            basic,
            full,
            extension_suffixes: extension_suffixes.to_vec(),
        }
    }

    /// Identity getters answered on the basic poll.
    pub fn basic(&self) -> &[String] {
        &self.basic
    }

    /// Identity plus telemetry getters answered on the full poll.
    pub fn full(&self) -> &[String] {
        &self.full
    }

    /// Configured extension suffixes, verbatim.
    pub fn extension_suffixes(&self) -> &[String] {
        &self.extension_suffixes
    }

    /// Whether a decoded payload carries every full-set mnemonic.
    pub fn is_complete(&self, commands: &HashMap<String, String>) -> bool {
        self.full.iter().all(|m| commands.contains_key(m))
    }
}

impl Default for CommandSet {
    fn default() -> Self {
        Self::new(&[])
    }
}
