//! Telemetry state records.
//!
//! A complete full-poll payload maps onto one JSON state record published to
//! the device's state topic. A partial payload produces nothing; visible
//! state only ever moves in whole snapshots.

use std::collections::HashMap;

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::{Map, Value};

use syrlex_protocol::commands::mnemonics;
use syrlex_protocol::{weekday, CommandSet};

/// Semantic state record; field names double as entity keys.
#[derive(Debug, Serialize)]
pub struct SoftenerState {
    pub current_water_flow: Value,
    pub salt_remaining: Value,
    pub remaining_resin_capacity: Value,
    pub remaining_water_capacity: Value,
    pub total_water_consumption: Value,
    pub number_of_regenerations: Value,
    pub last_regeneration: String,
    pub regeneration_running: &'static str,
    pub status_message: String,
    pub salt_in_stock: Value,
    pub regeneration_interval: Value,
    pub regeneration_week_days: String,
    pub regeneration_time: String,
    /// Configured extension fields, raw values keyed by lowercase suffix.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Map a decoded poll payload onto a state record.
///
/// Returns `None` unless every mnemonic of the full command set is present;
/// missing telemetry withholds the publish but never fails the poll.
pub fn build_state(
    commands: &HashMap<String, String>,
    command_set: &CommandSet,
) -> Option<SoftenerState> {
    if !command_set.is_complete(commands) {
        return None;
    }

    let hour: u32 = commands[mnemonics::REGENERATION_HOUR].parse().unwrap_or(0);
    let minute: u32 = commands[mnemonics::REGENERATION_MINUTE].parse().unwrap_or(0);
    let mask: u8 = commands[mnemonics::REGENERATION_WEEKDAYS].parse().unwrap_or(0);

    let mut extensions = Map::new();
    for suffix in command_set.extension_suffixes() {
        let raw = commands[&format!("get{suffix}")].clone();
        extensions.insert(suffix.to_lowercase(), Value::String(raw));
    }

    Some(SoftenerState {
        current_water_flow: numeric(&commands[mnemonics::WATER_FLOW]),
        salt_remaining: numeric(&commands[mnemonics::SALT_REMAINING]),
        remaining_resin_capacity: numeric(&commands[mnemonics::RESIN_CAPACITY]),
        remaining_water_capacity: numeric(&commands[mnemonics::WATER_CAPACITY]),
        total_water_consumption: numeric(&commands[mnemonics::TOTAL_CONSUMPTION]),
        number_of_regenerations: numeric(&commands[mnemonics::REGENERATION_COUNT]),
        last_regeneration: format_timestamp(&commands[mnemonics::LAST_REGENERATION]),
        regeneration_running: if commands[mnemonics::REGENERATION_RUNNING] == "1" {
            "ON"
        } else {
            "OFF"
        },
        status_message: commands[mnemonics::STATUS_MESSAGE].clone(),
        salt_in_stock: numeric(&commands[mnemonics::SALT_STOCK]),
        regeneration_interval: numeric(&commands[mnemonics::REGENERATION_INTERVAL]),
        regeneration_week_days: weekday::decode(mask),
        regeneration_time: format!("{hour:02}:{minute:02}"),
        extensions,
    })
}

/// Render a value as a JSON number when it parses as one, else keep the raw
/// string so odd appliance values still reach the state record.
fn numeric(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = value.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(value.to_string())
}

/// Convert unix seconds to ISO-8601 with the local offset at conversion
/// time; unparseable input passes through untouched.
fn format_timestamp(raw: &str) -> String {
    let Ok(seconds) = raw.parse::<i64>() else {
        return raw.to_string();
    };
    match Local.timestamp_opt(seconds, 0).single() {
        Some(timestamp) => timestamp.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrlex_protocol::commands::mnemonics as m;

    fn full_payload() -> HashMap<String, String> {
        let set = CommandSet::default();
        let mut commands: HashMap<String, String> = set
            .full()
            .iter()
            .map(|mnemonic| (mnemonic.clone(), String::new()))
            .collect();
        commands.insert(m::WATER_FLOW.into(), "3".into());
        commands.insert(m::SALT_REMAINING.into(), "3".into());
        commands.insert(m::RESIN_CAPACITY.into(), "35".into());
        commands.insert(m::WATER_CAPACITY.into(), "1108".into());
        commands.insert(m::TOTAL_CONSUMPTION.into(), "578350".into());
        commands.insert(m::REGENERATION_COUNT.into(), "427".into());
        commands.insert(m::LAST_REGENERATION.into(), "1694501839".into());
        commands.insert(m::REGENERATION_RUNNING.into(), "0".into());
        commands.insert(m::STATUS_MESSAGE.into(), "Bitte Salz nachfüllen".into());
        commands.insert(m::SALT_STOCK.into(), "11".into());
        commands.insert(m::REGENERATION_INTERVAL.into(), "6".into());
        commands.insert(m::REGENERATION_WEEKDAYS.into(), "5".into());
        commands.insert(m::REGENERATION_HOUR.into(), "2".into());
        commands.insert(m::REGENERATION_MINUTE.into(), "30".into());
        commands
    }

    #[test]
    fn partial_payload_builds_nothing() {
        let set = CommandSet::default();
        let mut commands = full_payload();
        commands.remove(m::WATER_FLOW);
        assert!(build_state(&commands, &set).is_none());
    }

    #[test]
    fn complete_payload_maps_semantic_fields() {
        let set = CommandSet::default();
        let state = build_state(&full_payload(), &set).unwrap();
        assert_eq!(state.current_water_flow, Value::from(3));
        assert_eq!(state.total_water_consumption, Value::from(578350));
        assert_eq!(state.regeneration_running, "OFF");
        // Mask 5 is Monday + Wednesday, two days, full names.
        assert_eq!(state.regeneration_week_days, "Every Monday & Wednesday");
        assert_eq!(state.regeneration_time, "02:30");
        assert_eq!(state.status_message, "Bitte Salz nachfüllen");
    }

    #[test]
    fn running_flag_maps_one_to_on() {
        let set = CommandSet::default();
        let mut commands = full_payload();
        commands.insert(m::REGENERATION_RUNNING.into(), "1".into());
        assert_eq!(build_state(&commands, &set).unwrap().regeneration_running, "ON");
    }

    #[test]
    fn timestamp_carries_local_offset() {
        let set = CommandSet::default();
        let state = build_state(&full_payload(), &set).unwrap();
        // 2023-09-12T06:57:19Z rendered in the local zone; exact wall time
        // depends on the host offset, the shape does not.
        assert_eq!(state.last_regeneration.len(), "2023-09-12T08:57:19+02:00".len());
        assert!(state.last_regeneration.starts_with("2023-09-1"));
    }

    #[test]
    fn extension_values_pass_through_verbatim() {
        let set = CommandSet::new(&["PRS".to_string()]);
        let mut commands = full_payload();
        commands.insert("getPRS".into(), "4.2bar".into());
        let state = build_state(&commands, &set).unwrap();
        assert_eq!(state.extensions["prs"], Value::String("4.2bar".into()));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["prs"], "4.2bar");
    }

    #[test]
    fn non_numeric_values_survive_as_strings() {
        assert_eq!(numeric("3"), Value::from(3));
        assert_eq!(numeric("3.5"), Value::from(3.5));
        assert_eq!(numeric("n/a"), Value::String("n/a".into()));
    }
}
