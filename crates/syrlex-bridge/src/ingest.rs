//! Inbound broker command handling.
//!
//! Subscribed topics funnel through a structured matcher instead of a regex:
//! split on the separator, check the namespace prefix and the `set_` leaf,
//! and hand back a typed result. Recognized entities map onto one or more
//! setter mnemonics for the device's pending queue.

use syrlex_protocol::commands::mnemonics;
use syrlex_protocol::weekday;

use crate::topics;

/// Result of matching an inbound topic.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandTopic<'a> {
    /// `{ns}/{identifier}/set_{entity}`.
    Set { identifier: &'a str, entity: &'a str },
    /// Home Assistant birth/status topic.
    HubStatus,
    /// Anything else, including our own state and availability topics.
    Unmatched,
}

/// Match a topic against the command-topic shape.
pub fn parse_topic<'a>(namespace: &str, topic: &'a str) -> CommandTopic<'a> {
    if topic == topics::HUB_STATUS {
        return CommandTopic::HubStatus;
    }
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(ns), Some(identifier), Some(leaf), None) if ns == namespace => {
            match leaf.strip_prefix("set_") {
                Some(entity) if !identifier.is_empty() && !entity.is_empty() && entity != "state" => {
                    CommandTopic::Set { identifier, entity }
                }
                _ => CommandTopic::Unmatched,
            }
        }
        _ => CommandTopic::Unmatched,
    }
}

/// Map an entity command payload onto setter mnemonic/value pairs.
///
/// An empty result means the payload was not actionable (unknown entity,
/// malformed clock value, button payload other than `PRESS`) and nothing is
/// enqueued.
pub fn setters_for_command(entity: &str, payload: &str) -> Vec<(String, String)> {
    match entity {
        "salt_in_stock" => vec![(setter(mnemonics::SALT_STOCK), payload.to_string())],
        "regeneration_interval" => {
            vec![(setter(mnemonics::REGENERATION_INTERVAL), payload.to_string())]
        }
        "regeneration_week_days" => vec![(
            setter(mnemonics::REGENERATION_WEEKDAYS),
            weekday::encode(payload).to_string(),
        )],
        "regeneration_time" => match parse_clock(payload) {
            Some((hour, minute)) => vec![
                (setter(mnemonics::REGENERATION_HOUR), hour),
                (setter(mnemonics::REGENERATION_MINUTE), minute),
            ],
            None => Vec::new(),
        },
        "start_regeneration" if payload == "PRESS" => {
            vec![(mnemonics::START_REGENERATION.to_string(), "0".to_string())]
        }
        _ => Vec::new(),
    }
}

fn setter(getter: &str) -> String {
    syrlex_protocol::setter_for(getter)
}

/// Parse `H:MM` / `HH:MM`; minutes must be two digits.
fn parse_clock(payload: &str) -> Option<(String, String)> {
    let (hour, minute) = payload.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if minute.len() != 2 || !minute.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let h: u32 = hour.parse().ok()?;
    let m: u32 = minute.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some((hour.to_string(), minute.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_well_formed_command_topics() {
        assert_eq!(
            parse_topic("syr", "syr/abc123/set_salt_in_stock"),
            CommandTopic::Set {
                identifier: "abc123",
                entity: "salt_in_stock"
            }
        );
    }

    #[test]
    fn rejects_foreign_and_reserved_topics() {
        assert_eq!(parse_topic("syr", "syr/abc123/state"), CommandTopic::Unmatched);
        assert_eq!(parse_topic("syr", "syr/abc123/set_state"), CommandTopic::Unmatched);
        assert_eq!(parse_topic("syr", "syr/abc123/availability"), CommandTopic::Unmatched);
        assert_eq!(parse_topic("syr", "other/abc123/set_x"), CommandTopic::Unmatched);
        assert_eq!(parse_topic("syr", "syr/bridge/state"), CommandTopic::Unmatched);
        assert_eq!(parse_topic("syr", "syr/a/b/set_x"), CommandTopic::Unmatched);
        assert_eq!(parse_topic("syr", "syr/set_x"), CommandTopic::Unmatched);
    }

    #[test]
    fn hub_status_topic_is_recognized() {
        assert_eq!(parse_topic("syr", "homeassistant/status"), CommandTopic::HubStatus);
    }

    #[test]
    fn simple_numbers_map_to_single_setters() {
        assert_eq!(
            setters_for_command("salt_in_stock", "11"),
            vec![("setSV1".to_string(), "11".to_string())]
        );
        assert_eq!(
            setters_for_command("regeneration_interval", "6"),
            vec![("setRPD".to_string(), "6".to_string())]
        );
    }

    #[test]
    fn week_days_store_the_encoded_mask() {
        assert_eq!(
            setters_for_command("regeneration_week_days", "Every Mon, Wed & Fri"),
            vec![("setRPW".to_string(), "21".to_string())]
        );
        assert_eq!(
            setters_for_command("regeneration_week_days", "(None)"),
            vec![("setRPW".to_string(), "0".to_string())]
        );
    }

    #[test]
    fn clock_requires_two_digit_minutes() {
        // Scenario: "6:5" is dropped, "06:05" lands as two setters.
        assert!(setters_for_command("regeneration_time", "6:5").is_empty());
        assert_eq!(
            setters_for_command("regeneration_time", "06:05"),
            vec![
                ("setRTH".to_string(), "06".to_string()),
                ("setRTM".to_string(), "05".to_string()),
            ]
        );
        assert_eq!(
            setters_for_command("regeneration_time", "6:05"),
            vec![
                ("setRTH".to_string(), "6".to_string()),
                ("setRTM".to_string(), "05".to_string()),
            ]
        );
        assert!(setters_for_command("regeneration_time", "24:00").is_empty());
        assert!(setters_for_command("regeneration_time", "12:60").is_empty());
        assert!(setters_for_command("regeneration_time", "noon").is_empty());
    }

    #[test]
    fn button_fires_only_on_press() {
        assert_eq!(
            setters_for_command("start_regeneration", "PRESS"),
            vec![("setSIR".to_string(), "0".to_string())]
        );
        assert!(setters_for_command("start_regeneration", "RELEASE").is_empty());
        assert!(setters_for_command("start_regeneration", "press").is_empty());
    }

    #[test]
    fn unknown_entities_map_to_nothing() {
        assert!(setters_for_command("status_message", "hello").is_empty());
    }
}
