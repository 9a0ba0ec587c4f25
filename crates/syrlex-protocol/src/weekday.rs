//! Regeneration weekday schedule mask codec.
//!
//! The appliance stores its regeneration schedule as a 7-bit mask, bit 0 =
//! Monday through bit 6 = Sunday. Home Assistant sees the schedule as a
//! select entity whose options are rendered strings such as
//! `"Every Mon, Wed & Fri"`. This module converts between the two and
//! enumerates the complete option list consumed by the select descriptor.

/// Rendered value for the empty mask.
pub const NO_DAYS: &str = "(None)";

const FULL_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const ABBREVIATIONS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Render a weekday mask as a human-readable schedule string.
///
/// Full day names are used for up to two selected days, three-letter
/// abbreviations otherwise. The last separator is rendered as `" & "`.
pub fn decode(mask: u8) -> String {
    let mask = mask & 0x7f;
    if mask == 0 {
        return NO_DAYS.to_string();
    }

    let days: Vec<usize> = (0..7).filter(|bit| mask & (1 << bit) != 0).collect();
    let names: &[&str; 7] = if days.len() <= 2 {
        &FULL_NAMES
    } else {
        &ABBREVIATIONS
    };
    let joined = days
        .iter()
        .map(|&day| names[day])
        .collect::<Vec<_>>()
        .join(", ");
    let rendered = match joined.rfind(", ") {
        Some(pos) => format!("{} & {}", &joined[..pos], &joined[pos + 2..]),
        None => joined,
    };
    format!("Every {rendered}")
}

/// Derive a weekday mask from a schedule string.
///
/// Scans for the three-letter abbreviations and ORs the matching bits
/// together; anything unrecognized contributes nothing. Every abbreviation is
/// a prefix of its full day name, so strings rendered by [`decode`] map back
/// to the mask they came from regardless of which name form was used.
pub fn encode(schedule: &str) -> u8 {
    ABBREVIATIONS
        .iter()
        .enumerate()
        .filter(|(_, abbrev)| schedule.contains(*abbrev))
        .fold(0, |mask, (bit, _)| mask | (1 << bit))
}

/// Enumerate every selectable schedule option in canonical order.
///
/// Starts with [`NO_DAYS`], then walks cardinality 1 through 7; within each
/// cardinality raw masks are visited from 127 down to 1 and their low seven
/// bits reversed before rendering, so single-day and low-numbered-day
/// combinations come first. The order is load-bearing: it must stay stable
/// across releases or Home Assistant sees a different select option list.
pub fn enumerate_options() -> Vec<String> {
    let mut options = Vec::with_capacity(128);
    options.push(NO_DAYS.to_string());
    for cardinality in 1..=7u32 {
        for raw in (1..=127u8).rev() {
            if raw.count_ones() == cardinality {
                options.push(decode(reverse_bits(raw)));
            }
        }
    }
    options
}

/// Reverse the low seven bits of a mask (bit 0 <-> bit 6, bit 3 fixed).
fn reverse_bits(mask: u8) -> u8 {
    (0..7).fold(0, |acc, bit| acc | (((mask >> bit) & 1) << (6 - bit)))
}
