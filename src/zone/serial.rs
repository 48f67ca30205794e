//! `YYYYMMDDNN` serial handling on the SOA `; Serial` line.
use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::error::ZoneError;

const MARKER: &str = "; Serial";

lazy_static::lazy_static! {
    static ref SERIAL_RE: Regex = Regex::new(r"(\d{8})(\d{2})\s+; Serial").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialOutcome {
    /// An existing serial was advanced.
    Bumped { from: String, to: String },
    /// The marker was present without a usable serial; a fresh one was written.
    Inserted { to: String },
    /// No `; Serial` marker at all; the zone is unchanged.
    MarkerMissing,
}

#[derive(Debug, Clone)]
pub struct SerialBump {
    pub content: String,
    pub outcome: SerialOutcome,
}

/// Compute the serial that follows `current` on `today`.
///
/// An earlier date restarts at `<today>01`. The same date, or a date ahead of
/// `today` (clock skew, hand edits), keeps its date and bumps the two-digit
/// counter so the serial never decreases. A counter already at 99 cannot
/// advance.
pub fn next_serial(date: &str, counter: u8, today: NaiveDate) -> Result<String, ZoneError> {
    let today = today.format("%Y%m%d").to_string();
    // Both are eight ASCII digits, so string order is numeric order.
    if date < today.as_str() {
        return Ok(format!("{today}01"));
    }
    if counter >= 99 {
        return Err(ZoneError::SerialOverflow(date.to_string()));
    }
    Ok(format!("{date}{:02}", counter + 1))
}

pub fn bump(zone: &str, today: NaiveDate) -> Result<SerialBump, ZoneError> {
    if let Some(caps) = SERIAL_RE.captures(zone) {
        let from = format!("{}{}", &caps[1], &caps[2]);
        // `\d{2}` always fits
        let counter: u8 = caps[2].parse().unwrap_or_default();
        let to = next_serial(&caps[1], counter, today)?;
        let content = SERIAL_RE
            .replace_all(zone, |_: &Captures| format!("{to} {MARKER}"))
            .into_owned();
        return Ok(SerialBump {
            content,
            outcome: SerialOutcome::Bumped { from, to },
        });
    }

    let Some(marker) = zone.find(MARKER) else {
        return Ok(SerialBump {
            content: zone.to_string(),
            outcome: SerialOutcome::MarkerMissing,
        });
    };

    // Replace whatever digits precede the marker with a fresh serial.
    let to = format!("{}01", today.format("%Y%m%d"));
    let head = zone[..marker].trim_end_matches([' ', '\t']);
    let digits_start = match head.trim_end_matches(|c: char| c.is_ascii_digit()).len() {
        start if start < head.len() => start,
        _ => marker,
    };
    let mut content = String::with_capacity(zone.len() + to.len() + 1);
    content.push_str(&zone[..digits_start]);
    content.push_str(&to);
    content.push(' ');
    content.push_str(&zone[marker..]);

    Ok(SerialBump {
        content,
        outcome: SerialOutcome::Inserted { to },
    })
}
