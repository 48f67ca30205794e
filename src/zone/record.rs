//! Rendering of single resource-record lines in the zone's column layout.
use std::fmt;
use std::str::FromStr;

use crate::error::ZoneError;

pub const DEFAULT_TTL: u32 = 3600;
pub const DEFAULT_MX_PRIORITY: &str = "10";

/// Owner names are left-aligned to this width.
const HOST_WIDTH: usize = 30;
/// Type mnemonics are left-aligned to this width.
const TYPE_WIDTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "TXT" => Ok(RecordType::Txt),
            _ => Err(ZoneError::UnsupportedType(s.to_string())),
        }
    }
}

/// Render one newline-terminated record line.
///
/// MX values are `"<priority> <mailserver>"`; a value without a space is taken
/// as the mail server with priority 10.
pub fn format_record(
    hostname: &str,
    rrtype: RecordType,
    value: &str,
    ttl: u32,
) -> Result<String, ZoneError> {
    let rdata = match rrtype {
        RecordType::A | RecordType::Aaaa | RecordType::Cname => value.to_string(),
        RecordType::Mx => {
            let (priority, mailserver) = split_mx(value)?;
            format!("{priority} {mailserver}")
        }
        RecordType::Txt => format!("\"{value}\""),
    };

    Ok(format!(
        "{hostname:<HOST_WIDTH$} {ttl}    IN    {rrtype:<TYPE_WIDTH$} {rdata}\n"
    ))
}

fn split_mx(value: &str) -> Result<(&str, &str), ZoneError> {
    if !value.contains(' ') {
        return Ok((DEFAULT_MX_PRIORITY, value));
    }
    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(priority), Some(mailserver), None) => Ok((priority, mailserver)),
        _ => Err(ZoneError::invalid(format!(
            "MX value must be '<priority> <mailserver>', got '{value}'"
        ))),
    }
}
