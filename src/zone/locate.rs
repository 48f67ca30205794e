//! Pattern search over raw zone text: existing records, the insertion offset
//! after the authority section, and line removal.
use regex::Regex;

use crate::error::ZoneError;

lazy_static::lazy_static! {
    /// An apex NS line including its newline
    static ref NS_LINE_RE: Regex = Regex::new(r"@\s+IN\s+NS\s+.*\n").unwrap();
    /// Closing parenthesis of the SOA block followed by its comment
    static ref SOA_END_RE: Regex = Regex::new(r"\)\s*;").unwrap();
}

/// `^host\s+.*TYPE`, optionally running on to the end of the line.
fn record_pattern(hostname: &str, rrtype: Option<&str>, whole_line: bool) -> Result<Regex, ZoneError> {
    let host = regex::escape(hostname);
    let rrtype = rrtype
        .map(|t| format!(".*{}", regex::escape(t)))
        .unwrap_or_default();
    let tail = if whole_line { r".*\n" } else { "" };
    Regex::new(&format!(r"(?m)^{host}\s+{rrtype}{tail}"))
        .map_err(|e| ZoneError::invalid(e.to_string()))
}

/// True when a line starts with `hostname` and mentions `rrtype` later on.
///
/// The type is matched as given, so `A` also hits an `AAAA` line for the host,
/// and the apex `@ ... SOA` header for `@`.
pub fn find_existing(zone: &str, hostname: &str, rrtype: &str) -> Result<bool, ZoneError> {
    Ok(record_pattern(hostname, Some(rrtype), false)?.is_match(zone))
}

/// Byte offset where a new record line belongs.
///
/// After the contiguous run of apex NS lines; else after the line closing the
/// SOA block; else end of file.
pub fn insertion_point(zone: &str) -> usize {
    if let Some(ns) = NS_LINE_RE.find(zone) {
        let mut end = ns.end();
        while let Some(next) = NS_LINE_RE.find_at(zone, end) {
            let between = &zone[end..next.start()];
            if next.start() != end && !between.chars().all(|c| c == ' ' || c == '\t') {
                break;
            }
            end = next.end();
        }
        return end;
    }

    if let Some(soa) = SOA_END_RE.find(zone) {
        return match zone[soa.end()..].find('\n') {
            Some(nl) => soa.end() + nl + 1,
            None => zone.len(),
        };
    }

    zone.len()
}

/// Insert `line` at `offset`, adding a separating newline when the zone
/// ends mid-line.
pub fn splice(zone: &str, offset: usize, line: &str) -> String {
    let mut out = String::with_capacity(zone.len() + line.len() + 1);
    out.push_str(&zone[..offset]);
    if offset > 0 && offset == zone.len() && !zone.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(line);
    out.push_str(&zone[offset..]);
    out
}

/// Delete every newline-terminated line for `hostname` (and `rrtype`, if
/// given). Returns the new text and how many lines went away.
pub fn remove_matching(
    zone: &str,
    hostname: &str,
    rrtype: Option<&str>,
) -> Result<(String, usize), ZoneError> {
    let re = record_pattern(hostname, rrtype, true)?;
    let count = re.find_iter(zone).count();
    if count == 0 {
        return Ok((zone.to_string(), 0));
    }
    Ok((re.replace_all(zone, "").into_owned(), count))
}
