use regex::Regex;

lazy_static::lazy_static! {
    /// owner, whitespace, ..., IN, whitespace
    static ref RECORD_LINE_RE: Regex = Regex::new(r"^\S+\s+.*IN\s+").unwrap();
}

fn is_reported(line: &str) -> bool {
    if line.is_empty() || line.starts_with(';') || line.starts_with('$') {
        return false;
    }
    if line.contains("SOA") || (line.starts_with('@') && line.contains("NS")) {
        return false;
    }
    RECORD_LINE_RE.is_match(line)
}

/// Trimmed record lines of `zone`, minus SOA, apex NS, comments and
/// directives. The iterator is lazy and can be cloned to restart.
pub fn list(zone: &str) -> impl Iterator<Item = &str> + Clone + '_ {
    zone.lines().map(str::trim).filter(|line| is_reported(line))
}
