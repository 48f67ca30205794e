use regex::Regex;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("hostname is empty")]
    EmptyHostname,
    #[error("hostname too long (max 253 characters)")]
    HostnameTooLong,
    #[error("hostname contains invalid characters (only letters, digits, '-', '_', '.', '*' and '@' allowed)")]
    InvalidHostname,
    #[error("record type is empty")]
    EmptyType,
    #[error("record type must be alphanumeric")]
    InvalidType,
    #[error("record value is empty")]
    EmptyValue,
    #[error("record value must be a single line")]
    MultilineValue,
    #[error("TXT value must not contain '\"'")]
    QuoteInTxt,
}

lazy_static::lazy_static! {
    /// Owner names as they appear in the first column of a zone line
    static ref HOSTNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_*@.-]+$").unwrap();
    static ref RRTYPE_RE: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
}

pub fn validate_hostname(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyHostname);
    }
    if name.len() > 253 {
        return Err(ValidationError::HostnameTooLong);
    }
    if !HOSTNAME_RE.is_match(name) {
        return Err(ValidationError::InvalidHostname);
    }
    Ok(())
}

pub fn validate_rrtype(rrtype: &str) -> Result<(), ValidationError> {
    if rrtype.is_empty() {
        return Err(ValidationError::EmptyType);
    }
    if !RRTYPE_RE.is_match(rrtype) {
        return Err(ValidationError::InvalidType);
    }
    Ok(())
}

/// A value is spliced verbatim into one zone line, so it must stay on one.
pub fn validate_value(value: &str, is_txt: bool) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyValue);
    }
    if value.contains(['\n', '\r']) {
        return Err(ValidationError::MultilineValue);
    }
    if is_txt && value.contains('"') {
        return Err(ValidationError::QuoteInTxt);
    }
    Ok(())
}
