use crate::utils::error::{Result, SyncError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> SyncError {
    SyncError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// The catalog root: request paths are appended to it, so it must be a bare
/// http(s) origin with no query or fragment.
pub fn validate_base_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid(field, raw, format!("not a URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, raw, "only http and https are supported"));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, raw, "a host is required"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field, raw, "remove the query string or fragment"));
    }
    Ok(url)
}

/// A file the crate reads or creates. It may not exist yet, but it must not
/// name a directory.
pub fn validate_file_path(field: &str, raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(invalid(field, raw, "a file path is required"));
    }
    if raw.contains('\0') {
        return Err(invalid(field, raw.escape_default(), "path contains a NUL byte"));
    }
    if Path::new(raw).is_dir() {
        return Err(invalid(field, raw, "expected a file but found a directory"));
    }
    Ok(())
}

/// `min..=max`, or just `min..` when there is no upper bound.
pub fn validate_bounded(field: &str, value: u64, min: u64, max: Option<u64>) -> Result<()> {
    match max {
        Some(max) if value < min || value > max => Err(invalid(
            field,
            value,
            format!("must be between {} and {}", min, max),
        )),
        None if value < min => Err(invalid(field, value, format!("must be at least {}", min))),
        _ => Ok(()),
    }
}

/// Cookies travel as a raw header, so only visible ASCII is accepted.
pub fn validate_header_value(field: &str, raw: &str) -> Result<()> {
    match raw.chars().find(|c| !(c.is_ascii_graphic() || *c == ' ')) {
        Some(c) => Err(invalid(
            field,
            "<redacted>",
            format!("contains a character not allowed in a header: {:?}", c),
        )),
        None => Ok(()),
    }
}
