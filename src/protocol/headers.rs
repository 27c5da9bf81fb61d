//! Shared header parsing and formatting.
//!
//! Validation rules and small header-value codecs used by both the outbound
//! client and the router.
//!
//! # Header Formats
//!
//! | Header | Format | Example |
//! |--------|--------|---------|
//! | Authorization (Basic) | `Basic base64(user:pass)` | `Basic dXNlcjpwYXNz` |
//! | Authorization (Bearer) | `Bearer {token}` | `Bearer abc` |
//! | Content-Type | `{media-type}[; charset={name}]` | `text/html; charset=ISO-8859-1` |
//!
//! # Examples
//!
//! ```
//! use routewire::protocol::{format_basic_auth, parse_charset, validate_header};
//! use routewire::Charset;
//!
//! assert!(validate_header("X-Request-Id", "42").is_ok());
//! assert!(validate_header("Bad Name", "42").is_err());
//!
//! assert_eq!(format_basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
//! assert_eq!(parse_charset("text/plain; charset=latin1"), Some(Charset::Latin1));
//! ```

use crate::error::{Error, Result};
use crate::types::Charset;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Validate a header pair for the builder-facing APIs.
///
/// Names must be non-empty and drawn from `[A-Za-z0-9-_.]`; values must not
/// contain carriage returns or line feeds.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] describing the first violation.
pub fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_header(name, "name is empty"));
    }
    if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(Error::invalid_header(
            name,
            format!("name contains {:?}", bad),
        ));
    }
    if value.contains(['\r', '\n']) {
        return Err(Error::invalid_header(name, "value contains CR or LF"));
    }
    Ok(())
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Format an `Authorization: Basic` value.
pub fn format_basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

/// Format an `Authorization: Bearer` value.
#[inline]
pub fn format_bearer_auth(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Decode an `Authorization: Basic` value into `(user, password)`.
///
/// Returns `None` for other schemes or malformed payloads.
pub fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    let (scheme, payload) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(payload.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Extract the charset parameter from a `Content-Type` value.
///
/// Returns `None` when there is no `charset` parameter or the name is not
/// one the crate can decode.
pub fn parse_charset(content_type: &str) -> Option<Charset> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Charset::from_label(value.trim().trim_matches('"')))
}

/// Build a `Content-Type` value, appending the charset for textual types
/// that do not already name one.
pub fn content_type_with_charset(content_type: &str, charset: Charset) -> String {
    let lower = content_type.to_ascii_lowercase();
    let textual = lower.starts_with("text/") || lower.contains("x-www-form-urlencoded");
    if textual && !lower.contains("charset=") {
        format!("{}; charset={}", content_type, charset.name())
    } else {
        content_type.to_string()
    }
}
