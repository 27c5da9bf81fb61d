//! Utility functions for the outbound client.
//!
//! This module provides helpers for:
//! - Retry delays with exponential backoff
//! - Status code classification
//! - Redirect target resolution

use crate::error::{Error, Result};
use crate::types::Method;
use std::time::Duration;
use url::Url;

/// Exponential backoff delay for the given zero-based retry number.
///
/// The delay doubles per retry and stops growing after ten doublings.
///
/// # Examples
///
/// ```
/// use routewire::client::exponential_backoff;
/// use std::time::Duration;
///
/// assert_eq!(exponential_backoff(0, Duration::from_millis(100)), Duration::from_millis(100));
/// assert_eq!(exponential_backoff(2, Duration::from_millis(100)), Duration::from_millis(400));
/// ```
pub fn exponential_backoff(retry: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.pow(retry.min(10)))
}

/// Check if a status is one the client follows as a redirect.
pub fn is_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Check if a status is a client or server error.
pub fn is_error_status(status: u16) -> bool {
    (400..600).contains(&status)
}

/// Validate an absolute `http`/`https` URL.
pub fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
    check_http_url(url)
}

pub(crate) fn check_http_url(url: Url) -> Result<Url> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{}: unsupported protocol {:?}",
            url,
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUrl(format!("{}: missing host", url)));
    }
    Ok(url)
}

/// Resolve a `Location` header against the URL that produced it.
///
/// A bad location is a server fault, so it surfaces as a retryable
/// transport error rather than a construction error.
pub fn resolve_location(base: &Url, location: &str) -> Result<Url> {
    base.join(location)
        .map_err(|e| Error::Transport(format!("invalid redirect location {:?}: {}", location, e)))
        .and_then(|url| {
            check_http_url(url).map_err(|e| Error::Transport(format!("redirect rejected: {}", e)))
        })
}

/// Method to use when following a redirect with this status.
///
/// 303 always becomes GET; 301 and 302 turn a POST into a GET, as browsers
/// do. 307 and 308 keep the method.
pub fn redirect_method(status: u16, method: Method) -> Method {
    match (status, method) {
        (303, Method::Head) => Method::Head,
        (303, _) => Method::Get,
        (301 | 302, Method::Post) => Method::Get,
        (_, method) => method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let base = Duration::from_millis(100);
        let delay0 = exponential_backoff(0, base);
        let delay1 = exponential_backoff(1, base);
        assert!(delay1 > delay0);
        assert_eq!(exponential_backoff(20, base), exponential_backoff(10, base));
        assert_eq!(exponential_backoff(3, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_status_classification() {
        assert!(is_redirect_status(302));
        assert!(!is_redirect_status(304));
        assert!(is_error_status(404));
        assert!(is_error_status(503));
        assert!(!is_error_status(302));
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://example.com/a?b=c").is_ok());
        assert!(matches!(parse_http_url("/relative"), Err(Error::InvalidUrl(_))));
        assert!(matches!(parse_http_url("ftp://example.com/file"), Err(Error::InvalidUrl(_))));
        assert!(matches!(parse_http_url("mailto:someone@example.com"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_resolve_location() {
        let base = Url::parse("http://example.com/a/b?x=1").unwrap();
        assert_eq!(resolve_location(&base, "/c").unwrap().as_str(), "http://example.com/c");
        assert_eq!(resolve_location(&base, "d").unwrap().as_str(), "http://example.com/a/d");
        assert_eq!(
            resolve_location(&base, "https://other.org/").unwrap().as_str(),
            "https://other.org/"
        );
        assert!(matches!(resolve_location(&base, "ftp://x/"), Err(Error::Transport(_))));
    }

    #[test]
    fn test_redirect_method() {
        assert_eq!(redirect_method(303, Method::Put), Method::Get);
        assert_eq!(redirect_method(302, Method::Post), Method::Get);
        assert_eq!(redirect_method(307, Method::Post), Method::Post);
        assert_eq!(redirect_method(301, Method::Delete), Method::Delete);
    }
}
