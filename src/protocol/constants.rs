//! Protocol constants shared by the client and the router.

use std::time::Duration;

/// Header names used by the crate.
pub mod headers {
    /// `Authorization`
    pub const AUTHORIZATION: &str = "Authorization";
    /// `Content-Type`
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// `Location`
    pub const LOCATION: &str = "Location";
    /// `Allow`
    pub const ALLOW: &str = "Allow";
    /// `Cache-Control`
    pub const CACHE_CONTROL: &str = "Cache-Control";
    /// `Access-Control-Allow-Origin`
    pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    /// `Access-Control-Allow-Methods`
    pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    /// `Access-Control-Allow-Credentials`
    pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
    /// `Access-Control-Allow-Headers`
    pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
}

/// Content types the crate sets on its own.
pub mod media_types {
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    pub const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";
    pub const JSON: &str = "application/json";
}

/// Headers every router response starts from. Handler headers win on
/// conflict.
pub const DEFAULT_RESPONSE_HEADERS: [(&str, &str); 5] = [
    (headers::CACHE_CONTROL, "no-cache"),
    (headers::ALLOW_ORIGIN, "*"),
    (headers::ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS"),
    (headers::ALLOW_CREDENTIALS, "true"),
    (headers::ALLOW_HEADERS, "Content-Type, Accept, X-Requested-With"),
];

/// Environment switch forcing the legacy transport.
pub const FORCE_LEGACY_TRANSPORT_ENV: &str = "ROUTEWIRE_FORCE_LEGACY_TRANSPORT";

/// Send attempts per request unless overridden.
pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Per-attempt timeout unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Redirect hops followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
