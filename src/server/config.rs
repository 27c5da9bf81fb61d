//! Configuration for hosting a router.

use serde::Deserialize;

/// Settings for the axum adapter.
///
/// # Examples
///
/// ```
/// use routewire::server::ServerConfig;
///
/// let config = ServerConfig {
///     max_body_bytes: 64 * 1024,
///     ..Default::default()
/// };
/// assert!(config.log_handler_errors);
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Largest request body accepted; larger bodies get 413.
    pub max_body_bytes: usize,
    /// Log 500 outcomes with their handler error.
    pub log_handler_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
            log_handler_errors: true,
        }
    }
}
