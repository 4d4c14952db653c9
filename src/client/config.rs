//! Client configuration options.

use std::time::Duration;

use crate::resource::SaveMode;

/// Configuration for a [`Core`](crate::Core) instance.
///
/// # Example
///
/// ```
/// use hal_client::{ClientConfig, SaveMode};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_default_save_mode(SaveMode::Merge);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout, enforced by the transport.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Write verb used by `save()` when no per-call override is given.
    ///
    /// The save body is always the dirty-properties diff; this only
    /// selects whether it travels as a full overwrite (PUT) or a
    /// partial update (PATCH).
    pub default_save_mode: SaveMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("hal-client-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            default_save_mode: SaveMode::Replace,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the default write verb for `save()`.
    pub fn with_default_save_mode(mut self, mode: SaveMode) -> Self {
        self.default_save_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.default_save_mode, SaveMode::Replace);
        assert!(config.user_agent.starts_with("hal-client-rs/"));
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("my-app/1.0")
            .with_default_save_mode(SaveMode::Merge);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "my-app/1.0");
        assert_eq!(config.default_save_mode, SaveMode::Merge);
    }
}
