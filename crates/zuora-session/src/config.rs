//! Session configuration.

use serde::{Deserialize, Serialize};

/// Configuration for Session behavior.
///
/// Connection settings and credentials belong to the transport, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Log every rendered request body at debug level.
    pub log_payloads: bool,
    /// Count association lookups per (record type, association).
    pub track_lookups: bool,
    /// Lookup count at which a repeated-lookup warning is emitted.
    pub lookup_warn_threshold: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_payloads: false,
            track_lookups: true,
            lookup_warn_threshold: 3,
        }
    }
}

impl SessionConfig {
    /// Parse from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    #[must_use]
    pub fn with_lookup_tracking(mut self, enabled: bool) -> Self {
        self.track_lookups = enabled;
        self
    }

    #[must_use]
    pub fn with_lookup_warn_threshold(mut self, threshold: usize) -> Self {
        self.lookup_warn_threshold = threshold;
        self
    }
}
