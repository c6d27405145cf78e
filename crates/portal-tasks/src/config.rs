//! Maintenance task configuration.

use serde::{Deserialize, Serialize};

/// Retention settings for the maintenance tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Age in seconds after which an application draft is purged.
    /// Defaults to 30 days.
    #[serde(default = "default_draft_ttl")]
    pub draft_ttl_secs: u64,

    /// Age in seconds after which a session file is swept.
    /// Defaults to 24 hours.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_draft_ttl() -> u64 {
    30 * 24 * 60 * 60
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            draft_ttl_secs: default_draft_ttl(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retention() {
        let config = MaintenanceConfig::default();
        assert_eq!(config.draft_ttl_secs, 2_592_000);
        assert_eq!(config.session_ttl_secs, 86_400);
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: MaintenanceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.draft_ttl_secs, 2_592_000);
        assert_eq!(config.session_ttl_secs, 86_400);

        let config: MaintenanceConfig =
            serde_json::from_str(r#"{"session_ttl_secs": 600}"#).unwrap();
        assert_eq!(config.session_ttl_secs, 600);
        assert_eq!(config.draft_ttl_secs, 2_592_000);
    }
}
