//! Error types for the portal scheduler system.

use thiserror::Error;

/// Unified error type for configuration loading.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = PortalError::Config("missing data_dir".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing data_dir"));
    }
}
