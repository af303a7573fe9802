// crates/core/src/error.rs
use thiserror::Error;

/// Errors that can occur when loading or validating a [`crate::FlattenConfig`].
///
/// The flattening pipeline itself never fails; only configuration does.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed TOML in flatten config: {message}")]
    MalformedToml { message: String },

    #[error("orphan_recovery_threshold must be within [0, 1], got {value}")]
    ThresholdOutOfRange { value: f64 },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::MalformedToml {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ThresholdOutOfRange { value: 1.5 };
        assert!(err.to_string().contains("1.5"));
        assert!(err.to_string().contains("[0, 1]"));
    }

    #[test]
    fn test_config_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err = ConfigError::from(toml_err);
        assert!(matches!(err, ConfigError::MalformedToml { .. }));
        assert!(err.to_string().contains("Malformed TOML"));
    }
}
