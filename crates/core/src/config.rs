// crates/core/src/config.rs
//! Tunables for the flattening pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum gap between consecutive task-tool events in one operation group.
pub const DEFAULT_TASK_OPERATION_WINDOW_MS: u64 = 5_000;

/// Share of messages root traversal must reach before recovery counts as a
/// fallback rather than routine stragglers.
pub const DEFAULT_ORPHAN_RECOVERY_THRESHOLD: f64 = 0.9;

/// Keys are snake_case in TOML; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlattenConfig {
    /// Inclusive: events exactly this far apart still join one group.
    pub task_operation_window_ms: u64,
    pub orphan_recovery_threshold: f64,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            task_operation_window_ms: DEFAULT_TASK_OPERATION_WINDOW_MS,
            orphan_recovery_threshold: DEFAULT_ORPHAN_RECOVERY_THRESHOLD,
        }
    }
}

impl FlattenConfig {
    /// Parse from TOML.
    ///
    /// ```toml
    /// task_operation_window_ms = 5000
    /// orphan_recovery_threshold = 0.9
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.orphan_recovery_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::ThresholdOutOfRange { value: t });
        }
        Ok(())
    }

    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.task_operation_window_ms = window_ms;
        self
    }

    pub fn with_orphan_threshold(mut self, threshold: f64) -> Self {
        self.orphan_recovery_threshold = threshold;
        self
    }

    pub(crate) fn window_ms(&self) -> i64 {
        i64::try_from(self.task_operation_window_ms).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = FlattenConfig::default();
        assert_eq!(config.task_operation_window_ms, 5000);
        assert_eq!(config.orphan_recovery_threshold, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = FlattenConfig::from_toml_str("task_operation_window_ms = 2500\n").unwrap();
        assert_eq!(
            config,
            FlattenConfig {
                task_operation_window_ms: 2500,
                orphan_recovery_threshold: 0.9,
            }
        );
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(FlattenConfig::from_toml_str("").unwrap(), FlattenConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_unknown_key() {
        let err = FlattenConfig::from_toml_str("window = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedToml { .. }));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = FlattenConfig::from_toml_str("orphan_recovery_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdOutOfRange { .. }));

        let config = FlattenConfig::default().with_orphan_threshold(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_ms_saturates() {
        let config = FlattenConfig::default().with_window_ms(u64::MAX);
        assert_eq!(config.window_ms(), i64::MAX);
    }
}
