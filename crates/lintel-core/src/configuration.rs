//! Typed, validated rule configuration.
//!
//! A rule's configuration is a serde struct bound from the loosely typed
//! TOML table found under `[rules.<identifier>]`. Binding rejects unknown
//! keys and wrong value types; [`RuleConfiguration::validate`] then checks
//! numeric ranges.

use crate::error::ConfigurationError;
use crate::types::Severity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Behavior shared by every rule configuration.
pub trait RuleConfiguration: DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Severity of violations that do not pick their own.
    fn severity(&self) -> Severity;

    /// Checks value ranges after deserialization.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending setting.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Binds `payload` to `C` and validates it.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidPayload`] for unknown keys or
/// mistyped values and [`ConfigurationError::OutOfRange`] when validation
/// fails.
pub fn bind<C: RuleConfiguration>(
    rule_id: &str,
    payload: &toml::Table,
) -> Result<C, ConfigurationError> {
    let configuration: C = toml::Value::Table(payload.clone())
        .try_into()
        .map_err(|e: toml::de::Error| ConfigurationError::InvalidPayload {
            rule_id: rule_id.to_string(),
            message: e.message().to_string(),
        })?;
    configuration
        .validate()
        .map_err(|message| ConfigurationError::OutOfRange {
            rule_id: rule_id.to_string(),
            message,
        })?;
    Ok(configuration)
}

/// Configuration for rules whose only setting is the severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SeverityConfiguration {
    /// Violation severity.
    pub severity: Severity,
}

impl RuleConfiguration for SeverityConfiguration {
    fn severity(&self) -> Severity {
        self.severity
    }
}

/// Warning and error thresholds for a measured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityLevels {
    /// Threshold that produces a warning.
    pub warning: usize,
    /// Threshold that produces an error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<usize>,
}

impl SeverityLevels {
    /// Thresholds with both levels set.
    #[must_use]
    pub const fn new(warning: usize, error: usize) -> Self {
        Self {
            warning,
            error: Some(error),
        }
    }

    /// Severity for a value that must not exceed the thresholds.
    #[must_use]
    pub fn severity_above(&self, value: usize) -> Option<Severity> {
        if self.error.is_some_and(|error| value > error) {
            Some(Severity::Error)
        } else if value > self.warning {
            Some(Severity::Warning)
        } else {
            None
        }
    }

    /// Severity for a value that must not fall below the thresholds.
    #[must_use]
    pub fn severity_below(&self, value: usize) -> Option<Severity> {
        if self.error.is_some_and(|error| value < error) {
            Some(Severity::Error)
        } else if value < self.warning {
            Some(Severity::Warning)
        } else {
            None
        }
    }

    /// Checks that the error threshold is at least the warning threshold.
    ///
    /// # Errors
    ///
    /// Returns a message naming `key`.
    pub fn validate_as_maximum(&self, key: &str) -> Result<(), String> {
        match self.error {
            Some(error) if error < self.warning => Err(format!(
                "'{key}': error threshold {error} is below warning threshold {}",
                self.warning
            )),
            _ => Ok(()),
        }
    }

    /// Checks that the error threshold is at most the warning threshold.
    ///
    /// # Errors
    ///
    /// Returns a message naming `key`.
    pub fn validate_as_minimum(&self, key: &str) -> Result<(), String> {
        match self.error {
            Some(error) if error > self.warning => Err(format!(
                "'{key}': error threshold {error} is above warning threshold {}",
                self.warning
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(deny_unknown_fields, default)]
    struct LengthConfiguration {
        severity: Severity,
        length: SeverityLevels,
    }

    impl Default for LengthConfiguration {
        fn default() -> Self {
            Self {
                severity: Severity::Warning,
                length: SeverityLevels::new(10, 20),
            }
        }
    }

    impl RuleConfiguration for LengthConfiguration {
        fn severity(&self) -> Severity {
            self.severity
        }

        fn validate(&self) -> Result<(), String> {
            self.length.validate_as_maximum("length")
        }
    }

    fn table(text: &str) -> toml::Table {
        text.parse().unwrap()
    }

    #[test]
    fn empty_payload_yields_defaults() {
        let config: LengthConfiguration = bind("length", &toml::Table::new()).unwrap();
        assert_eq!(config.length, SeverityLevels::new(10, 20));
        assert_eq!(config.severity(), Severity::Warning);
    }

    #[test]
    fn payload_overrides_fields() {
        let config: LengthConfiguration =
            bind("length", &table("severity = \"error\"\nlength = { warning = 3 }")).unwrap();
        assert_eq!(config.severity, Severity::Error);
        assert_eq!(config.length.warning, 3);
        assert_eq!(config.length.error, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = bind::<LengthConfiguration>("length", &table("lenght = 3")).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPayload { .. }));
        assert!(err.to_string().contains("lenght"));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = bind::<LengthConfiguration>("length", &table("severity = 3")).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPayload { .. }));
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        let err = bind::<LengthConfiguration>(
            "length",
            &table("length = { warning = 30, error = 20 }"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::OutOfRange { .. }));
    }

    #[test]
    fn thresholds() {
        let levels = SeverityLevels::new(10, 20);
        assert_eq!(levels.severity_above(10), None);
        assert_eq!(levels.severity_above(11), Some(Severity::Warning));
        assert_eq!(levels.severity_above(21), Some(Severity::Error));

        let minimum = SeverityLevels::new(3, 2);
        assert_eq!(minimum.severity_below(3), None);
        assert_eq!(minimum.severity_below(2), Some(Severity::Warning));
        assert_eq!(minimum.severity_below(1), Some(Severity::Error));
    }
}
