//! Speed change settings
//!
//! The six options a user picks for one application of the per-layer speed
//! change: where it starts, how many layers it covers, and which of the print
//! and fan speeds it overrides. Settings arrive either as a host-supplied
//! key/value mapping or from a JSON/TOML file.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SettingsError, SettingsResult};

/// Lowest accepted `layer_number`
pub const MIN_LAYER_NUMBER: i64 = -100;
/// Duty units corresponding to 100% fan speed
pub const MAX_FAN_DUTY: f64 = 255.0;

/// A scalar setting value as handed over by a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    fn as_int(&self, key: &str) -> SettingsResult<i64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Float(v) if v.fract() == 0.0 => Ok(*v as i64),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| SettingsError::invalid(key, format!("'{}' is not an integer", s))),
            other => Err(SettingsError::invalid(
                key,
                format!("expected an integer, got {:?}", other),
            )),
        }
    }

    fn as_bool(&self, key: &str) -> SettingsResult<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            Self::Text(s) => s
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|_| SettingsError::invalid(key, format!("'{}' is not a boolean", s))),
            other => Err(SettingsError::invalid(
                key,
                format!("expected a boolean, got {:?}", other),
            )),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Settings for one application of the speed change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedChangeSettings {
    /// Layer number as shown in the slicer preview (1-based)
    pub layer_number: i64,
    /// How many layers in total the change is applied to
    pub number_of_layers: i64,
    /// Override the print and travel speed
    pub change_print_speed: bool,
    /// Print speed as a percentage of the original slicer speed
    pub print_speed: i64,
    /// Override the fan speed
    pub change_fan_speed: bool,
    /// Fan speed as a percentage of full duty
    pub fan_speed: i64,
}

impl Default for SpeedChangeSettings {
    fn default() -> Self {
        Self {
            layer_number: 1,
            number_of_layers: 1,
            change_print_speed: false,
            print_speed: 100,
            change_fan_speed: false,
            fan_speed: 100,
        }
    }
}

impl SpeedChangeSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from a host key/value mapping
    ///
    /// Missing keys keep their defaults and unknown keys are ignored.
    pub fn from_values(values: &HashMap<String, SettingValue>) -> SettingsResult<Self> {
        let mut settings = Self::default();

        for (key, value) in values {
            match key.as_str() {
                "layer_number" => settings.layer_number = value.as_int(key)?,
                "number_of_layers" => settings.number_of_layers = value.as_int(key)?,
                "change_print_speed" => settings.change_print_speed = value.as_bool(key)?,
                "print_speed" => settings.print_speed = value.as_int(key)?,
                "change_fan_speed" => settings.change_fan_speed = value.as_bool(key)?,
                "fan_speed" => settings.fan_speed = value.as_int(key)?,
                other => tracing::debug!("Ignoring unknown setting '{}'", other),
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(format!(
                "{} (must be .json or .toml)",
                path.display()
            )));
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::UnsupportedFormat(format!(
                "{} (must be .json or .toml)",
                path.display()
            )));
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the hard bounds of the schema and log the soft ones
    ///
    /// `number_of_layers` is never rejected; values below one are clamped
    /// when the settings are used.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.layer_number < MIN_LAYER_NUMBER {
            return Err(SettingsError::invalid(
                "layer_number",
                format!("must be at least {}", MIN_LAYER_NUMBER),
            ));
        }

        if self.print_speed < 1 {
            return Err(SettingsError::invalid("print_speed", "must be at least 1"));
        }

        if !(1..=100).contains(&self.fan_speed) {
            return Err(SettingsError::invalid("fan_speed", "must be between 1 and 100"));
        }

        for warning in self.warnings() {
            tracing::warn!("{}", warning);
        }

        Ok(())
    }

    /// Values that are accepted but outside the recommended range
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.layer_number < 1 {
            warnings.push(format!(
                "layer_number {} is below the first printed layer",
                self.layer_number
            ));
        }
        if self.number_of_layers < 1 {
            warnings.push(format!(
                "number_of_layers {} will be treated as 1",
                self.number_of_layers
            ));
        } else if self.number_of_layers > 50 {
            warnings.push(format!(
                "number_of_layers {} is unusually large",
                self.number_of_layers
            ));
        }
        if self.change_print_speed && !(10..=150).contains(&self.print_speed) {
            warnings.push(format!(
                "print_speed {}% is outside the recommended 10-150% range",
                self.print_speed
            ));
        }
        if self.change_fan_speed && self.fan_speed < 10 {
            warnings.push(format!(
                "fan_speed {}% may be too low to spin the fan",
                self.fan_speed
            ));
        }

        warnings
    }

    /// First affected layer as numbered in the G-code (0-based)
    pub fn target_layer(&self) -> i64 {
        self.layer_number.saturating_sub(1)
    }

    /// Number of affected layers, never below one
    pub fn layer_count(&self) -> i64 {
        self.number_of_layers.max(1)
    }

    /// Layer at whose start the original speeds are restored
    pub fn end_layer(&self) -> i64 {
        self.target_layer().saturating_add(self.layer_count())
    }

    /// Fan duty (0-255) corresponding to `fan_speed`
    pub fn fan_duty(&self) -> f64 {
        MAX_FAN_DUTY * self.fan_speed as f64 / 100.0
    }

    /// Declarative settings description for hosts that render a settings form
    pub fn schema_json() -> serde_json::Value {
        json!({
            "name": format!("Speed Change By Layer {}", env!("CARGO_PKG_VERSION")),
            "key": "SpeedChangeByLayer",
            "metadata": {},
            "version": 2,
            "settings": {
                "layer_number": {
                    "label": "Preview Layer No.",
                    "description": "Layer number from the slicer preview to start the speed change on",
                    "unit": "",
                    "type": "int",
                    "default_value": 1,
                    "minimum_value": MIN_LAYER_NUMBER,
                    "minimum_value_warning": 1
                },
                "number_of_layers": {
                    "label": "How Many Layers Total",
                    "description": "How many layers total this speed change is applied to",
                    "unit": "",
                    "type": "int",
                    "default_value": 1,
                    "minimum_value": 1,
                    "maximum_value_warning": 50
                },
                "change_print_speed": {
                    "label": "Change Print Speed",
                    "description": "Select to change the print speed (print & travel)",
                    "type": "bool",
                    "default_value": false
                },
                "print_speed": {
                    "label": "Print Speed",
                    "description": "Percentage of the original slicer speed (print & travel)",
                    "unit": "%",
                    "type": "int",
                    "default_value": 100,
                    "minimum_value": 1,
                    "minimum_value_warning": 10,
                    "maximum_value_warning": 150,
                    "enabled": "change_print_speed"
                },
                "change_fan_speed": {
                    "label": "Change Fan Speed",
                    "description": "Select to change the fan speed",
                    "type": "bool",
                    "default_value": false
                },
                "fan_speed": {
                    "label": "Fan Speed",
                    "description": "New fan speed as percentage of 100% [% of 255]",
                    "unit": "%",
                    "type": "int",
                    "default_value": 100,
                    "minimum_value": 1,
                    "maximum_value": 100,
                    "minimum_value_warning": 10,
                    "enabled": "change_fan_speed"
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, SettingValue)]) -> HashMap<String, SettingValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = SpeedChangeSettings::new();
        assert_eq!(settings.target_layer(), 0);
        assert_eq!(settings.end_layer(), 1);
        assert!(!settings.change_print_speed);
        assert!(!settings.change_fan_speed);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_values() {
        let settings = SpeedChangeSettings::from_values(&values(&[
            ("layer_number", 4.into()),
            ("number_of_layers", SettingValue::Float(2.0)),
            ("change_fan_speed", "True".into()),
            ("fan_speed", 50.into()),
            ("some_other_plugin_key", "x".into()),
        ]))
        .unwrap();

        assert_eq!(settings.target_layer(), 3);
        assert_eq!(settings.end_layer(), 5);
        assert!(settings.change_fan_speed);
        assert_eq!(settings.fan_duty(), 127.5);
    }

    #[test]
    fn test_from_values_rejects_wrong_type() {
        let err = SpeedChangeSettings::from_values(&values(&[("print_speed", true.into())]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidSetting { ref key, .. } if key == "print_speed"));
    }

    #[test]
    fn test_layer_count_clamps() {
        let settings = SpeedChangeSettings {
            number_of_layers: -3,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.layer_count(), 1);
        assert_eq!(settings.warnings().len(), 1);
    }

    #[test]
    fn test_layer_range_saturates() {
        let settings = SpeedChangeSettings {
            layer_number: 2,
            number_of_layers: i64::MAX,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.target_layer(), 1);
        assert_eq!(settings.end_layer(), i64::MAX);

        let lowest = SpeedChangeSettings {
            layer_number: i64::MIN,
            ..Default::default()
        };
        assert_eq!(lowest.target_layer(), i64::MIN);
    }

    #[test]
    fn test_hard_bounds() {
        let too_low = SpeedChangeSettings {
            layer_number: -101,
            ..Default::default()
        };
        assert!(too_low.validate().is_err());

        let fan = SpeedChangeSettings {
            fan_speed: 101,
            ..Default::default()
        };
        assert!(fan.validate().is_err());

        let print = SpeedChangeSettings {
            print_speed: 0,
            ..Default::default()
        };
        assert!(print.validate().is_err());
    }

    #[test]
    fn test_schema_defaults_match_struct() {
        let schema = SpeedChangeSettings::schema_json();
        let defaults = SpeedChangeSettings::default();
        let settings = &schema["settings"];

        assert_eq!(settings["layer_number"]["default_value"], defaults.layer_number);
        assert_eq!(settings["fan_speed"]["maximum_value"], 100);
        assert_eq!(settings["print_speed"]["enabled"], "change_print_speed");
        assert_eq!(schema["key"], "SpeedChangeByLayer");
    }
}
