//! Configuration handling
//!
//! Custom field types can be declared in a JSON file instead of code. Reset
//! behavior from config is limited to clearing the live handle.

use crate::error::{ConfigError, Result};
use crate::registry::{FieldType, ValidityRule};
use crate::state::FieldValue;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A field type declared in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldSpec {
    pub value_prop: String,
    pub callback_prop: String,
    #[serde(default)]
    pub controlled: bool,
    #[serde(default)]
    pub default_value: Option<FieldValue>,
    #[serde(default)]
    pub validity: ValidityRule,
    /// Clear the live handle when the form is reset
    #[serde(default)]
    pub clear_on_reset: bool,
}

impl CustomFieldSpec {
    pub fn to_field_type(&self) -> FieldType {
        let mut field_type = FieldType::new(&self.value_prop, &self.callback_prop)
            .validity(self.validity);
        field_type.controlled = self.controlled;
        field_type.default_value = self.default_value.clone();
        if self.clear_on_reset {
            field_type = field_type.on_reset(|handle, _| handle.clear());
        }
        field_type
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Extra field types keyed by type name
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldSpec>,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: Option<String>,
}

impl FormConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "formtree", "formtree")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)
    }

    /// Custom field types ready to layer over the built-in registry
    pub fn field_types(&self) -> Vec<(String, FieldType)> {
        self.custom_fields
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_field_type()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockControlHandle;
    use crate::state::Field;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "custom_fields": {
            "Rating": {
                "value_prop": "stars",
                "callback_prop": "onRate",
                "controlled": true,
                "default_value": 3.0,
                "validity": "truthy",
                "clear_on_reset": true
            },
            "Tags": {
                "value_prop": "tags",
                "callback_prop": "onTagsChange"
            }
        },
        "log_filter": "formtree=debug"
    }"#;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert!(config.custom_fields.is_empty());
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_parse_sample() {
        let config = FormConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("formtree=debug"));

        let rating = &config.custom_fields["Rating"];
        assert!(rating.controlled);
        assert_eq!(rating.default_value, Some(FieldValue::from(3.0)));
        assert_eq!(rating.validity, ValidityRule::Truthy);

        let tags = &config.custom_fields["Tags"];
        assert!(!tags.controlled);
        assert_eq!(tags.validity, ValidityRule::Never);
        assert!(!tags.clear_on_reset);
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed = FormConfig::from_json_str("{}").unwrap();
        assert!(parsed.custom_fields.is_empty());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Unknown keys are ignored
        let parsed = FormConfig::from_json_str(r#"{"log_filter": "warn", "theme": "dark"}"#).unwrap();
        assert_eq!(parsed.log_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = FormConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_field_types_follow_specs() {
        let config = FormConfig::from_json_str(SAMPLE).unwrap();
        let types: BTreeMap<_, _> = config.field_types().into_iter().collect();

        let rating = &types["Rating"];
        assert_eq!(rating.value_prop, "stars");
        assert_eq!(rating.callback_prop, "onRate");
        assert!(rating.controlled);
        assert!(rating.reset.is_some());
        assert!(types["Tags"].reset.is_none());
    }

    #[test]
    fn test_clear_on_reset_clears_handle() {
        let config = FormConfig::from_json_str(SAMPLE).unwrap();
        let reset = config.custom_fields["Rating"]
            .to_field_type()
            .reset
            .unwrap();
        let mut handle = MockControlHandle::new();
        handle.expect_clear().times(1).return_const(());
        let field = Field {
            name: "score".to_string(),
            value: FieldValue::from(5.0),
            required: false,
            kind: "Rating".to_string(),
            default_value: Some(FieldValue::from(3.0)),
            validator: None,
            valid: true,
        };
        reset(&mut handle, &field);
    }

    #[test]
    fn test_save_and_load_round_trip_through_disk() {
        let dir = std::env::temp_dir().join(format!("formtree-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");
        let config = FormConfig::from_json_str(SAMPLE).unwrap();

        config.save_to(&path).unwrap();
        let loaded = FormConfig::load_from(&path).unwrap();
        assert_eq!(loaded.custom_fields, config.custom_fields);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = std::env::temp_dir().join("formtree-definitely-missing.json");
        let loaded = FormConfig::load_from(&path).unwrap();
        assert!(loaded.custom_fields.is_empty());
    }

    #[test]
    fn test_config_path_points_at_json_file() {
        // No home directory means no path, which load() treats as defaults
        if let Some(path) = FormConfig::config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.json"));
            assert!(path.to_string_lossy().contains("formtree"));
        }
    }
}
