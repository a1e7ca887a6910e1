//! Configuration types for view-state tracking

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ViewStateError;
use crate::traits::ViewStateResult;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewStateConfig {
    /// Name used in log output
    pub name: String,

    /// Logging level / filter directive
    pub log_level: String,

    /// Dictionary behaviour
    pub state: StateConfig,

    /// Payload inspection
    pub inspect: InspectConfig,
}

impl Default for ViewStateConfig {
    fn default() -> Self {
        Self {
            name: "viewstate".to_string(),
            log_level: "info".to_string(),
            state: StateConfig::default(),
            inspect: InspectConfig::default(),
        }
    }
}

impl ViewStateConfig {
    pub fn from_json(json: &str) -> ViewStateResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ViewStateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> ViewStateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ViewStateResult<()> {
        if self.log_level.trim().is_empty() {
            return Err(ViewStateError::Config("log_level must not be empty".into()));
        }
        if self.inspect.max_depth == 0 {
            return Err(ViewStateError::Config("inspect.max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

/// Dictionary configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Treat keys that differ only in ASCII case as the same key
    pub ignore_case: bool,

    /// Report removals of baseline entries as tombstones in the diff
    pub record_removals: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            record_removals: true,
        }
    }
}

/// Payload printer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Nesting depth after which the printer elides subtrees
    pub max_depth: usize,

    /// Print entry values, not just keys
    pub show_values: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            show_values: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ViewStateConfig::from_json(r#"{ "state": { "ignore_case": true } }"#).unwrap();
        assert!(config.state.ignore_case);
        assert!(config.state.record_removals);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.inspect.max_depth, 64);
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let err = ViewStateConfig::from_json(r#"{ "inspect": { "max_depth": 0 } }"#).unwrap_err();
        assert!(matches!(err, ViewStateError::Config(_)));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = ViewStateConfig::default();
        let json = config.to_json().unwrap();
        let back = ViewStateConfig::from_json(&json).unwrap();
        assert_eq!(back.state, config.state);
        assert_eq!(back.name, config.name);
    }
}
