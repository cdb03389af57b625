//! Rail setup configuration
//!
//! Fixed names of the rail part, its instance and the reference point set,
//! together with the node search tolerance. Stored as RON text.

use serde::{Deserialize, Serialize};

use rail_kernel::NodeLabel;

use crate::constants::{
    NODE_LABEL_WIDTH, RAIL_INSTANCE_NAME, RAIL_PART_NAME, RAIL_RP_SET_NAME, SEARCH_TOLERANCE,
};

/// Names and tolerances used by the rail constraint setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    /// Name of the rail part owning the node sets
    pub rail_part_name: String,
    /// Name of the rail instance in the assembly
    pub rail_instance_name: String,
    /// Name of the assembly set holding the reference point
    pub reference_point_set_name: String,
    /// Half-width of the node matching search box
    pub search_tolerance: f64,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            rail_part_name: RAIL_PART_NAME.to_string(),
            rail_instance_name: RAIL_INSTANCE_NAME.to_string(),
            reference_point_set_name: RAIL_RP_SET_NAME.to_string(),
            search_tolerance: SEARCH_TOLERANCE,
        }
    }
}

impl RailConfig {
    /// Parse a configuration from RON text. Missing fields take their defaults.
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty RON text
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Check names are non-empty and the tolerance is a positive number
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("rail_part_name", &self.rail_part_name),
            ("rail_instance_name", &self.rail_instance_name),
            ("reference_point_set_name", &self.reference_point_set_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        if !(self.search_tolerance.is_finite() && self.search_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "search_tolerance must be positive, got {}",
                self.search_tolerance
            )));
        }
        Ok(())
    }

    /// Name of the per-node set of a constrained node
    pub fn constrained_set_name(label: NodeLabel) -> String {
        format!("N{label:0width$}_C", width = NODE_LABEL_WIDTH)
    }

    /// Name of the per-node set of the retained node paired with the
    /// constrained node `label`. Shares the label with the constrained set.
    pub fn retained_set_name(label: NodeLabel) -> String {
        format!("N{label:0width$}_R", width = NODE_LABEL_WIDTH)
    }

    /// Assembly-level name of a rail part set, addressed through the instance
    pub fn instance_set_name(&self, part_set_name: &str) -> String {
        format!("{}.{}", self.rail_instance_name, part_set_name)
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let config = RailConfig::default();
        assert_eq!(config.rail_part_name, "RAIL");
        assert_eq!(config.rail_instance_name, "RAIL-1");
        assert_eq!(config.reference_point_set_name, "RAIL_RP");
        assert_eq!(config.search_tolerance, 1e-3);
    }

    #[test]
    fn test_derived_set_names() {
        assert_eq!(RailConfig::constrained_set_name(42), "N00000042_C");
        assert_eq!(RailConfig::retained_set_name(42), "N00000042_R");

        let config = RailConfig::default();
        assert_eq!(config.instance_set_name("N00000042_C"), "RAIL-1.N00000042_C");
    }

    #[test]
    fn test_ron_partial_config_uses_defaults() {
        let config = RailConfig::from_ron_str("(rail_instance_name: \"TRACK-1\")").unwrap();
        assert_eq!(config.rail_instance_name, "TRACK-1");
        assert_eq!(config.rail_part_name, "RAIL");

        let text = config.to_ron_string().unwrap();
        assert_eq!(RailConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            RailConfig::from_ron_str("(search_tolerance: 0.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RailConfig::from_ron_str("(rail_part_name: \"\")"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RailConfig::from_ron_str("not ron"),
            Err(ConfigError::Deserialize(_))
        ));
    }
}
