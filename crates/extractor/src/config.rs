use crate::error::{ExtractError, Result};
use crate::types::BadgeStyle;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Attach the artifact version as a badge
    pub emit_badge: bool,

    /// Display style for the badge
    pub badge_style: BadgeStyle,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            emit_badge: true,
            badge_style: BadgeStyle::default(),
        }
    }
}

impl ExtractorConfig {
    /// Config that never produces a badge
    pub fn without_badge() -> Self {
        Self {
            emit_badge: false,
            ..Default::default()
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| ExtractError::invalid_config(format!("TOML parse error: {e}")))?;
        config.validate().map_err(ExtractError::invalid_config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        let style = &self.badge_style;
        for (field, value) in [
            ("color", &style.color),
            ("background", &style.background),
            ("border_color", &style.border_color),
        ] {
            if !is_hex_color(value) {
                return Err(format!(
                    "badge_style.{field} must be #RGB or #RRGGBB, got {value:?}"
                ));
            }
        }

        if style.border.trim().is_empty() {
            return Err("badge_style.border must not be empty".to_string());
        }

        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
