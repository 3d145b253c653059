use serde::{Deserialize, Serialize};

/// A selected POM element, name already upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PomElement {
    name: String,
    value: String,
}

impl PomElement {
    /// Create an element. The name is upper-cased here and never again.
    pub fn new(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self {
            name: name.as_ref().to_uppercase(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A named parameter handed to the host, key always `POM_`-prefixed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub key: String,
    pub value: String,
}

impl ParameterEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Display hints for a text badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeStyle {
    /// Text color
    pub color: String,

    /// Background color
    pub background: String,

    /// Border width (CSS length)
    pub border: String,

    /// Border color
    pub border_color: String,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            background: "#FFFF00".to_string(),
            border: "1px".to_string(),
            border_color: "#C0C000".to_string(),
        }
    }
}

/// Short status text for the host to display next to a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub text: String,
    #[serde(default)]
    pub style: BadgeStyle,
}

impl Badge {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: BadgeStyle::default(),
        }
    }

    /// Builder: set display style
    #[must_use]
    pub fn with_style(mut self, style: BadgeStyle) -> Self {
        self.style = style;
        self
    }
}

/// Outcome of one extraction: ordered parameters plus an optional badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    entries: Vec<ParameterEntry>,
    badge: Option<Badge>,
}

impl ExtractionResult {
    pub(crate) fn new(entries: Vec<ParameterEntry>, badge: Option<Badge>) -> Self {
        Self { entries, badge }
    }

    #[must_use]
    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    #[must_use]
    pub fn badge(&self) -> Option<&Badge> {
        self.badge.as_ref()
    }

    #[must_use]
    pub fn badge_text(&self) -> Option<&str> {
        self.badge.as_ref().map(|b| b.text.as_str())
    }

    /// Look up a parameter value by its full key (`POM_VERSION`)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Drop the badge, keeping the parameters
    #[must_use]
    pub fn without_badge(self) -> Self {
        Self {
            badge: None,
            ..self
        }
    }

    /// Restyle the badge, if there is one
    #[must_use]
    pub fn with_badge_style(self, style: BadgeStyle) -> Self {
        Self {
            badge: self.badge.map(|b| b.with_style(style)),
            ..self
        }
    }

    pub fn into_entries(self) -> Vec<ParameterEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_name_is_upper_cased_once() {
        let element = PomElement::new("artifactId", "demo");
        assert_eq!(element.name(), "ARTIFACTID");
        assert_eq!(element.value(), "demo");

        let again = PomElement::new(element.name(), element.value());
        assert_eq!(again, element);
    }

    #[test]
    fn default_badge_style() {
        let style = BadgeStyle::default();
        assert_eq!(style.color, "#000000");
        assert_eq!(style.background, "#FFFF00");
        assert_eq!(style.border, "1px");
        assert_eq!(style.border_color, "#C0C000");
    }

    #[test]
    fn result_lookup_and_badge_toggles() {
        let result = ExtractionResult::new(
            vec![ParameterEntry::new("POM_VERSION", "1.0")],
            Some(Badge::new("1.0")),
        );
        assert_eq!(result.get("POM_VERSION"), Some("1.0"));
        assert_eq!(result.get("POM_MISSING"), None);
        assert_eq!(result.badge_text(), Some("1.0"));

        let restyled = result.clone().with_badge_style(BadgeStyle {
            color: "#FFFFFF".into(),
            ..BadgeStyle::default()
        });
        assert_eq!(restyled.badge().map(|b| b.style.color.as_str()), Some("#FFFFFF"));

        let bare = result.without_badge();
        assert_eq!(bare.badge(), None);
        assert_eq!(bare.entries().len(), 1);
    }
}
