use crate::types::{Badge, ExtractionResult, ParameterEntry, PomElement};
use indexmap::IndexMap;

/// Prefix carried by every parameter key
pub const PARAMETER_PREFIX: &str = "POM_";

pub const VERSION_KEY: &str = "POM_VERSION";
pub const STAGING_PROFILE_ID_KEY: &str = "POM_STAGING_PROFILE_ID";

/// Assemble the parameter set.
///
/// - every user element becomes `POM_<NAME>`, in input order;
/// - with no user elements the result is exactly `POM_VERSION` followed by
///   `POM_STAGING_PROFILE_ID`;
/// - otherwise only `POM_STAGING_PROFILE_ID` is appended. `POM_VERSION` is
///   not added in this case; existing consumers depend on that.
///
/// A repeated key keeps its first position and takes the last value. The
/// badge carries `version` and is left out when `version` is empty.
#[must_use]
pub fn build(
    user_elements: &[PomElement],
    version: &str,
    staging_profile_id: &str,
) -> ExtractionResult {
    let mut params: IndexMap<String, String> = IndexMap::new();

    if user_elements.is_empty() {
        params.insert(VERSION_KEY.to_string(), version.to_string());
    } else {
        for element in user_elements {
            params.insert(
                format!("{PARAMETER_PREFIX}{}", element.name()),
                element.value().to_string(),
            );
        }
    }
    params.insert(
        STAGING_PROFILE_ID_KEY.to_string(),
        staging_profile_id.to_string(),
    );

    let entries = params
        .into_iter()
        .map(|(key, value)| ParameterEntry { key, value })
        .collect();
    let badge = (!version.is_empty()).then(|| Badge::new(version));

    ExtractionResult::new(entries, badge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(result: &ExtractionResult) -> Vec<(&str, &str)> {
        result
            .entries()
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
            .collect()
    }

    #[test]
    fn no_user_elements_yields_derived_pair() {
        let result = build(&[], "1.2.3", "prof-1");
        assert_eq!(
            pairs(&result),
            vec![("POM_VERSION", "1.2.3"), ("POM_STAGING_PROFILE_ID", "prof-1")]
        );
        assert_eq!(result.badge_text(), Some("1.2.3"));
    }

    #[test]
    fn user_elements_skip_version_entry() {
        let result = build(&[PomElement::new("ARTIFACTID", "my-app")], "1.2.3", "prof-1");
        assert_eq!(
            pairs(&result),
            vec![("POM_ARTIFACTID", "my-app"), ("POM_STAGING_PROFILE_ID", "prof-1")]
        );
        assert_eq!(result.get("POM_VERSION"), None);
        assert_eq!(result.badge_text(), Some("1.2.3"));
    }

    #[test]
    fn empty_derived_values_have_no_badge() {
        let result = build(&[], "", "");
        assert_eq!(
            pairs(&result),
            vec![("POM_VERSION", ""), ("POM_STAGING_PROFILE_ID", "")]
        );
        assert_eq!(result.badge(), None);
    }

    #[test]
    fn user_order_is_preserved() {
        let elements = [
            PomElement::new("version", "1.0"),
            PomElement::new("groupId", "org.example"),
            PomElement::new("artifactId", "demo"),
        ];
        let result = build(&elements, "1.0", "");
        assert_eq!(
            pairs(&result),
            vec![
                ("POM_VERSION", "1.0"),
                ("POM_GROUPID", "org.example"),
                ("POM_ARTIFACTID", "demo"),
                ("POM_STAGING_PROFILE_ID", ""),
            ]
        );
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let elements = [
            PomElement::new("version", "1.0"),
            PomElement::new("artifactId", "demo"),
            PomElement::new("version", "2.0"),
        ];
        let result = build(&elements, "1.0", "p");
        assert_eq!(
            pairs(&result),
            vec![
                ("POM_VERSION", "2.0"),
                ("POM_ARTIFACTID", "demo"),
                ("POM_STAGING_PROFILE_ID", "p"),
            ]
        );
    }

    #[test]
    fn derived_staging_profile_overrides_colliding_user_key() {
        let elements = [PomElement::new("staging_profile_id", "from-user")];
        let result = build(&elements, "", "derived");
        assert_eq!(pairs(&result), vec![("POM_STAGING_PROFILE_ID", "derived")]);
    }

    #[test]
    fn build_is_deterministic() {
        let elements = [PomElement::new("name", "demo")];
        assert_eq!(build(&elements, "1", "p"), build(&elements, "1", "p"));
    }
}
