//! Built-in lookups that run regardless of the user selector.

use crate::document::PomDocument;
use crate::xpath::Selector;
use once_cell::sync::Lazy;

/// The project's own `<version>`, not a parent or dependency version
pub const ARTIFACT_VERSION_SELECTOR: &str = "/*[local-name()='project']/*[local-name()='version']";

/// Nexus staging profile configured on any build plugin
pub const STAGING_PROFILE_ID_SELECTOR: &str = "/*[local-name()='project']/*[local-name()='build']\
     /*[local-name()='plugins']/*/*[local-name()='configuration']\
     /*[local-name()='stagingProfileId']";

static ARTIFACT_VERSION: Lazy<Selector> = Lazy::new(|| builtin(ARTIFACT_VERSION_SELECTOR));
static STAGING_PROFILE_ID: Lazy<Selector> = Lazy::new(|| builtin(STAGING_PROFILE_ID_SELECTOR));

fn builtin(source: &str) -> Selector {
    Selector::compile(source).expect("built-in selectors are valid")
}

/// Artifact version, or an empty string when the POM has none.
#[must_use]
pub fn resolve_artifact_version(doc: &PomDocument<'_>) -> String {
    first_text(&ARTIFACT_VERSION, doc)
}

/// Staging profile id, or an empty string when no plugin configures one.
#[must_use]
pub fn resolve_staging_profile_id(doc: &PomDocument<'_>) -> String {
    first_text(&STAGING_PROFILE_ID, doc)
}

fn first_text(selector: &Selector, doc: &PomDocument<'_>) -> String {
    let value = selector
        .select(doc)
        .first()
        .map(|node| node.text_content())
        .unwrap_or_default();
    log::debug!("Derived `{selector}` -> {value:?}");
    value
}
