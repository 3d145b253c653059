use crate::builder::build;
use crate::config::ExtractorConfig;
use crate::derived::{resolve_artifact_version, resolve_staging_profile_id};
use crate::document::{parse, MatchedNode, PomDocument};
use crate::error::{ExtractError, QueryError, Result};
use crate::normalize::normalize;
use crate::types::{ExtractionResult, PomElement};
use crate::xpath::{is_ncname, Selector};

/// Main entry point: XML text and a selector in, parameters out
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Create an extractor, validating the configuration
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate().map_err(ExtractError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Parse `xml`, apply `selector` and build the parameter set
    pub fn extract(&self, xml: &str, selector: &str) -> Result<ExtractionResult> {
        let doc = parse(xml)?;
        let selector = Selector::compile(selector)?;
        Ok(self.extract_from(&doc, &selector))
    }

    /// Same as [`Extractor::extract`] with a precompiled selector
    pub fn extract_with(&self, xml: &str, selector: &Selector) -> Result<ExtractionResult> {
        let doc = parse(xml)?;
        Ok(self.extract_from(&doc, selector))
    }

    /// Look up direct children of the root element by name, in list order.
    ///
    /// This is the `artifactId,version` style of configuration. Each name
    /// yields exactly one `POM_<NAME>` entry whose value is the text of every
    /// `/*/*[local-name()='<name>']` match, or `""` when the element is
    /// absent. Blank names are skipped; an all-blank list behaves like a
    /// selector with no matches. Names that are not plain XML names are
    /// rejected as invalid selectors.
    pub fn extract_elements<S: AsRef<str>>(
        &self,
        xml: &str,
        names: &[S],
    ) -> Result<ExtractionResult> {
        let doc = parse(xml)?;
        let lookups = names
            .iter()
            .map(|name| name.as_ref().trim())
            .filter(|name| !name.is_empty())
            .map(|name| element_selector(name).map(|selector| (name, selector)))
            .collect::<Result<Vec<_>>>()?;

        let elements: Vec<PomElement> = lookups
            .iter()
            .map(|(name, selector)| {
                let nodes = selector.select(&doc);
                log::debug!("Element `{name}` matched {} node(s)", nodes.len());
                let value: String = nodes.iter().map(MatchedNode::text_content).collect();
                PomElement::new(name, value)
            })
            .collect();
        Ok(self.finish(&doc, &elements))
    }

    fn extract_from(&self, doc: &PomDocument<'_>, selector: &Selector) -> ExtractionResult {
        let nodes = selector.select(doc);
        log::debug!("Selector `{selector}` matched {} node(s)", nodes.len());
        self.finish(doc, &normalize(&nodes))
    }

    fn finish(&self, doc: &PomDocument<'_>, elements: &[PomElement]) -> ExtractionResult {
        let version = resolve_artifact_version(doc);
        let staging_profile_id = resolve_staging_profile_id(doc);
        if elements.is_empty() {
            log::debug!("No elements selected, falling back to derived values");
        }

        let result = build(elements, &version, &staging_profile_id);
        if self.config.emit_badge {
            result.with_badge_style(self.config.badge_style.clone())
        } else {
            result.without_badge()
        }
    }
}

fn element_selector(name: &str) -> Result<Selector> {
    if !is_ncname(name) {
        return Err(QueryError::invalid(name, "not an XML element name").into());
    }
    Ok(Selector::compile(&format!("/*/*[local-name()='{name}']"))?)
}

/// Split a comma-separated element list (`"artifactId, version"`)
#[must_use]
pub fn parse_element_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
