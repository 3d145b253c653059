//! # POM Extractor
//!
//! Selector-driven extraction of build parameters from Maven POM files.
//!
//! ## Architecture
//!
//! ```text
//! POM XML text
//!     │
//!     ├──> Document Parser (roxmltree, DTDs rejected)
//!     │
//!     ├──> Path Query Evaluator
//!     │    ├─> user selector (XPath 1.0 node-set expression)
//!     │    └─> built-in selectors (artifact version, staging profile id)
//!     │
//!     ├──> Element Normalizer
//!     │    └─> (NAME, text) pairs, names upper-cased
//!     │
//!     └──> Parameter Set Builder
//!          ├─> POM_<NAME> entries, derived fallbacks
//!          └─> optional version badge
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pom_extractor::Extractor;
//!
//! let pom = r#"
//! <project xmlns="http://maven.apache.org/POM/4.0.0">
//!   <artifactId>demo</artifactId>
//!   <version>1.2.3</version>
//! </project>
//! "#;
//!
//! let result = Extractor::default().extract(pom, "/project/artifactId").unwrap();
//! assert_eq!(result.get("POM_ARTIFACTID"), Some("demo"));
//! assert_eq!(result.get("POM_STAGING_PROFILE_ID"), Some(""));
//! assert_eq!(result.badge_text(), Some("1.2.3"));
//! ```
//!
//! No I/O happens in this crate beyond [`ExtractorConfig::load`]; callers
//! bring the XML text and decide what to do with errors.

mod builder;
mod config;
mod derived;
mod document;
mod error;
mod normalize;
mod pipeline;
mod types;
mod xpath;

pub use builder::{build, PARAMETER_PREFIX, STAGING_PROFILE_ID_KEY, VERSION_KEY};
pub use config::ExtractorConfig;
pub use derived::{
    resolve_artifact_version, resolve_staging_profile_id, ARTIFACT_VERSION_SELECTOR,
    STAGING_PROFILE_ID_SELECTOR,
};
pub use document::{decode_xml, parse, parse_bytes, MatchedNode, NodeKind, PomDocument};
pub use error::{ExtractError, QueryError, Result};
pub use normalize::normalize;
pub use pipeline::{parse_element_list, Extractor};
pub use types::{Badge, BadgeStyle, ExtractionResult, ParameterEntry, PomElement};
pub use xpath::{evaluate, Selector};
