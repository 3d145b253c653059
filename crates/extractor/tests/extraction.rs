use pom_extractor::{
    build, evaluate, normalize, parse, resolve_artifact_version, resolve_staging_profile_id,
    ExtractError, ExtractionResult, Extractor, ExtractorConfig, PomElement, QueryError, Selector,
};
use pretty_assertions::assert_eq;

const RELEASE_POM: &str = include_str!("fixtures/release-pom.xml");

fn pairs(result: &ExtractionResult) -> Vec<(String, String)> {
    result
        .entries()
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect()
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn derived_values_from_real_pom() {
    let doc = parse(RELEASE_POM).expect("fixture parses");
    assert_eq!(resolve_artifact_version(&doc), "3.2.1-SNAPSHOT");
    assert_eq!(resolve_staging_profile_id(&doc), "4d1a5b2c9e");
}

#[test]
fn coordinates_selector() {
    let result = Extractor::default()
        .extract(
            RELEASE_POM,
            "/project/groupId | /project/artifactId | /project/packaging",
        )
        .expect("extraction succeeds");

    assert_eq!(
        pairs(&result),
        owned(&[
            ("POM_GROUPID", "org.example.tools"),
            ("POM_ARTIFACTID", "release-helper"),
            ("POM_PACKAGING", "jar"),
            ("POM_STAGING_PROFILE_ID", "4d1a5b2c9e"),
        ])
    );
    assert_eq!(result.badge_text(), Some("3.2.1-SNAPSHOT"));
}

#[test]
fn staging_plugin_configuration_selector() {
    let result = Extractor::default()
        .extract(
            RELEASE_POM,
            "/project/build/plugins/*/configuration/stagingProfileId",
        )
        .unwrap();

    assert_eq!(
        pairs(&result),
        owned(&[
            ("POM_STAGINGPROFILEID", "4d1a5b2c9e"),
            ("POM_STAGING_PROFILE_ID", "4d1a5b2c9e"),
        ])
    );
}

#[test]
fn selector_with_no_matches_falls_back() {
    let result = Extractor::default()
        .extract(RELEASE_POM, "//dependency[scope='provided']")
        .unwrap();

    assert_eq!(
        pairs(&result),
        owned(&[
            ("POM_VERSION", "3.2.1-SNAPSHOT"),
            ("POM_STAGING_PROFILE_ID", "4d1a5b2c9e"),
        ])
    );
}

#[test]
fn dependency_versions_are_not_the_artifact_version() {
    let result = Extractor::default()
        .extract(RELEASE_POM, "//dependency[artifactId='junit']/version")
        .unwrap();

    // User-selected VERSION wins the key; the badge still reflects the project
    assert_eq!(result.get("POM_VERSION"), Some("4.13.2"));
    assert_eq!(result.badge_text(), Some("3.2.1-SNAPSHOT"));
}

#[test]
fn attribute_selection() {
    let doc = parse(RELEASE_POM).unwrap();
    let nodes = evaluate(&doc, "/project/@xsi:schemaLocation").unwrap();
    let elements = normalize(&nodes);
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].name(), "SCHEMALOCATION");
    assert!(elements[0].value().starts_with("http://maven.apache.org/POM/4.0.0 "));
}

#[test]
fn element_list_mode() {
    let result = Extractor::default()
        .extract_elements(RELEASE_POM, &["name", "version"])
        .unwrap();

    assert_eq!(
        pairs(&result),
        owned(&[
            ("POM_NAME", "Release Helper"),
            ("POM_VERSION", "3.2.1-SNAPSHOT"),
            ("POM_STAGING_PROFILE_ID", "4d1a5b2c9e"),
        ])
    );
}

#[test]
fn wildcard_name_predicate_on_minimal_pom() {
    let xml = "<project><version>2.0.0</version><build><plugins><plugin><configuration>\
               <stagingProfileId>abc123</stagingProfileId>\
               </configuration></plugin></plugins></build></project>";
    let doc = parse(xml).unwrap();

    assert_eq!(resolve_artifact_version(&doc), "2.0.0");
    assert_eq!(resolve_staging_profile_id(&doc), "abc123");

    let nodes = evaluate(&doc, "/project/*[name()='version']").unwrap();
    assert_eq!(normalize(&nodes), vec![PomElement::new("VERSION", "2.0.0")]);
}

#[test]
fn malformed_xml_produces_no_result() {
    let err = Extractor::default()
        .extract("<project><version>1.0</project>", "/project/version")
        .unwrap_err();
    assert!(matches!(err, ExtractError::ParseError(_)), "{err:?}");
}

#[test]
fn selector_errors_are_document_independent() {
    for selector in ["", "/project/", "count(/project)", "//*[unknown()]"] {
        let a = Selector::compile(selector).unwrap_err();
        let b = Extractor::default().extract(RELEASE_POM, selector).unwrap_err();
        assert_eq!(ExtractError::Query(a), b, "{selector}");
    }
    assert_eq!(
        Selector::compile(" "),
        Err(QueryError::EmptySelector)
    );
}

#[test]
fn badge_can_be_disabled() {
    let result = Extractor::new(ExtractorConfig::without_badge())
        .unwrap()
        .extract(RELEASE_POM, "/project/artifactId")
        .unwrap();
    assert_eq!(result.badge(), None);
    assert_eq!(result.get("POM_ARTIFACTID"), Some("release-helper"));
}

#[test]
fn pipeline_is_repeatable() {
    let extractor = Extractor::default();
    let first = extractor.extract(RELEASE_POM, "//plugin/artifactId").unwrap();
    let second = extractor.extract(RELEASE_POM, "//plugin/artifactId").unwrap();
    assert_eq!(first, second);

    let elements = [PomElement::new("ARTIFACTID", "my-app")];
    assert_eq!(build(&elements, "1.2.3", "prof-1"), build(&elements, "1.2.3", "prof-1"));
}

#[test]
fn result_serializes_for_hosts() {
    let result = Extractor::default()
        .extract(RELEASE_POM, "/project/artifactId")
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["entries"][0]["key"], "POM_ARTIFACTID");
    assert_eq!(json["badge"]["text"], "3.2.1-SNAPSHOT");
    assert_eq!(json["badge"]["style"]["background"], "#FFFF00");
}
