use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <groupId>org.example</groupId>
  <artifactId>cli-demo</artifactId>
  <version>0.9.0</version>
  <build>
    <plugins>
      <plugin>
        <artifactId>nexus-staging-maven-plugin</artifactId>
        <configuration>
          <stagingProfileId>stage-42</stagingProfileId>
        </configuration>
      </plugin>
    </plugins>
  </build>
</project>
"#;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("pom-interceptor").expect("binary")
}

fn setup_pom(contents: &str) -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("pom.xml"), contents).unwrap();
    temp
}

#[test]
fn selector_prints_env_lines() {
    let temp = setup_pom(POM);
    cli()
        .current_dir(temp.path())
        .args(["--selector", "/project/artifactId", "--quiet"])
        .assert()
        .success()
        .stdout("POM_ARTIFACTID=cli-demo\nPOM_STAGING_PROFILE_ID=stage-42\n");
}

#[test]
fn no_matches_falls_back_to_version() {
    let temp = setup_pom(POM);
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project/url", "--quiet"])
        .assert()
        .success()
        .stdout("POM_VERSION=0.9.0\nPOM_STAGING_PROFILE_ID=stage-42\n");
}

#[test]
fn element_list_mode_reads_explicit_pom_path() {
    let temp = setup_pom(POM);
    let pom = temp.path().join("pom.xml");
    cli()
        .arg("--pom")
        .arg(&pom)
        .args(["--elements", "groupId,version", "--quiet"])
        .assert()
        .success()
        .stdout("POM_GROUPID=org.example\nPOM_VERSION=0.9.0\nPOM_STAGING_PROFILE_ID=stage-42\n");
}

#[test]
fn json_output_includes_badge() {
    let temp = setup_pom(POM);
    let output = cli()
        .current_dir(temp.path())
        .args(["-s", "/project/groupId", "--format", "json"])
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["entries"][0]["key"], "POM_GROUPID");
    assert_eq!(body["badge"]["text"], "0.9.0");
}

#[test]
fn no_badge_flag_and_config_file() {
    let temp = setup_pom(POM);
    fs::write(
        temp.path().join("interceptor.toml"),
        "[badge_style]\nbackground = \"#00FF00\"\n",
    )
    .unwrap();

    let output = cli()
        .current_dir(temp.path())
        .args([
            "-s",
            "/project/groupId",
            "--format",
            "json",
            "--config",
            "interceptor.toml",
        ])
        .output()
        .expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["badge"]["style"]["background"], "#00FF00");

    let output = cli()
        .current_dir(temp.path())
        .args(["-s", "/project/groupId", "--format", "json", "--no-badge"])
        .output()
        .expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert!(body["badge"].is_null());
}

#[test]
fn reads_pom_from_stdin() {
    cli()
        .args(["--pom", "-", "-s", "/project/version", "--quiet"])
        .write_stdin(POM)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("POM_VERSION=0.9.0\n"));
}

#[test]
fn malformed_pom_fails() {
    let temp = setup_pom("<project><version>1.0</project>");
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project/version"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn invalid_selector_fails() {
    let temp = setup_pom(POM);
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project/["])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid selector"));
}

#[test]
fn invalid_utf8_pom_is_a_parse_error() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("pom.xml"),
        b"<project><version>1.\xFF</version></project>",
    )
    .unwrap();
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project/version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error: invalid UTF-8"))
        .stderr(predicate::str::contains("Failed to read POM").not());
}

#[test]
fn bom_prefixed_pom_is_accepted() {
    let temp = tempdir().unwrap();
    let mut data = vec![0xEF, 0xBB, 0xBF];
    data.extend_from_slice(POM.as_bytes());
    fs::write(temp.path().join("pom.xml"), data).unwrap();
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project/groupId", "--quiet"])
        .assert()
        .success()
        .stdout("POM_GROUPID=org.example\nPOM_STAGING_PROFILE_ID=stage-42\n");
}

#[test]
fn multiline_values_stay_on_one_env_line() {
    let temp = setup_pom(
        "<project><version>1.0</version><description>First\nSecond</description></project>",
    );
    cli()
        .current_dir(temp.path())
        .args(["-e", "description", "--quiet"])
        .assert()
        .success()
        .stdout("POM_DESCRIPTION=First\\nSecond\nPOM_STAGING_PROFILE_ID=\n");
}

#[test]
fn absent_list_element_is_emitted_empty() {
    let temp = setup_pom(POM);
    cli()
        .current_dir(temp.path())
        .args(["-e", "url,version", "--quiet"])
        .assert()
        .success()
        .stdout("POM_URL=\nPOM_VERSION=0.9.0\nPOM_STAGING_PROFILE_ID=stage-42\n");
}

#[test]
fn selector_or_elements_is_required() {
    let temp = setup_pom(POM);
    cli().current_dir(temp.path()).assert().failure();
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project", "-e", "version"])
        .assert()
        .failure();
}

#[test]
fn missing_pom_fails_with_context() {
    let temp = tempdir().unwrap();
    cli()
        .current_dir(temp.path())
        .args(["-s", "/project/version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read POM"));
}
