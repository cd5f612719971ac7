//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn assessify() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("assessify").unwrap()
}

#[test]
fn help_output() {
    assessify()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Question-set to assessment-evidence transformer",
        ));
}

#[test]
fn version_output() {
    assessify()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("assessify"));
}

#[test]
fn show_templates_lists_every_type() {
    assessify()
        .arg("show-templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type: text"))
        .stdout(predicate::str::contains("Type: number"))
        .stdout(predicate::str::contains("Type: slider"))
        .stdout(predicate::str::contains("Type: date"))
        .stdout(predicate::str::contains("Type: multiselect"))
        .stdout(predicate::str::contains("Type: radio"));
}

#[test]
fn show_templates_filters_to_one_type() {
    assessify()
        .arg("show-templates")
        .arg("--type")
        .arg("date")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type: date"))
        .stdout(predicate::str::contains("dateFormat"))
        .stdout(predicate::str::contains("Type: slider").not());
}

#[test]
fn show_templates_rejects_unknown_type() {
    assessify()
        .arg("show-templates")
        .arg("--type")
        .arg("hologram")
        .assert()
        .failure()
        .stderr(predicate::str::contains("hologram"));
}

#[test]
fn build_requires_reference_id() {
    assessify().arg("build").assert().failure();
}

#[test]
fn build_with_missing_config_file_errors() {
    assessify()
        .arg("build")
        .arg("--reference-id")
        .arg("do_123")
        .arg("--config")
        .arg("/does/not/exist.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn build_against_unreachable_platform_emits_failure_envelope() {
    assessify()
        .env("ASSESSIFY_BASE_URL", "http://127.0.0.1:9/api")
        .arg("build")
        .arg("--reference-id")
        .arg("do_123")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\":false"))
        .stdout(predicate::str::contains("do_123"));
}
