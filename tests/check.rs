use std::path::Path;
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;

fn check(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_threadgate"));
    cmd.arg("check")
        .args(args)
        .current_dir(dir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_EVENT_PATH")
        .env_remove("GITHUB_ACTIONS")
        .env_remove("GITHUB_STEP_SUMMARY");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

#[test]
fn no_pull_request_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let output = check(dir.path(), &[], &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn push_event_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let event = dir.path().join("event.json");
    std::fs::write(&event, r#"{"ref":"refs/heads/main"}"#).unwrap();

    let output = check(
        dir.path(),
        &[],
        &[
            ("GITHUB_REPOSITORY", "acme/widgets"),
            ("GITHUB_EVENT_PATH", event.to_str().unwrap()),
            ("GITHUB_TOKEN", "ghp_unused"),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn missing_token_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let output = check(dir.path(), &["--pr", "acme/widgets#9"], &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn invalid_pr_reference_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = check(dir.path(), &["--pr", "not-a-reference"], &[]);
    assert!(!output.status.success());
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".threadgate.toml"), "[reviewer]\nmarker = \"\"\n").unwrap();
    let output = check(dir.path(), &[], &[]);
    assert!(!output.status.success());
}

fn blocking_thread_server() -> MockServer {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "reviewThreads": {
                            "pageInfo": { "hasNextPage": false, "endCursor": null },
                            "nodes": [{
                                "id": "PRRT_1",
                                "isResolved": false,
                                "isOutdated": false,
                                "resolvedBy": null,
                                "comments": {
                                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                                    "nodes": [{
                                        "id": "c1",
                                        "body": "This is an auto-generated comment by OSS CodeRabbit [severity:high] fix X",
                                        "author": { "login": "coderabbitai" },
                                        "createdAt": "2024-05-01T12:00:00Z",
                                        "path": "src/lib.rs",
                                        "line": 3,
                                        "outdated": false,
                                        "position": 2,
                                        "url": "https://github.com/acme/widgets/pull/9#discussion_c1"
                                    }]
                                }
                            }]
                        }
                    }
                }
            }
        }));
    });
    server
}

fn write_config(dir: &Path, server: &MockServer) -> String {
    let path = dir.join("threadgate.toml");
    std::fs::write(&path, format!("[github]\napi_url = \"{}\"\n", server.base_url())).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn json_output_in_actions_is_a_single_document() {
    let server = blocking_thread_server();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server);
    let summary = dir.path().join("summary.md");

    let output = check(
        dir.path(),
        &["--pr", "acme/widgets#9", "--format", "json", "--config", &config],
        &[
            ("GITHUB_TOKEN", "ghp_test"),
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_STEP_SUMMARY", summary.to_str().unwrap()),
        ],
    );

    assert_eq!(output.status.code(), Some(1), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["shouldBlock"], json!(true));
    assert!(std::fs::read_to_string(&summary).unwrap().contains("acme/widgets#9"));
}

#[test]
fn text_output_in_actions_carries_error_annotation() {
    let server = blocking_thread_server();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server);

    let output = check(
        dir.path(),
        &["--pr", "acme/widgets#9", "--config", &config],
        &[("GITHUB_TOKEN", "ghp_test"), ("GITHUB_ACTIONS", "true")],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("::error::High severity comments aren't resolved"));
}
