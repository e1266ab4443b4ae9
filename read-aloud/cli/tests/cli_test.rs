//! End-to-end tests for the `read-aloud` binary.
//!
//! Each test points the binary at its own options file and at a local mock
//! of the Text-to-Speech API.

use std::path::Path;
use std::process::{Output, Stdio};

use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn read_aloud(options_file: &Path, endpoint: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_read-aloud"));
    cmd.env("READ_ALOUD_OPTIONS_FILE", options_file)
        .env("READ_ALOUD_TTS_ENDPOINT", endpoint)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

async fn run(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn read-aloud");

    let mut pipe = child.stdin.take().expect("stdin is piped");
    pipe.write_all(stdin.as_bytes()).await.unwrap();
    drop(pipe);

    child.wait_with_output().await.unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

async fn save(options_file: &Path, endpoint: &str, pairs: &[&str]) {
    let mut cmd = read_aloud(options_file, endpoint);
    cmd.arg("options");
    for pair in pairs {
        cmd.args(["--set", pair]);
    }
    let output = run(cmd, "").await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[tokio::test]
async fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let mut cmd = read_aloud(&dir.path().join("options.json"), "http://127.0.0.1:9");
    cmd.arg("--help");

    let output = run(cmd, "").await;
    assert!(output.status.success());
    let out = stdout(&output);
    for subcommand in ["read", "options", "voices", "menu"] {
        assert!(out.contains(subcommand), "missing {subcommand} in {out}");
    }
}

#[tokio::test]
async fn test_menu_lists_read_selection() {
    let dir = TempDir::new().unwrap();
    let mut cmd = read_aloud(&dir.path().join("options.json"), "http://127.0.0.1:9");
    cmd.arg("menu");

    let output = run(cmd, "").await;
    assert!(output.status.success());
    assert!(stdout(&output).contains("read-selection\tRead selection\tselection"));
}

#[tokio::test]
async fn test_read_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let mut cmd = read_aloud(&dir.path().join("options.json"), "http://127.0.0.1:9");
    cmd.args(["read", "Hello"]);

    let output = run(cmd, "").await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("TTS failed: You must set an API key"));
}

#[tokio::test]
async fn test_read_with_empty_stdin_fails() {
    let dir = TempDir::new().unwrap();
    let mut cmd = read_aloud(&dir.path().join("options.json"), "http://127.0.0.1:9");
    cmd.arg("read");

    let output = run(cmd, "  \n").await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: No input provided"));
}

#[tokio::test]
async fn test_set_rejects_unknown_option() {
    let dir = TempDir::new().unwrap();
    let options_file = dir.path().join("options.json");
    let mut cmd = read_aloud(&options_file, "http://127.0.0.1:9");
    cmd.args(["options", "--set", "speed=2"]);

    let output = run(cmd, "").await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("speed"));
    assert!(!options_file.exists());
}

#[tokio::test]
async fn test_read_with_rejected_key_reports_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let options_file = dir.path().join("options.json");
    save(&options_file, &server.uri(), &["apiKey=bad", "voice=en-US-Wavenet-D"]).await;

    let mut cmd = read_aloud(&options_file, &server.uri());
    cmd.args(["read", "--data-uri", "Hello"]);

    let output = run(cmd, "").await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("it seems the API key isn't accepted"));
}

#[tokio::test]
async fn test_read_from_stdin_prints_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(query_param("key", "secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": "T2dnUw=="
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let options_file = dir.path().join("options.json");
    save(&options_file, &server.uri(), &["apiKey=secret", "voice=en-US-Wavenet-D"]).await;

    let mut cmd = read_aloud(&options_file, &server.uri());
    cmd.args(["read", "--data-uri"]);

    let output = run(cmd, "Hello world.\n").await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "data:audio/ogg;codecs=opus;base64,T2dnUw=="
    );
}

#[tokio::test]
async fn test_options_html_lists_voices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "voices": [{"name": "en-US-Wavenet-D", "ssmlGender": "MALE"}]
            })),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let options_file = dir.path().join("options.json");
    save(&options_file, &server.uri(), &["apiKey=secret"]).await;

    let mut cmd = read_aloud(&options_file, &server.uri());
    cmd.args(["options", "--html"]);

    let output = run(cmd, "").await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let html = stdout(&output);
    assert!(html.starts_with("<form>"));
    assert!(html.contains(r#"name="apiKey""#));
    assert!(html.contains("en-US-Wavenet-D (MALE)"));
}

#[tokio::test]
async fn test_voices_lists_sorted_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "voices": [
                    {"name": "en-US-Wavenet-D", "ssmlGender": "MALE", "languageCodes": ["en-US"]},
                    {"name": "de-DE-Standard-A", "ssmlGender": "FEMALE", "languageCodes": ["de-DE"]}
                ]
            })),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let options_file = dir.path().join("options.json");
    save(&options_file, &server.uri(), &["apiKey=secret"]).await;

    let mut cmd = read_aloud(&options_file, &server.uri());
    cmd.arg("voices");

    let output = run(cmd, "").await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        [
            "de-DE-Standard-A\tFEMALE\tde-DE",
            "en-US-Wavenet-D\tMALE\ten-US"
        ]
    );
}
