//! Integration tests for the aquacache binary
//!
//! Each test points the binary at its own temporary cache directory.

use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper to run the CLI against `cache_dir` with given args and capture output
fn run_cli(cache_dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_aquacache"))
        .arg("--cache-dir")
        .arg(cache_dir)
        .args(args)
        .env_remove("AQUACACHE_BACKEND")
        .env_remove("AQUACACHE_NAMESPACE")
        .env_remove("AQUACACHE_TTL_SECS")
        .output()
        .expect("Failed to execute aquacache")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_help_flag_exits_successfully() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = run_cli(temp_dir.path(), &["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aquacache"), "Help should mention aquacache");
    assert!(stdout.contains("fetch"), "Help should list the fetch command");
}

#[test]
fn test_set_then_get_with_file_backend() {
    let temp_dir = TempDir::new().expect("temp dir");

    let set = run_cli(
        temp_dir.path(),
        &["-n", "portfolios", "set", "p1", r#"{"name":"Koi Pond"}"#],
    );
    assert!(set.status.success(), "set failed: {}", String::from_utf8_lossy(&set.stderr));
    assert!(temp_dir.path().join("portfolios").join("p1.json").exists());

    let get = run_cli(temp_dir.path(), &["-n", "portfolios", "get", "p1"]);
    assert!(get.status.success());
    assert_eq!(stdout_json(&get), json!({"name": "Koi Pond"}));
}

#[test]
fn test_set_then_get_with_sled_backend() {
    let temp_dir = TempDir::new().expect("temp dir");

    let set = run_cli(temp_dir.path(), &["--backend", "sled", "set", "k", "[1,2,3]"]);
    assert!(set.status.success(), "set failed: {}", String::from_utf8_lossy(&set.stderr));

    let get = run_cli(temp_dir.path(), &["--backend", "sled", "get", "k"]);
    assert_eq!(stdout_json(&get), json!([1, 2, 3]));
}

#[test]
fn test_get_missing_key_prints_null() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = run_cli(temp_dir.path(), &["get", "never-written"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), Value::Null);
}

#[test]
fn test_zero_ttl_get_misses_but_inspect_shows_entry() {
    let temp_dir = TempDir::new().expect("temp dir");
    run_cli(temp_dir.path(), &["set", "k", "\"v\""]);

    let get = run_cli(temp_dir.path(), &["--ttl-secs", "0", "get", "k"]);
    assert_eq!(stdout_json(&get), Value::Null);

    let inspect = run_cli(temp_dir.path(), &["--ttl-secs", "0", "inspect", "k"]);
    let entry = stdout_json(&inspect);
    assert_eq!(entry["data"], "v");
    assert_eq!(entry["is_expired"], true);
}

#[test]
fn test_invalidate_and_clear() {
    let temp_dir = TempDir::new().expect("temp dir");
    run_cli(temp_dir.path(), &["set", "a", "1"]);
    run_cli(temp_dir.path(), &["set", "b", "2"]);

    assert!(run_cli(temp_dir.path(), &["invalidate", "a"]).status.success());
    assert_eq!(stdout_json(&run_cli(temp_dir.path(), &["get", "a"])), Value::Null);
    assert_eq!(stdout_json(&run_cli(temp_dir.path(), &["get", "b"])), json!(2));

    assert!(run_cli(temp_dir.path(), &["clear"]).status.success());
    assert_eq!(stdout_json(&run_cli(temp_dir.path(), &["get", "b"])), Value::Null);
}

#[test]
fn test_invalid_json_value_fails() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = run_cli(temp_dir.path(), &["set", "k", "{not json"]);
    assert!(!output.status.success(), "Expected invalid JSON to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid JSON"), "Should explain the failure: {}", stderr);
}

#[test]
fn test_invalid_backend_is_rejected() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = run_cli(temp_dir.path(), &["--backend", "indexeddb", "get", "k"]);
    assert!(!output.status.success());
}

#[test]
fn test_set_into_unusable_cache_dir_fails() {
    let temp_dir = TempDir::new().expect("temp dir");
    let blocker = temp_dir.path().join("file");
    std::fs::write(&blocker, b"not a dir").expect("write blocker");

    let output = run_cli(&blocker, &["set", "k", "1"]);

    assert!(!output.status.success(), "a dropped write should be reported");
    // Reads still succeed as misses
    let get = run_cli(&blocker, &["get", "k"]);
    assert!(get.status.success());
    assert_eq!(stdout_json(&get), Value::Null);
}

#[test]
fn test_sled_locked_by_another_handle_reads_as_miss() {
    let temp_dir = TempDir::new().expect("temp dir");
    let _held = aquacache::SledBackend::open_path(temp_dir.path().join("aquacache.sled"))
        .expect("open db in test process");

    let get = run_cli(temp_dir.path(), &["--backend", "sled", "get", "k"]);

    assert!(get.status.success(), "stderr: {}", String::from_utf8_lossy(&get.stderr));
    assert_eq!(stdout_json(&get), Value::Null);
}

#[test]
fn test_sled_unusable_cache_dir_reads_as_miss() {
    let temp_dir = TempDir::new().expect("temp dir");
    let blocker = temp_dir.path().join("file");
    std::fs::write(&blocker, b"not a dir").expect("write blocker");

    let get = run_cli(&blocker, &["--backend", "sled", "get", "k"]);
    assert!(get.status.success(), "stderr: {}", String::from_utf8_lossy(&get.stderr));
    assert_eq!(stdout_json(&get), Value::Null);

    let set = run_cli(&blocker, &["--backend", "sled", "set", "k", "1"]);
    assert!(!set.status.success(), "a dropped write should be reported");
}

mod fetch_without_storage {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn run_cli_async(
        cache_dir: std::path::PathBuf,
        args: Vec<String>,
    ) -> std::process::Output {
        tokio::task::spawn_blocking(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            run_cli(&cache_dir, &args)
        })
        .await
        .expect("cli task")
    }

    #[tokio::test]
    async fn test_fetch_with_locked_sled_still_calls_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/home"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"essentials": []})))
            .expect(2)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().expect("temp dir");
        let _held = aquacache::SledBackend::open_path(temp_dir.path().join("aquacache.sled"))
            .expect("open db in test process");
        let url = format!("{}/api/home", server.uri());
        let args: Vec<String> = ["--backend", "sled", "fetch", "home", url.as_str()]
            .iter()
            .map(|arg| arg.to_string())
            .collect();

        for _ in 0..2 {
            let output = run_cli_async(temp_dir.path().to_path_buf(), args.clone()).await;
            assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
            assert_eq!(stdout_json(&output), json!({"essentials": []}));
        }
    }

    #[tokio::test]
    async fn test_fetch_with_unusable_sled_dir_still_calls_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/portfolios/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Koi Pond"})))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().expect("temp dir");
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"not a dir").expect("write blocker");
        let url = format!("{}/api/portfolios/p1", server.uri());
        let args = vec![
            "--backend".to_string(),
            "sled".to_string(),
            "fetch".to_string(),
            "p1".to_string(),
            url,
        ];

        let output = run_cli_async(blocker, args).await;

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(stdout_json(&output), json!({"name": "Koi Pond"}));
    }
}
