//! Integration tests for the nightlight binary
//!
//! These tests drive the built binary against a temporary data root and
//! verify JSON output, exit codes and the files each command leaves behind.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SECRETS_VARIABLE: &str = "CONFLICT_NIGHTLIGHT_SECRETS";
const MONTHLY_JAN: &str = "MapProviderEogdata/BoundsUkraineAndAround/MapTypeMonthly/2021_1_1.tif";
const JAN_2021: &str = r#"{"bounds":"BoundsUkraineAndAround","mapType":"MapTypeMonthly","date":{"year":2021,"month":1,"day":1},"source":{"provider":"MapProviderEogdata","url":""}}"#;

fn nightlight_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove 'deps' directory
    path.push("nightlight");
    path
}

/// Run the binary with a clean nightlight environment
fn run(data_root: &Path, args: &[&str], secrets: Option<&str>) -> Output {
    let mut command = Command::new(nightlight_bin());
    command
        .arg("--data-root")
        .arg(data_root)
        .arg("--write-dir")
        .arg(data_root.join("tmp"))
        .args(args)
        .current_dir(data_root);

    for variable in [
        "NIGHTLIGHT_DATA_ROOT",
        "RAW_TIF_BUCKET",
        "PROCESSED_TIF_BUCKET_NAME",
        "DOWNLOAD_RAW_TIF_QUEUE",
        "FRONTEND_MAP_OPTIONS_JSON",
        "CONFLICT_NIGHTLIGHT_SECRETS_KEY",
        "NIGHTLIGHT_CATALOG",
        "RUST_LOG",
        SECRETS_VARIABLE,
    ] {
        command.env_remove(variable);
    }
    if let Some(secrets) = secrets {
        command.env(SECRETS_VARIABLE, secrets);
    }

    command.output().expect("Failed to execute command")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

fn store_object(data_root: &Path, bucket: &str, key: &str) {
    let path = data_root.join(bucket).join(key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"GeoTIFF").unwrap();
}

#[test]
fn test_list_published_on_empty_data_root() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["list-published", "--json"], None);

    assert!(output.status.success(), "Command should succeed");
    let parsed = json_stdout(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["published"], serde_json::json!([]));
}

#[test]
fn test_list_raw_decodes_stored_maps() {
    let dir = TempDir::new().unwrap();
    store_object(dir.path(), "conflict-nightlight-raw-tif", MONTHLY_JAN);
    store_object(dir.path(), "conflict-nightlight-raw-tif", "notes/readme.txt");

    let output = run(dir.path(), &["list-raw", "--json"], None);

    assert!(output.status.success(), "Command should succeed");
    let maps = &json_stdout(&output)["data"]["maps"];
    assert_eq!(maps.as_array().map(Vec::len), Some(1));
    assert_eq!(maps[0]["date"]["month"], 1);
}

#[test]
fn test_sync_without_years_fails() {
    let dir = TempDir::new().unwrap();

    let output = run(
        dir.path(),
        &["sync", "--bounds", "ukraine_and_around", "--map-type", "monthly", "--months", "1"],
        None,
    );

    assert!(!output.status.success(), "Command should fail");
}

#[test]
fn test_sync_enqueues_missing_maps() {
    let dir = TempDir::new().unwrap();
    store_object(dir.path(), "conflict-nightlight-raw-tif", MONTHLY_JAN);
    let catalog = r#"[
        {"bounds":"BoundsUkraineAndAround","mapType":"MapTypeMonthly","date":{"year":2021,"month":1,"day":1},"source":{"provider":"MapProviderEogdata","url":"https://eog/1.tif"}},
        {"bounds":"BoundsUkraineAndAround","mapType":"MapTypeMonthly","date":{"year":2021,"month":2,"day":1},"source":{"provider":"MapProviderEogdata","url":"https://eog/2.tif"}}
    ]"#;
    std::fs::write(dir.path().join("catalog.json"), catalog).unwrap();

    let output = run(
        dir.path(),
        &[
            "sync", "--bounds", "ukraine_and_around", "--map-type", "monthly", "--months", "1,2",
            "--years", "2021", "--json",
        ],
        None,
    );

    assert!(output.status.success(), "Command should succeed");
    assert_eq!(json_stdout(&output)["data"]["requested"], 1);

    let queue = std::fs::read_to_string(
        dir.path()
            .join("queues")
            .join("conflict-nightlight-download-and-crop-raw-tif-request.jsonl"),
    )
    .unwrap();
    assert_eq!(queue.lines().count(), 1);
    assert!(queue.contains("https://eog/2.tif"));
}

#[test]
fn test_publish_requires_credentials() {
    let dir = TempDir::new().unwrap();
    store_object(dir.path(), "conflict-nightlight-processed-tif", MONTHLY_JAN);

    let output = run(dir.path(), &["publish", JAN_2021], None);

    assert!(!output.status.success(), "Command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Tile host is not configured"));
}

#[test]
fn test_publish_then_delete() {
    let dir = TempDir::new().unwrap();
    store_object(dir.path(), "conflict-nightlight-processed-tif", MONTHLY_JAN);
    let secrets = Some(r#"{"username":"nightlight","token":"pk.test"}"#);

    let output = run(dir.path(), &["publish", JAN_2021, "--json"], secrets);
    assert!(output.status.success(), "Publish should succeed");
    let published = json_stdout(&output);
    assert_eq!(published["data"]["key"], "Monthly-UkraineAnd_2021-1-1");
    assert_eq!(published["data"]["url"], "tiles://nightlight.Monthly-UkraineAnd_2021-1-1");

    let tileset = dir
        .path()
        .join("tilesets")
        .join("nightlight.Monthly-UkraineAnd_2021-1-1.tif");
    assert!(tileset.exists(), "Should write the tileset");

    let listed = json_stdout(&run(dir.path(), &["list-published", "--json"], None));
    assert_eq!(listed["data"]["published"][0]["displayName"], "Jan 2021");

    let output = run(dir.path(), &["delete", JAN_2021, "--json"], secrets);
    assert!(output.status.success(), "Delete should succeed");
    assert_eq!(json_stdout(&output)["data"]["failed"], serde_json::json!([]));
    assert!(!tileset.exists());
    assert!(!dir
        .path()
        .join("conflict-nightlight-processed-tif")
        .join(MONTHLY_JAN)
        .exists());
}

#[test]
fn test_publish_logs_to_stderr_only() {
    let dir = TempDir::new().unwrap();
    store_object(dir.path(), "conflict-nightlight-processed-tif", MONTHLY_JAN);

    let output = run(
        dir.path(),
        &["publish", JAN_2021, "--json"],
        Some(r#"{"username":"nightlight","token":"pk.test"}"#),
    );

    assert!(output.status.success(), "Publish should succeed");
    assert_eq!(json_stdout(&output)["status"], "success");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Map published"), "stderr: {}", stderr);
}

#[test]
fn test_publish_many_reports_failures() {
    let dir = TempDir::new().unwrap();
    store_object(dir.path(), "conflict-nightlight-processed-tif", MONTHLY_JAN);
    let feb = JAN_2021.replace(r#""month":1"#, r#""month":2"#);
    let maps = format!("[{},{}]", JAN_2021, feb);

    let output = run(
        dir.path(),
        &["publish-many", &maps, "--json"],
        Some(r#"{"username":"nightlight","token":"pk.test"}"#),
    );

    assert!(!output.status.success(), "A failed map should fail the command");
    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["total"], 2);
    assert_eq!(parsed["data"]["published"].as_array().map(Vec::len), Some(1));
    assert_eq!(parsed["data"]["failed"][0]["key"], "Monthly-UkraineAnd_2021-2-1");
}

#[test]
fn test_config_reports_sources() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["config", "--json"], None);

    assert!(output.status.success(), "Command should succeed");
    let values = &json_stdout(&output)["data"]["values"];
    assert_eq!(values["data_root"]["source"], "Cli");
    assert_eq!(values["raw_bucket"]["source"], "Default");
}
