//! Integration tests for the geosample binary
//!
//! These tests run the built binary and check its JSON output.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

fn geosample(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geosample"))
        .args(args)
        .env_remove("GEOSAMPLE_SEED")
        .env_remove("GEOSAMPLE_SAMPLER_WORKERS")
        .output()
        .expect("Failed to execute command")
}

fn json_data(output: &Output) -> serde_json::Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(parsed["status"], "success");
    parsed["data"].clone()
}

#[test]
fn test_distance_json() {
    let data = json_data(&geosample(&[
        "--json",
        "distance",
        "-37.95103342",
        "144.42486789",
        "-37.65282114",
        "143.92649554",
    ]));

    let meters = data["distance_m"].as_f64().unwrap();
    assert!((meters - 54972.271).abs() < 1e-3, "distance {}", meters);
}

#[test]
fn test_destination_zero_distance() {
    let data = json_data(&geosample(&["--json", "destination", "40", "-110", "45", "0"]));
    assert_eq!(data["lat"].as_f64().unwrap(), 40.0);
    assert_eq!(data["lon"].as_f64().unwrap(), -110.0);
}

#[test]
fn test_invalid_latitude_fails() {
    let output = geosample(&["distance", "95", "0", "0", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_polyline_json() {
    let data = json_data(&geosample(&["--json", "polyline", "_p~iF~ps|U_ulLnnqC_mqNvxq`@"]));
    assert_eq!(data["points"].as_array().unwrap().len(), 3);
}

#[test]
fn test_generate_seeded_is_reproducible() {
    let mut source = NamedTempFile::new().unwrap();
    write!(
        source,
        r#"{{"type": "FeatureCollection", "features": [
            {{"type": "Feature", "properties": {{"name": "Plot"}},
              "geometry": {{"type": "Polygon",
                "coordinates": [[[10, 10], [11, 10], [11, 11], [10, 11], [10, 10]]]}}}},
            {{"type": "Feature", "properties": {{"name": "Antarctica"}},
              "geometry": {{"type": "Polygon",
                "coordinates": [[[0, -80], [10, -80], [10, -70], [0, -80]]]}}}}
        ]}}"#
    )
    .unwrap();
    let path = source.path().to_str().unwrap();

    let args = ["--json", "generate", path, "--count", "25", "--seed", "5"];
    let first = json_data(&geosample(&args));
    let second = json_data(&geosample(&args));

    assert_eq!(first["generated"], 25);
    assert_eq!(first["polygons"].as_array().unwrap().len(), 1);
    assert_eq!(first["points"], second["points"]);
}

#[test]
fn test_ingest_conforms_nearby_samples() {
    let mut submissions = NamedTempFile::new().unwrap();
    write!(
        submissions,
        r#"[
            {{"lat": 40.0, "lon": -110.0, "designation": "Validation"}},
            {{"lat": 95.0, "lon": 0.0}}
        ]"#
    )
    .unwrap();
    let path = submissions.path().to_str().unwrap();

    let data = json_data(&geosample(&["--json", "ingest", path, "--seed", "3"]));
    assert_eq!(data["submitted"], 2);
    assert_eq!(data["stored"], 1);
    assert_eq!(data["validation"], 1);
    assert_eq!(data["rejected"][0]["index"], 1);
}

#[test]
fn test_config_reads_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.toml");
    std::fs::write(&config_path, "neighbor_radius_m = 250.0\n").unwrap();

    let config_arg = config_path.to_str().unwrap();
    let data = json_data(&geosample(&["--json", "--config", config_arg, "config"]));
    let radius = data
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["key"] == "neighbor_radius_m")
        .unwrap();
    assert_eq!(radius["source"], "File");
}

#[test]
fn test_ingest_seeded_is_reproducible_with_concurrency() {
    let entries: Vec<String> =
        (0..24).map(|i| format!(r#"{{"lat": {}.5, "lon": {}.5}}"#, i - 12, i * 7 - 80)).collect();
    let mut submissions = NamedTempFile::new().unwrap();
    write!(submissions, "[{}]", entries.join(",")).unwrap();
    let path = submissions.path().to_str().unwrap();

    let roles = |data: serde_json::Value| {
        let mut roles: Vec<(String, String)> = data["samples"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| (s["raw_point"].to_string(), s["designation"].to_string()))
            .collect();
        roles.sort();
        roles
    };

    let args = ["--json", "ingest", path, "--seed", "11", "--concurrency", "8"];
    let first = roles(json_data(&geosample(&args)));
    let second = roles(json_data(&geosample(&args)));

    assert_eq!(first.len(), 24);
    assert_eq!(first, second);
}
