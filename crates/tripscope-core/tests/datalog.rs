//! Trip log loading tests

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tripscope_core::config::PlaybackConfig;
use tripscope_core::datalog::{load_trip, write_csv, DatalogError};
use tripscope_core::demo::{Scenario, TripGenerator};
use tripscope_core::playback::PlaybackController;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write a file into the temp dir and return its path
fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_write_then_load_csv() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let trip = TripGenerator::new(Scenario::Emergency)
        .with_seed(4)
        .with_duration(3.0)
        .generate();
    let path = dir.path().join("emergency.csv");
    write_csv(&path, trip.samples()).unwrap();

    let loaded = load_trip(&path).unwrap();
    assert_eq!(loaded.name(), "emergency");
    assert_eq!(loaded.len(), trip.len());
    for (a, b) in loaded.samples().iter().zip(trip.samples()) {
        assert!((a.time - b.time).abs() < 1e-3);
        assert!((a.vehicle_speed - b.vehicle_speed).abs() < 1e-4);
        assert!((a.collision_margin - b.collision_margin).abs() < 1e-4);
    }
}

#[test]
fn test_load_json_trip() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(
        &dir,
        "short.json",
        r#"{
  "samples": [
    { "time": 0.0, "vehicleSpeed": 5.0, "collisionMargin": 4.0 },
    { "time": 0.1, "vehicleSpeed": 5.5, "collisionMargin": 1.4 }
  ]
}"#,
    );
    let trip = load_trip(&path).unwrap();
    assert_eq!(trip.len(), 2);
    assert_eq!(trip.samples()[1].collision_margin, 1.4);
    assert_eq!(trip.time_range(), Some((0.0, 0.1)));
}

#[test]
fn test_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "trip.mlg", "binary");
    assert!(matches!(load_trip(&path), Err(DatalogError::UnknownFormat(_))));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.csv");
    assert!(matches!(load_trip(&path), Err(DatalogError::Io(_))));
}

#[test]
fn test_open_player_with_config() {
    let dir = TempDir::new().unwrap();
    let trip_path = create_temp_file(
        &dir,
        "trip.csv",
        "time,speed,collision_margin\n0.0,10,3.0\n0.5,10,1.2\n1.0,10,3.0\n",
    );
    let config_path = dir.path().join("playback.json");
    let mut config = PlaybackConfig::default();
    config.detector.warning_threshold = 1.0;
    config.detector.critical_threshold = 0.5;
    config.save(&config_path).unwrap();

    let mut player = PlaybackController::open(&trip_path, Some(&config_path)).unwrap();
    // 1.2 is above the configured warning threshold
    assert!(player.seek(0.5).is_none());

    let mut player = PlaybackController::open(&trip_path, None::<&PathBuf>).unwrap();
    assert!(player.seek(0.5).is_some());
}

#[test]
fn test_open_reports_context() {
    let dir = TempDir::new().unwrap();
    let trip_path = dir.path().join("missing.csv");
    let err = PlaybackController::open(&trip_path, None::<&PathBuf>)
        .err()
        .expect("missing trip should fail");
    assert!(format!("{err:#}").contains("loading trip"));
}

#[test]
fn test_loaded_trip_validation_report() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(
        &dir,
        "noisy.csv",
        "time,speed,collision_margin\n0.0,10,NaN\n0.1,10,-0.2\n0.2,10,2.0\n",
    );
    let trip = load_trip(&path).unwrap();
    let report = trip.validate();
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 2);
    let margin = report
        .signals
        .iter()
        .find(|s| s.name == "collision_margin")
        .unwrap();
    assert_eq!(margin.issue_count, 2);
}
