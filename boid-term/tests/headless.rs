use anyhow::Result;
use boid_shared::SimulationSettings;
use boid_term::{build_flock, load_settings, run_headless};
use std::{fs, path::PathBuf};

/// Writes `json` to a per-test file in the system temp directory
fn settings_file(name: &str, json: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!(
        "boid-term-{}-{}.json",
        name,
        std::process::id()
    ));
    fs::write(&path, json)?;
    Ok(path)
}

fn seeded(count: usize, seed: u64) -> SimulationSettings {
    SimulationSettings {
        boid_count: count,
        seed: Some(seed),
        ..SimulationSettings::default()
    }
}

#[test]
fn test_headless_run_is_reproducible() {
    let settings = seeded(120, 2024);

    let first = run_headless(&settings, 25, 200, 300);
    let second = run_headless(&settings, 25, 200, 300);

    assert_eq!(first, second);
    assert_eq!(first.tick, 25);
    assert_eq!(first.boid_count, 120);
}

#[test]
fn test_headless_speeds_stay_in_range() {
    let settings = seeded(200, 8);
    let config = settings.config();

    let report = run_headless(&settings, 40, 300, 300);

    assert!(report.mean_speed >= config.min_speed - 1e-9);
    assert!(report.mean_speed <= config.max_speed + 1e-9);
    assert!(report.centroid.x.is_finite() && report.centroid.y.is_finite());
}

#[test]
fn test_zero_ticks_reports_initial_flock() {
    let report = run_headless(&seeded(15, 1), 0, 100, 100);

    assert_eq!(report.tick, 0);
    assert_eq!(report.boid_count, 15);
    assert_eq!(report.mean_neighbors, 0.0);
    assert_eq!(report.isolated, 15);
}

#[test]
fn test_settings_file_drives_the_run() -> Result<()> {
    let path = settings_file(
        "drives",
        r#"{"boid_count": 42, "radius": 30.0, "seed": 77, "flocking": {"max_speed": 3.0}}"#,
    )?;

    let settings = load_settings(&path)?;
    fs::remove_file(&path)?;

    assert_eq!(settings.boid_count, 42);
    assert_eq!(settings.flocking.max_speed, 3.0);
    assert_eq!(settings.flocking.min_speed, 1.0);

    let flock = build_flock(&settings, 100, 100);
    assert_eq!(flock.len(), 42);
    assert_eq!(flock.radius(), 30.0);
    assert_eq!(flock.config().max_speed, 3.0);

    let report = run_headless(&settings, 10, 100, 100);
    assert_eq!(report.boid_count, 42);
    Ok(())
}

#[test]
fn test_missing_settings_file_is_reported() {
    let path = std::env::temp_dir().join("boid-term-does-not-exist.json");
    let err = load_settings(&path).unwrap_err();
    assert!(err.to_string().contains("failed to read settings"));
}

#[test]
fn test_malformed_settings_file_is_reported() -> Result<()> {
    let path = settings_file("malformed", r#"{"boid_count": -3}"#)?;

    let result = load_settings(&path);
    fs::remove_file(&path)?;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("invalid settings"));
    Ok(())
}
