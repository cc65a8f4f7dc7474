pub mod app;
pub mod render;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use boid_core::Flock;
use boid_shared::{SimulationSettings, TickReport};

/// Reads a JSON settings file; missing fields keep their defaults.
pub fn load_settings(path: &Path) -> Result<SimulationSettings> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    SimulationSettings::from_json(&json)
        .with_context(|| format!("invalid settings in {}", path.display()))
}

/// Seeds a flock for a `height` x `width` surface, drawing a fresh seed when
/// the settings carry none.
pub fn build_flock(settings: &SimulationSettings, height: u32, width: u32) -> Flock {
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!(
        "Seeding {} boids (radius {}, seed {})",
        settings.boid_count,
        settings.radius,
        seed
    );
    Flock::new(
        settings.radius,
        settings.boid_count,
        settings.config(),
        height,
        width,
        seed,
    )
}

/// Runs `ticks` ticks on a fixed surface without touching the terminal.
pub fn run_headless(settings: &SimulationSettings, ticks: u64, height: u32, width: u32) -> TickReport {
    let mut flock = build_flock(settings, height, width);
    for _ in 0..ticks {
        flock.update(height, width);
    }

    let report = TickReport::from(flock.summary());
    log::debug!("Headless run finished: {:?}", report);
    report
}
