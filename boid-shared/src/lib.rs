#![cfg_attr(not(feature = "std"), no_std)]

use boid_core::{BoidConfig, FlockSummary, Vector2D, DEFAULT_BOID_COUNT, DEFAULT_RADIUS};
use serde::{Deserialize, Serialize};

/// Represents a 2D position in surface coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Vector2D> for Position {
    fn from(v: Vector2D) -> Self {
        Self::new(v.x, v.y)
    }
}

/// A character cell on a `rows` x `cols` surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
}

impl Cell {
    /// Maps a position to the cell it falls in, truncating toward zero.
    /// Positions off the surface have no cell.
    pub fn from_position(position: Position, rows: u16, cols: u16) -> Option<Self> {
        if !(position.x >= 0.0 && position.y >= 0.0) {
            return None;
        }
        let row = position.y as u64;
        let col = position.x as u64;
        if row < rows as u64 && col < cols as u64 {
            Some(Self {
                row: row as u16,
                col: col as u16,
            })
        } else {
            None
        }
    }
}

/// Flocking rule weights and limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlockingSettings {
    pub separation_factor: f64,
    pub alignment_factor: f64,
    pub cohesion_factor: f64,
    pub turn_impulse: f64,
    pub margin: f64,
    pub separation_threshold: f64,
    pub max_speed: f64,
    pub min_speed: f64,
}

impl Default for FlockingSettings {
    fn default() -> Self {
        BoidConfig::default().into()
    }
}

impl From<BoidConfig> for FlockingSettings {
    fn from(config: BoidConfig) -> Self {
        Self {
            separation_factor: config.separation_factor,
            alignment_factor: config.alignment_factor,
            cohesion_factor: config.cohesion_factor,
            turn_impulse: config.turn_impulse,
            margin: config.margin,
            separation_threshold: config.separation_threshold,
            max_speed: config.max_speed,
            min_speed: config.min_speed,
        }
    }
}

impl From<FlockingSettings> for BoidConfig {
    fn from(settings: FlockingSettings) -> Self {
        Self {
            separation_factor: settings.separation_factor,
            alignment_factor: settings.alignment_factor,
            cohesion_factor: settings.cohesion_factor,
            turn_impulse: settings.turn_impulse,
            margin: settings.margin,
            separation_threshold: settings.separation_threshold,
            max_speed: settings.max_speed,
            min_speed: settings.min_speed,
        }
    }
}

/// Everything needed to start a simulation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub radius: f64,
    pub boid_count: usize,
    /// None picks a fresh seed per run
    pub seed: Option<u64>,
    pub flocking: FlockingSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            boid_count: DEFAULT_BOID_COUNT,
            seed: None,
            flocking: FlockingSettings::default(),
        }
    }
}

#[cfg(feature = "std")]
impl SimulationSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn config(&self) -> BoidConfig {
        self.flocking.into()
    }
}

/// Snapshot of the flock after a tick, reported by headless runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub boid_count: usize,
    pub centroid: Position,
    pub mean_speed: f64,
    pub mean_neighbors: f64,
    pub isolated: usize,
}

impl From<FlockSummary> for TickReport {
    fn from(summary: FlockSummary) -> Self {
        Self {
            tick: summary.tick,
            boid_count: summary.boid_count,
            centroid: summary.centroid.into(),
            mean_speed: summary.mean_speed,
            mean_neighbors: summary.mean_neighbors,
            isolated: summary.isolated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_truncates_toward_zero() {
        let cell = Cell::from_position(Position::new(3.9, 0.2), 24, 80);
        assert_eq!(cell, Some(Cell { row: 0, col: 3 }));
    }

    #[test]
    fn test_cell_off_surface() {
        assert_eq!(Cell::from_position(Position::new(-0.5, 2.0), 24, 80), None);
        assert_eq!(Cell::from_position(Position::new(80.0, 2.0), 24, 80), None);
        assert_eq!(Cell::from_position(Position::new(5.0, 24.0), 24, 80), None);
        assert_eq!(Cell::from_position(Position::new(f64::NAN, 1.0), 24, 80), None);
        assert_eq!(Cell::from_position(Position::new(1.0, 1.0), 0, 0), None);
    }

    #[test]
    fn test_partial_settings_fall_back_to_defaults() {
        let settings =
            SimulationSettings::from_json(r#"{"boid_count": 500, "flocking": {"margin": 10.0}}"#)
                .unwrap();

        assert_eq!(settings.boid_count, 500);
        assert_eq!(settings.radius, DEFAULT_RADIUS);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.flocking.margin, 10.0);
        assert_eq!(settings.flocking.max_speed, 2.5);
        assert_eq!(settings.config().margin, 10.0);
    }

    #[test]
    fn test_settings_reject_bad_types() {
        assert!(SimulationSettings::from_json(r#"{"radius": "wide"}"#).is_err());
    }

    #[test]
    fn test_default_settings_match_core_defaults() {
        let settings = SimulationSettings::default();
        assert_eq!(settings.config(), BoidConfig::default());
        assert_eq!(settings.boid_count, DEFAULT_BOID_COUNT);
    }

    #[test]
    fn test_report_from_summary() {
        let summary = FlockSummary {
            tick: 3,
            boid_count: 2,
            centroid: Vector2D::new(1.0, 2.0),
            mean_speed: 1.5,
            mean_neighbors: 1.0,
            isolated: 0,
        };
        let report = TickReport::from(summary);
        assert_eq!(report.centroid, Position::new(1.0, 2.0));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"tick\":3"));
    }
}
