#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;

use log::{debug, trace};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Interaction radius used by the terminal front-end when none is given
pub const DEFAULT_RADIUS: f64 = 20.0;

/// Flock size used by the terminal front-end when none is given
pub const DEFAULT_BOID_COUNT: usize = 250;

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        sqrt(self.x * self.x + self.y * self.y)
    }

    pub fn distance(&self, other: &Vector2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        sqrt(dx * dx + dy * dy)
    }
}

#[cfg(feature = "std")]
fn sqrt(value: f64) -> f64 {
    value.sqrt()
}

#[cfg(not(feature = "std"))]
fn sqrt(value: f64) -> f64 {
    libm::sqrt(value)
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl core::ops::SubAssign for Vector2D {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

/// A single boid entity
#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub position: Vector2D,
    pub velocity: Vector2D,
    /// Indices into the owning flock, rebuilt every tick
    pub neighbors: Vec<usize>,
}

impl Boid {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Self {
            position,
            velocity,
            neighbors: Vec::new(),
        }
    }

    /// Places a boid the way the terminal program seeds its flock: a square
    /// of side `height` centred horizontally, heading down-right.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, height: f64, width: f64, min_speed: f64) -> Self {
        let position = Vector2D::new(
            width / 2.0 - height / 2.0 + rng.gen::<f64>() * height,
            rng.gen::<f64>() * height,
        );
        let velocity = Vector2D::new(rng.gen::<f64>() * min_speed, rng.gen::<f64>() * min_speed);
        Self::new(position, velocity)
    }
}

/// Configuration for the boid simulation
///
/// `max_speed < min_speed` is a caller error and is not checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidConfig {
    pub separation_factor: f64,
    pub alignment_factor: f64,
    pub cohesion_factor: f64,
    pub turn_impulse: f64,
    pub margin: f64,
    pub separation_threshold: f64,
    pub max_speed: f64,
    pub min_speed: f64,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            separation_factor: 0.05,
            alignment_factor: 0.05,
            cohesion_factor: 0.0008,
            turn_impulse: 0.2,
            margin: 25.0,
            separation_threshold: 2.0,
            max_speed: 2.5,
            min_speed: 1.0,
        }
    }
}

/// Helper functions for boid behavior
///
/// Every rule reads a frozen view of the previous tick: the boid itself and
/// the neighbors it found during the graph build.
pub mod behavior {
    use super::*;

    /// Sum of offsets away from neighbors closer than the separation threshold.
    pub fn separation<'a, I>(boid: &Boid, neighbors: I, config: &BoidConfig) -> Vector2D
    where
        I: Iterator<Item = &'a Boid>,
    {
        let mut steering = Vector2D::zero();

        for other in neighbors {
            if boid.position.distance(&other.position) < config.separation_threshold {
                steering += boid.position - other.position;
            }
        }

        steering * config.separation_factor
    }

    /// Average neighbor heading, zero when there are no neighbors.
    pub fn alignment<'a, I>(neighbors: I, config: &BoidConfig) -> Vector2D
    where
        I: Iterator<Item = &'a Boid>,
    {
        let mut sum = Vector2D::zero();
        let mut count = 0;

        for other in neighbors {
            sum += other.velocity;
            count += 1;
        }

        if count > 0 {
            sum / count as f64 * config.alignment_factor
        } else {
            Vector2D::zero()
        }
    }

    /// Pull toward the neighbors' centre of mass, zero when there are no neighbors.
    pub fn cohesion<'a, I>(boid: &Boid, neighbors: I, config: &BoidConfig) -> Vector2D
    where
        I: Iterator<Item = &'a Boid>,
    {
        let mut sum = Vector2D::zero();
        let mut count = 0;

        for other in neighbors {
            sum += other.position;
            count += 1;
        }

        if count > 0 {
            (sum / count as f64 - boid.position) * config.cohesion_factor
        } else {
            Vector2D::zero()
        }
    }

    /// Velocity after the three flocking rules, before edge avoidance and clamping.
    pub fn steer(boid: &Boid, flock: &[Boid], config: &BoidConfig) -> Vector2D {
        let neighbors = move || boid.neighbors.iter().map(move |&index| &flock[index]);

        boid.velocity
            + separation(boid, neighbors(), config)
            + alignment(neighbors(), config)
            + cohesion(boid, neighbors(), config)
    }

    /// Nudges the velocity back inside the surface, one axis at a time.
    /// Both edges are checked, so a surface narrower than two margins applies both.
    pub fn avoid_edges(
        position: Vector2D,
        mut velocity: Vector2D,
        height: f64,
        width: f64,
        config: &BoidConfig,
    ) -> Vector2D {
        if position.x > width - config.margin {
            velocity.x -= config.turn_impulse;
        }
        if position.x < config.margin {
            velocity.x += config.turn_impulse;
        }
        if position.y > height - config.margin {
            velocity.y -= config.turn_impulse;
        }
        if position.y < config.margin {
            velocity.y += config.turn_impulse;
        }
        velocity
    }

    /// Rescales the velocity into `[min_speed, max_speed]`.
    ///
    /// A zero velocity has no direction to rescale along and is returned as is.
    pub fn clamp_speed(velocity: Vector2D, config: &BoidConfig) -> Vector2D {
        let speed = velocity.magnitude();
        if speed == 0.0 {
            velocity
        } else if speed > config.max_speed {
            velocity / speed * config.max_speed
        } else if speed < config.min_speed {
            velocity / speed * config.min_speed
        } else {
            velocity
        }
    }

    /// Explicit Euler step with unit time per tick.
    pub fn integrate(position: Vector2D, velocity: Vector2D) -> Vector2D {
        position + velocity
    }

    /// Full per-boid update: returns the new `(position, velocity)`.
    pub fn advance(
        boid: &Boid,
        flock: &[Boid],
        height: f64,
        width: f64,
        config: &BoidConfig,
    ) -> (Vector2D, Vector2D) {
        let velocity = steer(boid, flock, config);
        let velocity = avoid_edges(boid.position, velocity, height, width, config);
        let velocity = clamp_speed(velocity, config);
        (integrate(boid.position, velocity), velocity)
    }
}

/// Read-only snapshot of flock-wide statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockSummary {
    pub tick: u64,
    pub boid_count: usize,
    pub centroid: Vector2D,
    pub mean_speed: f64,
    pub mean_neighbors: f64,
    pub isolated: usize,
}

/// A fixed-size collection of boids sharing one configuration
#[derive(Debug, Clone)]
pub struct Flock {
    boids: Vec<Boid>,
    config: BoidConfig,
    radius: f64,
    tick: u64,
}

impl Flock {
    /// Seeds a flock on a `height` x `width` surface from `seed`.
    #[cfg(feature = "std")]
    pub fn new(
        radius: f64,
        count: usize,
        config: BoidConfig,
        height: u32,
        width: u32,
        seed: u64,
    ) -> Self {
        use rand::{rngs::StdRng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(radius, count, config, height, width, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(
        radius: f64,
        count: usize,
        config: BoidConfig,
        height: u32,
        width: u32,
        rng: &mut R,
    ) -> Self {
        let boids = (0..count)
            .map(|_| Boid::random(rng, height as f64, width as f64, config.min_speed))
            .collect();
        debug!(
            "seeded {} boids on a {}x{} surface (radius {})",
            count, height, width, radius
        );
        Self::from_boids(radius, config, boids)
    }

    pub fn from_boids(radius: f64, config: BoidConfig, boids: Vec<Boid>) -> Self {
        Self {
            boids,
            config,
            radius,
            tick: 0,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn config(&self) -> &BoidConfig {
        &self.config
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn neighbors_of(&self, index: usize) -> impl Iterator<Item = &Boid> + '_ {
        self.boids[index]
            .neighbors
            .iter()
            .map(move |&other| &self.boids[other])
    }

    /// Runs one tick against the current surface bounds.
    ///
    /// The neighbor graph is complete before any boid moves, and every boid
    /// steers from the same pre-tick snapshot, so the result does not depend
    /// on iteration order.
    pub fn update(&mut self, height: u32, width: u32) {
        let edges = self.build_neighbors();

        let next = self.advance_all(height as f64, width as f64);
        for (boid, (position, velocity)) in self.boids.iter_mut().zip(next) {
            boid.position = position;
            boid.velocity = velocity;
        }

        self.tick += 1;
        trace!("tick {}: {} neighbor pairs", self.tick, edges);
    }

    /// Rebuilds every boid's neighbor list from current positions and returns
    /// the number of neighbor pairs. Each pair is tested once; lists come out
    /// in ascending index order.
    pub fn build_neighbors(&mut self) -> usize {
        for boid in self.boids.iter_mut() {
            boid.neighbors.clear();
        }

        let pairs = self.close_pairs();
        let mut edges = 0;
        for (i, partners) in pairs.into_iter().enumerate() {
            for j in partners {
                self.boids[i].neighbors.push(j);
                self.boids[j].neighbors.push(i);
                edges += 1;
            }
        }
        edges
    }

    /// For each boid `i`, the boids `j > i` strictly within the radius.
    fn close_pairs(&self) -> Vec<Vec<usize>> {
        let boids = &self.boids;
        let radius = self.radius;
        let row = |i: usize| -> Vec<usize> {
            let position = boids[i].position;
            (i + 1..boids.len())
                .filter(|&j| position.distance(&boids[j].position) < radius)
                .collect()
        };

        #[cfg(feature = "parallel")]
        {
            (0..boids.len()).into_par_iter().map(row).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..boids.len()).map(row).collect()
        }
    }

    fn advance_all(&self, height: f64, width: f64) -> Vec<(Vector2D, Vector2D)> {
        let boids = &self.boids;
        let config = &self.config;

        #[cfg(feature = "parallel")]
        {
            boids
                .par_iter()
                .map(|boid| behavior::advance(boid, boids, height, width, config))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            boids
                .iter()
                .map(|boid| behavior::advance(boid, boids, height, width, config))
                .collect()
        }
    }

    pub fn summary(&self) -> FlockSummary {
        let count = self.boids.len();
        let mut centroid = Vector2D::zero();
        let mut speed = 0.0;
        let mut neighbors = 0;
        let mut isolated = 0;

        for boid in &self.boids {
            centroid += boid.position;
            speed += boid.velocity.magnitude();
            neighbors += boid.neighbors.len();
            if boid.neighbors.is_empty() {
                isolated += 1;
            }
        }

        let (centroid, mean_speed, mean_neighbors) = if count > 0 {
            let n = count as f64;
            (centroid / n, speed / n, neighbors as f64 / n)
        } else {
            (Vector2D::zero(), 0.0, 0.0)
        };

        FlockSummary {
            tick: self.tick,
            boid_count: count,
            centroid,
            mean_speed,
            mean_neighbors,
            isolated,
        }
    }
}
