//! Simulation parameters and variant presets
//!
//! A config is fixed for the lifetime of a simulation. Presets reproduce the
//! three classic setups (free gas in a box, cold gas with one moving tracer,
//! Bunimovich stadium) plus a circular arena.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_COLLISIONS_PER_STEP, MAX_FRAME_DT, PARTICLE_RADIUS, PLACEMENT_ATTEMPTS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Shape of the playable region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryShape {
    #[default]
    Rectangle,
    Stadium,
    Circle,
}

/// Whether particles interact with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    #[default]
    None,
    PairwiseElastic,
}

/// How particles are placed and launched on reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InitialMotion {
    /// Random position, speed `V` in a random direction
    #[default]
    RandomDirection,
    /// Random position at rest, except particle 0 which moves (tracer)
    SingleMover,
    /// Every particle starts at the centre with speed `V`
    Centered,
}

/// Named presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    NonInteracting,
    Cold,
    Bunimovich,
    Circle,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::NonInteracting,
        Variant::Cold,
        Variant::Bunimovich,
        Variant::Circle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::NonInteracting => "non_interacting",
            Variant::Cold => "cold",
            Variant::Bunimovich => "bunimovich",
            Variant::Circle => "circle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "non_interacting" | "ideal" | "free" => Some(Variant::NonInteracting),
            "cold" | "cold_gas" => Some(Variant::Cold),
            "bunimovich" | "stadium" => Some(Variant::Bunimovich),
            "circle" | "circular" => Some(Variant::Circle),
            _ => None,
        }
    }

    pub fn config(&self) -> SimConfig {
        let base = SimConfig::default();
        match self {
            Variant::NonInteracting => base,
            Variant::Cold => SimConfig {
                speed: 0.1,
                count: 50,
                collisions: CollisionMode::PairwiseElastic,
                initial_motion: InitialMotion::SingleMover,
                ..base
            },
            Variant::Bunimovich => SimConfig {
                width: 600.0,
                height: 400.0,
                speed: 0.5,
                count: 1,
                boundary: BoundaryShape::Stadium,
                initial_motion: InitialMotion::Centered,
                ..base
            },
            Variant::Circle => SimConfig {
                boundary: BoundaryShape::Circle,
                collisions: CollisionMode::PairwiseElastic,
                ..base
            },
        }
    }
}

/// Full parameter set for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// World width `W`
    pub width: f64,
    /// World height `H`
    pub height: f64,
    /// Particle radius `R`
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Particle count `N`
    pub count: usize,
    /// Initial speed `V`
    pub speed: f64,
    #[serde(default)]
    pub boundary: BoundaryShape,
    #[serde(default)]
    pub collisions: CollisionMode,
    #[serde(default)]
    pub initial_motion: InitialMotion,

    /// Largest frame delta simulated in one step
    #[serde(default = "default_max_frame_dt")]
    pub max_frame_dt: f64,
    /// Pair collisions resolved per step before the rest is skipped
    #[serde(default = "default_max_collisions")]
    pub max_collisions_per_step: usize,
    /// Rejection sampling attempts per particle on reset
    #[serde(default = "default_placement_attempts")]
    pub placement_attempts: usize,

    /// RNG seed (random when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_radius() -> f64 {
    PARTICLE_RADIUS
}

fn default_max_frame_dt() -> f64 {
    MAX_FRAME_DT
}

fn default_max_collisions() -> usize {
    MAX_COLLISIONS_PER_STEP
}

fn default_placement_attempts() -> usize {
    PLACEMENT_ATTEMPTS
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            radius: PARTICLE_RADIUS,
            count: 30,
            speed: 0.2,
            boundary: BoundaryShape::Rectangle,
            collisions: CollisionMode::None,
            initial_motion: InitialMotion::RandomDirection,
            max_frame_dt: MAX_FRAME_DT,
            max_collisions_per_step: MAX_COLLISIONS_PER_STEP,
            placement_attempts: PLACEMENT_ATTEMPTS,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_variant(variant: Variant) -> Self {
        variant.config()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("radius", self.radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{name} must be positive and finite, got {value}"));
            }
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return invalid(format!("speed must be non-negative and finite, got {}", self.speed));
        }
        if self.width <= 2.0 * self.radius || self.height <= 2.0 * self.radius {
            return invalid(format!(
                "a {}x{} world cannot hold a particle of radius {}",
                self.width, self.height, self.radius
            ));
        }
        if self.boundary == BoundaryShape::Stadium && self.width < self.height {
            return invalid(format!(
                "stadium needs width >= height, got {}x{}",
                self.width, self.height
            ));
        }
        if !self.max_frame_dt.is_finite() || self.max_frame_dt <= 0.0 {
            return invalid(format!("max_frame_dt must be positive, got {}", self.max_frame_dt));
        }
        if self.max_collisions_per_step == 0 {
            return invalid("max_collisions_per_step must be at least 1".to_string());
        }
        if self.initial_motion == InitialMotion::Centered
            && self.collisions == CollisionMode::PairwiseElastic
            && self.count > 1
        {
            return invalid("centered start would stack interacting particles".to_string());
        }
        Ok(())
    }
}
