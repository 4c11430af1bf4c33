use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of tiles along each side of the square grid
    pub tile_count: usize,
    /// Size of one tile in surface units (pointer coordinates use the same units)
    pub cell_size: f32,

    // Pacing
    /// Step interval at the start of a game, in milliseconds
    pub initial_speed_ms: u64,
    /// Step interval floor, in milliseconds
    pub min_speed_ms: u64,
    /// How much the step interval shrinks on each speed-up, in milliseconds
    pub speed_step_ms: u64,

    // Scoring
    /// Points awarded per food eaten
    pub food_score: u32,
    /// The game speeds up whenever the score lands on a multiple of this
    pub speed_up_every: u32,

    /// Moving into the cell the tail leaves this tick is allowed
    pub tail_vacates: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_count: 20,
            cell_size: 20.0,
            initial_speed_ms: 150,
            min_speed_ms: 50,
            speed_step_ms: 10,
            food_score: 10,
            speed_up_every: 50,
            tail_vacates: true,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(tile_count: usize) -> Self {
        Self {
            tile_count,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    pub fn initial_speed(&self) -> Duration {
        Duration::from_millis(self.initial_speed_ms)
    }

    pub fn min_speed(&self) -> Duration {
        Duration::from_millis(self.min_speed_ms)
    }

    pub fn speed_step(&self) -> Duration {
        Duration::from_millis(self.speed_step_ms)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_count < 2 {
            return Err(format!("tile_count must be at least 2, got {}", self.tile_count));
        }
        if !(self.cell_size > 0.0) {
            return Err(format!("cell_size must be positive, got {}", self.cell_size));
        }
        if self.initial_speed_ms == 0 {
            return Err("initial_speed_ms must be positive".to_string());
        }
        if self.min_speed_ms > self.initial_speed_ms {
            return Err(format!(
                "min_speed_ms ({}) cannot exceed initial_speed_ms ({})",
                self.min_speed_ms, self.initial_speed_ms
            ));
        }
        if self.food_score == 0 {
            return Err("food_score must be positive".to_string());
        }
        // A snake covering the whole board must still have a representable score
        let cells = (self.tile_count as u64).checked_mul(self.tile_count as u64);
        let max_score = cells.and_then(|cells| cells.checked_mul(u64::from(self.food_score)));
        if max_score.is_none_or(|score| score > u64::from(u32::MAX)) {
            return Err(format!(
                "tile_count ({}) and food_score ({}) allow scores beyond {}",
                self.tile_count,
                self.food_score,
                u32::MAX
            ));
        }
        if self.speed_up_every == 0 {
            return Err("speed_up_every must be positive".to_string());
        }
        Ok(())
    }
}
