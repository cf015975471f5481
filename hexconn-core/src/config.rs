//! Search configuration

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::eval::EvalWeights;

/// Engine configuration
///
/// Every refinement over plain alpha-beta can be switched off, which turns
/// the engine into a fixed-depth minimax player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per decision in seconds
    pub time_limit_secs: f64,
    /// Deepest iteration searched
    pub max_depth: u32,
    /// Half-width of the MTD(f) search window
    pub aspiration_window: f32,
    /// Search depths 1..=max_depth, otherwise only max_depth
    pub iterative_deepening: bool,
    /// Converge with narrow-window passes before the full-window pass
    pub use_mtdf: bool,
    pub use_transposition_table: bool,
    pub use_killer_moves: bool,
    pub use_history: bool,
    /// Order moves by how much they would help the opponent
    pub use_defensive_ordering: bool,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 10.0,
            max_depth: 4,
            aspiration_window: 10.0,
            iterative_deepening: true,
            use_mtdf: true,
            use_transposition_table: true,
            use_killer_moves: true,
            use_history: true,
            use_defensive_ordering: true,
            weights: EvalWeights::default(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("max_depth must be at least 1")]
    ZeroDepth,

    #[error("aspiration_window must be positive and finite, got {0}")]
    InvalidWindow(f32),

    #[error("time_limit_secs must be non-negative and finite, got {0}")]
    InvalidTimeLimit(f64),
}

impl SearchConfig {
    /// Plain depth-limited alpha-beta with every refinement disabled
    pub fn plain(max_depth: u32) -> Self {
        Self {
            max_depth,
            iterative_deepening: false,
            use_mtdf: false,
            use_transposition_table: false,
            use_killer_moves: false,
            use_history: false,
            use_defensive_ordering: false,
            ..Default::default()
        }
    }

    pub fn with_time_limit(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_aspiration_window(mut self, window: f32) -> Self {
        self.aspiration_window = window;
        self
    }

    pub fn with_transposition_table(mut self, enabled: bool) -> Self {
        self.use_transposition_table = enabled;
        self
    }

    /// Toggle killer, history and defensive ordering together
    pub fn with_move_ordering(mut self, enabled: bool) -> Self {
        self.use_killer_moves = enabled;
        self.use_history = enabled;
        self.use_defensive_ordering = enabled;
        self
    }

    pub fn with_weights(mut self, weights: EvalWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Time budget as a duration; malformed limits count as no time at all
    pub fn time_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::ZERO)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if !(self.aspiration_window.is_finite() && self.aspiration_window > 0.0) {
            return Err(ConfigError::InvalidWindow(self.aspiration_window));
        }
        if !(self.time_limit_secs.is_finite() && self.time_limit_secs >= 0.0) {
            return Err(ConfigError::InvalidTimeLimit(self.time_limit_secs));
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: SearchConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
