//! Difficulty presets and engine settings, loadable from TOML.

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::heuristics::EvalWeights;

/// Strength of the automated player.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// Search budget used when a board is too large for the exact solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    /// Plies searched by the bounded minimax.
    pub max_depth: u32,
    /// Wall-clock budget per move, in milliseconds.
    pub time_limit_ms: u64,
    /// Largest components considered at the root, on top of each region's best.
    pub candidate_limit: usize,
}

impl DifficultyPreset {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// True when every budget of `self` is at least the corresponding budget of `other`.
    pub fn dominates(&self, other: &DifficultyPreset) -> bool {
        self.max_depth >= other.max_depth
            && self.time_limit_ms >= other.time_limit_ms
            && self.candidate_limit >= other.candidate_limit
    }
}

/// Per-difficulty presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetTable {
    pub easy: DifficultyPreset,
    pub medium: DifficultyPreset,
    pub hard: DifficultyPreset,
}

impl Default for PresetTable {
    fn default() -> Self {
        PresetTable {
            easy: DifficultyPreset {
                max_depth: 4,
                time_limit_ms: 500,
                candidate_limit: 3,
            },
            medium: DifficultyPreset {
                max_depth: 6,
                time_limit_ms: 1000,
                candidate_limit: 5,
            },
            hard: DifficultyPreset {
                max_depth: 10,
                time_limit_ms: 2000,
                candidate_limit: 8,
            },
        }
    }
}

impl PresetTable {
    pub fn get(&self, difficulty: Difficulty) -> DifficultyPreset {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Engine configuration, loadable from TOML.
///
/// ```toml
/// exact_cell_limit = 20
/// hint_difficulty = "medium"
///
/// [presets.hard]
/// max_depth = 12
/// time_limit_ms = 3000
/// candidate_limit = 10
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Boards with at most this many occupied cells are solved exactly.
    pub exact_cell_limit: usize,
    /// Budget used for hints on boards above `exact_cell_limit`.
    pub hint_difficulty: Difficulty,
    pub presets: PresetTable,
    pub weights: EvalWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            exact_cell_limit: 20,
            hint_difficulty: Difficulty::Medium,
            presets: PresetTable::default(),
            weights: EvalWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn preset(&self, difficulty: Difficulty) -> DifficultyPreset {
        self.presets.get(difficulty)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exact_cell_limit == 0 {
            return Err(ConfigError::Validation(
                "exact_cell_limit must be > 0".into(),
            ));
        }
        for difficulty in Difficulty::ALL {
            let preset = self.preset(difficulty);
            if preset.max_depth == 0 {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty:?}.max_depth must be > 0"
                )));
            }
            if preset.time_limit_ms == 0 {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty:?}.time_limit_ms must be > 0"
                )));
            }
            if preset.candidate_limit == 0 {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty:?}.candidate_limit must be > 0"
                )));
            }
        }
        if !self.presets.medium.dominates(&self.presets.easy)
            || !self.presets.hard.dominates(&self.presets.medium)
        {
            return Err(ConfigError::Validation(
                "presets must not weaken from easy to medium to hard".into(),
            ));
        }
        Ok(())
    }
}
