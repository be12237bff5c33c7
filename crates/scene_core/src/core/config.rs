//! # Scene Configuration
//!
//! Tunables for the scene core. Loaded once at startup through the [`Config`]
//! trait (TOML or RON, picked by file extension); every field has a default so
//! partial files are accepted.

use serde::{Deserialize, Serialize};

// Re-export from the config module for convenience
pub use crate::config::{Config, ConfigError};

/// Nested instance expansion stops at this depth by default
pub const DEFAULT_MAX_INSTANCE_RECURSION: u32 = 4;

/// # Scene Configuration
///
/// Controls instancing depth, table compaction and garbage collection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Depth at which nested instance expansion silently stops
    pub max_instance_recursion: u32,
    /// Storage-to-live ratio above which `compact_components` repacks a table
    pub compaction_threshold: f32,
    /// Upper bound on passes of the collection fixpoint loop
    pub max_gc_passes: usize,
    /// Per-frame budget for queued loads, in milliseconds
    pub load_budget_ms: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_instance_recursion: DEFAULT_MAX_INSTANCE_RECURSION,
            compaction_threshold: 2.0,
            max_gc_passes: 64,
            load_budget_ms: 4,
        }
    }
}

impl Config for SceneConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.compaction_threshold < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "compaction_threshold must be >= 1.0, got {}",
                self.compaction_threshold
            )));
        }
        if self.max_gc_passes == 0 {
            return Err(ConfigError::Invalid("max_gc_passes must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl SceneConfig {
    /// Builder pattern: set the instance recursion cap
    pub const fn with_max_instance_recursion(mut self, depth: u32) -> Self {
        self.max_instance_recursion = depth;
        self
    }

    /// Builder pattern: set the compaction threshold
    pub fn with_compaction_threshold(mut self, ratio: f32) -> Self {
        self.compaction_threshold = ratio;
        self
    }

    /// Per-frame load budget as a duration
    pub const fn load_budget(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.load_budget_ms)
    }
}
