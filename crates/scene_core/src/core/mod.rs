//! # Core Module
//!
//! Shared configuration for the scene core and re-exports of the modules
//! other subsystems depend on.
//!
//! ## Organization
//!
//! - **Config**: Scene tunables loaded from TOML or RON
//! - **Foundation**: Low-level utilities (math, collections, logging, time)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{Config, ConfigError, SceneConfig};
