//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Collections and data structures (slot stores, generational handles)
//! - The time-budgeted load queue
//! - Logging utilities and scene diagnostics

pub mod math;
pub mod collections;
pub mod load_queue;
pub mod logging;
