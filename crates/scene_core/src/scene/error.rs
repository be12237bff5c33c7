//! Scene error types

use crate::scene::NodeRef;

/// Errors returned by fallible scene operations
///
/// Stale handles are not errors; they are reported through the scene's
/// diagnostic sink and answered with a default value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The loader has no scene under this path
    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    /// The loader found the scene but could not build it
    #[error("Failed to load scene '{path}': {reason}")]
    Load {
        /// Scene path
        path: String,
        /// Loader-specific description
        reason: String,
    },

    /// Instance host node is stale or invalid
    #[error("Invalid instance host node {0:?}")]
    InvalidHost(NodeRef),

    /// Scene text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}
