//! Error types for core module loading

use std::path::PathBuf;

/// Error type for core loading operations
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Module path cannot be passed to the dynamic loader
    #[error("Invalid module path: {0:?}")]
    InvalidPath(PathBuf),

    /// Dynamic loader refused to open the module
    #[error("Failed to open {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// A mandatory entry point is not exported by the module
    #[error("Missing mandatory symbol: {0}")]
    MissingSymbol(String),

    /// Dynamic loading is not available on this platform
    #[error("Dynamic core loading is not supported on this platform")]
    Unsupported,
}
