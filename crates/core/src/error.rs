//! Error types for the runtime
//!
//! [`OperationError`] carries the stable integer status codes handed back to
//! synchronous callers. [`RunnerError`] covers rejections from the control
//! surface and the one failure that ends a session.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Status code reported for a successful operation
pub const STATUS_SUCCESS: i32 = 0;

/// Failure of a save/load/screenshot style operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("Operation failed")]
    Failed,

    /// The worker is not running, or exited before answering
    #[error("Runner is not running")]
    AppNotRunning,

    /// The Core reported no memory for the request
    #[error("Core memory region is empty")]
    EmptyMemory,

    /// Source file is missing or empty
    #[error("File is missing or empty")]
    EmptyFile,

    /// The Core refused to serialize
    #[error("Cannot read Core memory")]
    CannotReadMemory,

    /// Writing the file failed, or the Core refused the data
    #[error("Cannot write data")]
    CannotWriteData,

    /// A synchronous wait was requested from the worker thread itself
    #[error("Synchronous command issued from the worker thread")]
    BadOperation,

    /// No Core or video output is available for the request
    #[error("Required component is missing")]
    ComponentMissing,
}

impl OperationError {
    /// Integer status code for the C surface
    pub const fn code(self) -> i32 {
        match self {
            Self::Failed => -1000,
            Self::AppNotRunning => -999,
            Self::EmptyMemory => -998,
            Self::EmptyFile => -997,
            Self::CannotReadMemory => -996,
            Self::CannotWriteData => -995,
            Self::BadOperation => -994,
            Self::ComponentMissing => -993,
        }
    }
}

/// Result of a save/load/screenshot style operation
pub type OperationResult = Result<(), OperationError>;

/// Collapse an operation result into its status code
pub fn status_code(result: OperationResult) -> i32 {
    match result {
        Ok(()) => STATUS_SUCCESS,
        Err(e) => e.code(),
    }
}

/// Errors from the runner's control surface
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// `start` was called before paths were set
    #[error("Paths are not set")]
    PathsNotReady,

    #[error("Runner is already running")]
    AlreadyRunning,

    #[error("Failed to spawn thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The Core refused the content; ends the session
    #[error("Core failed to load content {0:?}")]
    ContentLoad(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
