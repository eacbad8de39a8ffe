//! retrorunner core - hosting a libretro Core on a worker thread
//!
//! This crate contains everything between the host application and a loaded
//! Core: the command queue, the environment protocol, the runtime contexts
//! and the worker loop that paces simulation steps.
//!
//! # Threading
//!
//! [`AppContext`] is the only type the host talks to, from any thread. Its
//! methods enqueue commands. One worker thread per session owns the Core and
//! is the only thread that ever calls into it. Core callbacks arrive on that
//! thread and are routed through a thread-local bridge.
//!
//! # Re-exports
//!
//! - [`sdk`] - libretro ABI types and constants
//! - [`engine`] - Core module loading

pub use retrorunner_engine as engine;
pub use retrorunner_sdk as sdk;

pub mod app;
pub mod bridge;
pub mod cheats;
pub mod commands;
pub mod config;
pub mod contexts;
pub mod drivers;
pub mod environment;
pub mod error;
pub mod notify;
pub mod pacer;
pub mod paths;
pub mod state;

#[cfg(test)]
mod test_support;

pub use app::{AppContext, CoreOpener};
pub use cheats::{Cheat, CheatKey, CheatManager};
pub use commands::{CommandKind, CommandQueue, Opcode};
pub use config::{config_path, ConfigError, ConfigResult, HwContextSupport, RunnerConfig, CONFIG_FILE_NAME};
pub use contexts::{CoreRuntimeContext, GameRuntimeContext};
pub use drivers::{
    AudioSink, DefaultDrivers, DriverFactory, Frame, FrameData, InputSink, SoftwareInput, VideoSink,
    VideoSurface,
};
pub use error::{status_code, OperationError, OperationResult, RunnerError, STATUS_SUCCESS};
pub use notify::{Notification, NotifyCallback};
pub use paths::Paths;
pub use state::AppState;
