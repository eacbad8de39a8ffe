//! Runtime contexts
//!
//! [`CoreRuntimeContext`] holds what the Core declared about itself;
//! [`GameRuntimeContext`] holds what is known about the loaded content.
//! Both are owned by the worker and shared with the environment dispatcher
//! through weak references only.

mod core_runtime;
mod game_runtime;

use std::sync::Arc;

use parking_lot::RwLock;

pub use core_runtime::{ControllerDescription, CoreRuntimeContext, HwRender, NegotiationInterface};
pub use game_runtime::GameRuntimeContext;

/// Core context handle shared between the worker and the dispatcher
pub type SharedCoreContext = Arc<RwLock<CoreRuntimeContext>>;

/// Game context handle shared between the worker and the dispatcher
pub type SharedGameContext = Arc<RwLock<GameRuntimeContext>>;
