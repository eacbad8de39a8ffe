//! Bridge between the Core's C callbacks and the worker
//!
//! The Core calls plain `extern "C"` functions with no user pointer. The
//! worker installs a [`CallbackHub`] in a thread-local slot for the lifetime
//! of a session; the trampolines look it up and forward each call.

mod hub;
mod trampolines;

pub use hub::{with_hub, CallbackHub, HubError, HubGuard};
pub use trampolines::host_callbacks;
pub(crate) use trampolines::{get_current_framebuffer, get_proc_address};
