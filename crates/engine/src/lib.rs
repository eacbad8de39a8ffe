//! retrorunner engine - Core module loading and entry point binding
//!
//! This crate handles:
//! - Opening a Core module through the platform's dynamic loader
//! - Binding every mandatory `retro_*` entry point in one atomic step
//! - Exposing safe wrappers over the bound entry points
//!
//! # Architecture
//!
//! [`Core::load`] opens the module via [`library::Library`] and resolves the
//! table through [`CoreSymbols::resolve`]. A failure at any step closes the
//! module again, so callers only ever hold fully bound Cores.
//!
//! # Thread Safety
//!
//! A [`Core`] is `Send` but not `Sync`. Every call into it is expected to
//! happen on the single worker thread that owns it.

pub mod error;
pub mod library;
pub mod loader;

pub use error::LoadError;
pub use library::Library;
pub use loader::{Core, CoreSymbols, HostCallbacks, SystemInfo};
