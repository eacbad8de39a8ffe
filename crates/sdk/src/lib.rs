//! retrorunner SDK - libretro Core ABI Definitions
//!
//! This crate mirrors the parts of `libretro.h` the host needs. It has no
//! dependencies and compiles quickly, allowing parallel compilation of
//! dependent crates.
//!
//! # Modules
//!
//! - [`types`] - `#[repr(C)]` structs exchanged with the Core
//! - [`callbacks`] - Function pointer types for both directions of the ABI
//! - [`environment`] - Environment opcodes and their payload directions
//! - [`symbols`] - Exported entry point names resolved by the loader
//! - [`consts`] - Pixel formats, device ids, memory ids and friends

pub mod callbacks;
pub mod consts;
pub mod environment;
pub mod symbols;
pub mod types;

pub use callbacks::*;
pub use consts::*;
pub use types::*;

/// ABI version this host implements (`retro_api_version`)
pub const RETRO_API_VERSION: u32 = 1;
