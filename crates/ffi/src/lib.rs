//! retrorunner - C control surface
//!
//! This crate compiles to a cdylib exposing `rr_*` functions over
//! [`retrorunner_core::AppContext`]. The header is generated by cbindgen at
//! build time into `include/retrorunner.h`.

pub mod ffi;
