//! C-compatible exports

mod exports;
mod logging;

pub use exports::*;
