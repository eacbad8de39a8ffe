//! Host functions handed to the Core through environment interfaces

use std::ffi::{c_char, CStr};

use retrorunner_sdk::{LogPrintfFn, RETRO_LOG_DEBUG, RETRO_LOG_ERROR, RETRO_LOG_INFO, RETRO_LOG_WARN};

type LogSinkFn = unsafe extern "C" fn(level: u32, message: *const c_char);

extern "C" {
    // csrc/core_log.c: expands the format with vsnprintf, then calls the sink
    fn rr_core_log(level: u32, fmt: *const c_char, ...);
    fn rr_core_log_set_sink(sink: LogSinkFn);
}

/// Log callback for `GET_LOG_INTERFACE`
pub fn log_printf() -> LogPrintfFn {
    // SAFETY: the sink is a plain function valid for the program's lifetime
    unsafe { rr_core_log_set_sink(core_log) };
    rr_core_log
}

unsafe extern "C" fn core_log(level: u32, message: *const c_char) {
    if message.is_null() {
        return;
    }
    let message = CStr::from_ptr(message).to_string_lossy();
    let message = message.trim_end();
    match level {
        RETRO_LOG_DEBUG => tracing::debug!(target: "core", "{}", message),
        RETRO_LOG_INFO => tracing::info!(target: "core", "{}", message),
        RETRO_LOG_WARN => tracing::warn!(target: "core", "{}", message),
        RETRO_LOG_ERROR => tracing::error!(target: "core", "{}", message),
        _ => tracing::trace!(target: "core", "{}", message),
    }
}

/// Rumble is not supported by any output
pub unsafe extern "C" fn set_rumble_state(port: u32, effect: u32, strength: u16) -> bool {
    tracing::trace!("Rumble port={} effect={} strength={}", port, effect, strength);
    false
}
