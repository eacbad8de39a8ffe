//! Exported entry point names
//!
//! These strings must match exactly what a Core exports.
//! Null-terminated so they can be passed to the dynamic loader directly.

pub const RETRO_INIT: &[u8] = b"retro_init\0";
pub const RETRO_DEINIT: &[u8] = b"retro_deinit\0";
pub const RETRO_API_VERSION: &[u8] = b"retro_api_version\0";
pub const RETRO_GET_SYSTEM_INFO: &[u8] = b"retro_get_system_info\0";
pub const RETRO_GET_SYSTEM_AV_INFO: &[u8] = b"retro_get_system_av_info\0";
pub const RETRO_SET_CONTROLLER_PORT_DEVICE: &[u8] = b"retro_set_controller_port_device\0";
pub const RETRO_RESET: &[u8] = b"retro_reset\0";
pub const RETRO_RUN: &[u8] = b"retro_run\0";
pub const RETRO_SERIALIZE_SIZE: &[u8] = b"retro_serialize_size\0";
pub const RETRO_SERIALIZE: &[u8] = b"retro_serialize\0";
pub const RETRO_UNSERIALIZE: &[u8] = b"retro_unserialize\0";
pub const RETRO_GET_MEMORY_SIZE: &[u8] = b"retro_get_memory_size\0";
pub const RETRO_GET_MEMORY_DATA: &[u8] = b"retro_get_memory_data\0";
pub const RETRO_LOAD_GAME: &[u8] = b"retro_load_game\0";
pub const RETRO_UNLOAD_GAME: &[u8] = b"retro_unload_game\0";

// Callback registration
pub const RETRO_SET_ENVIRONMENT: &[u8] = b"retro_set_environment\0";
pub const RETRO_SET_VIDEO_REFRESH: &[u8] = b"retro_set_video_refresh\0";
pub const RETRO_SET_AUDIO_SAMPLE: &[u8] = b"retro_set_audio_sample\0";
pub const RETRO_SET_AUDIO_SAMPLE_BATCH: &[u8] = b"retro_set_audio_sample_batch\0";
pub const RETRO_SET_INPUT_POLL: &[u8] = b"retro_set_input_poll\0";
pub const RETRO_SET_INPUT_STATE: &[u8] = b"retro_set_input_state\0";

// Optional
pub const RETRO_CHEAT_RESET: &[u8] = b"retro_cheat_reset\0";
pub const RETRO_CHEAT_SET: &[u8] = b"retro_cheat_set\0";

/// Entry points a Core must export for the load to succeed
pub const MANDATORY: &[&[u8]] = &[
    RETRO_INIT,
    RETRO_DEINIT,
    RETRO_API_VERSION,
    RETRO_GET_SYSTEM_INFO,
    RETRO_GET_SYSTEM_AV_INFO,
    RETRO_SET_CONTROLLER_PORT_DEVICE,
    RETRO_RESET,
    RETRO_RUN,
    RETRO_SERIALIZE_SIZE,
    RETRO_SERIALIZE,
    RETRO_UNSERIALIZE,
    RETRO_GET_MEMORY_SIZE,
    RETRO_GET_MEMORY_DATA,
    RETRO_LOAD_GAME,
    RETRO_UNLOAD_GAME,
    RETRO_SET_ENVIRONMENT,
    RETRO_SET_VIDEO_REFRESH,
    RETRO_SET_AUDIO_SAMPLE,
    RETRO_SET_AUDIO_SAMPLE_BATCH,
    RETRO_SET_INPUT_POLL,
    RETRO_SET_INPUT_STATE,
];

/// Entry points a Core may omit
pub const OPTIONAL: &[&[u8]] = &[RETRO_CHEAT_RESET, RETRO_CHEAT_SET];

/// Display form of a symbol constant (without the trailing NUL)
pub fn display(symbol: &[u8]) -> &str {
    let bytes = symbol.strip_suffix(b"\0").unwrap_or(symbol);
    std::str::from_utf8(bytes).unwrap_or("<invalid>")
}
