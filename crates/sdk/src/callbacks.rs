//! Callback function pointer types
//!
//! Two directions exist. Host-to-Core entry points are resolved from the
//! module by name (see [`crate::symbols`]). Core-to-Host callbacks are plain
//! `extern "C"` functions the host hands to the Core through the five
//! `retro_set_*` registration entry points, or through environment payloads.

use std::ffi::{c_char, c_void};

use crate::types::{RetroGameInfo, RetroSystemAvInfo, RetroSystemInfo};

// ==================== CORE -> HOST ====================

/// `retro_environment_t`
pub type EnvironmentFn = unsafe extern "C" fn(cmd: u32, data: *mut c_void) -> bool;

/// `retro_video_refresh_t`
///
/// `data` is null when the Core dupes the previous frame or renders through
/// a hardware context (`RETRO_HW_FRAME_BUFFER_VALID`).
pub type VideoRefreshFn =
    unsafe extern "C" fn(data: *const c_void, width: u32, height: u32, pitch: usize);

/// `retro_audio_sample_t`
pub type AudioSampleFn = unsafe extern "C" fn(left: i16, right: i16);

/// `retro_audio_sample_batch_t`, interleaved stereo frames
pub type AudioSampleBatchFn = unsafe extern "C" fn(data: *const i16, frames: usize) -> usize;

/// `retro_input_poll_t`
pub type InputPollFn = unsafe extern "C" fn();

/// `retro_input_state_t`
pub type InputStateFn = unsafe extern "C" fn(port: u32, device: u32, index: u32, id: u32) -> i16;

/// `retro_log_printf_t`
///
/// Variadic on the C side. Stable Rust cannot define variadic functions, so
/// the host's implementation only reads the fixed arguments.
pub type LogPrintfFn = unsafe extern "C" fn(level: u32, fmt: *const c_char, ...);

/// `retro_set_rumble_state_t`
pub type SetRumbleStateFn = unsafe extern "C" fn(port: u32, effect: u32, strength: u16) -> bool;

/// `retro_audio_buffer_status_callback_t`
pub type AudioBufferStatusFn =
    unsafe extern "C" fn(active: bool, occupancy: u32, underrun_likely: bool);

/// `retro_hw_context_reset_t` - used for both reset and destroy
pub type HwContextResetFn = unsafe extern "C" fn();

/// `retro_hw_get_current_framebuffer_t`
pub type HwGetCurrentFramebufferFn = unsafe extern "C" fn() -> usize;

/// `retro_proc_address_t`
pub type ProcAddressFn = unsafe extern "C" fn();

/// `retro_hw_get_proc_address_t`
pub type HwGetProcAddressFn = unsafe extern "C" fn(sym: *const c_char) -> Option<ProcAddressFn>;

// ==================== HOST -> CORE ====================

/// `void retro_init(void)` and every other `void (void)` entry point
pub type VoidFn = unsafe extern "C" fn();

/// `unsigned retro_api_version(void)`
pub type ApiVersionFn = unsafe extern "C" fn() -> u32;

/// `void retro_get_system_info(struct retro_system_info *)`
pub type GetSystemInfoFn = unsafe extern "C" fn(info: *mut RetroSystemInfo);

/// `void retro_get_system_av_info(struct retro_system_av_info *)`
pub type GetSystemAvInfoFn = unsafe extern "C" fn(info: *mut RetroSystemAvInfo);

/// `void retro_set_controller_port_device(unsigned port, unsigned device)`
pub type SetControllerPortDeviceFn = unsafe extern "C" fn(port: u32, device: u32);

/// `size_t retro_serialize_size(void)`
pub type SerializeSizeFn = unsafe extern "C" fn() -> usize;

/// `bool retro_serialize(void *data, size_t size)`
pub type SerializeFn = unsafe extern "C" fn(data: *mut c_void, size: usize) -> bool;

/// `bool retro_unserialize(const void *data, size_t size)`
pub type UnserializeFn = unsafe extern "C" fn(data: *const c_void, size: usize) -> bool;

/// `size_t retro_get_memory_size(unsigned id)`
pub type GetMemorySizeFn = unsafe extern "C" fn(id: u32) -> usize;

/// `void *retro_get_memory_data(unsigned id)`
pub type GetMemoryDataFn = unsafe extern "C" fn(id: u32) -> *mut c_void;

/// `bool retro_load_game(const struct retro_game_info *)`
pub type LoadGameFn = unsafe extern "C" fn(game: *const RetroGameInfo) -> bool;

/// `void retro_cheat_set(unsigned index, bool enabled, const char *code)`
pub type CheatSetFn = unsafe extern "C" fn(index: u32, enabled: bool, code: *const c_char);

/// `void retro_set_environment(retro_environment_t)`
pub type SetEnvironmentFn = unsafe extern "C" fn(cb: EnvironmentFn);

/// `void retro_set_video_refresh(retro_video_refresh_t)`
pub type SetVideoRefreshFn = unsafe extern "C" fn(cb: VideoRefreshFn);

/// `void retro_set_audio_sample(retro_audio_sample_t)`
pub type SetAudioSampleFn = unsafe extern "C" fn(cb: AudioSampleFn);

/// `void retro_set_audio_sample_batch(retro_audio_sample_batch_t)`
pub type SetAudioSampleBatchFn = unsafe extern "C" fn(cb: AudioSampleBatchFn);

/// `void retro_set_input_poll(retro_input_poll_t)`
pub type SetInputPollFn = unsafe extern "C" fn(cb: InputPollFn);

/// `void retro_set_input_state(retro_input_state_t)`
pub type SetInputStateFn = unsafe extern "C" fn(cb: InputStateFn);
