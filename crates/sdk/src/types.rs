//! `#[repr(C)]` structs exchanged with the Core
//!
//! Layouts match `libretro.h` field for field. C enums are carried as `u32`;
//! the named values live in [`crate::consts`].

use std::ffi::{c_char, c_void};
use std::ptr;

use crate::callbacks::{
    AudioBufferStatusFn, HwContextResetFn, HwGetCurrentFramebufferFn, HwGetProcAddressFn,
    LogPrintfFn, SetRumbleStateFn,
};

/// `struct retro_system_info`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroSystemInfo {
    pub library_name: *const c_char,
    pub library_version: *const c_char,
    /// Pipe-delimited extension list, e.g. `"nes|fds"`
    pub valid_extensions: *const c_char,
    /// Core wants the path only, never a memory buffer
    pub need_fullpath: bool,
    pub block_extract: bool,
}

impl Default for RetroSystemInfo {
    fn default() -> Self {
        Self {
            library_name: ptr::null(),
            library_version: ptr::null(),
            valid_extensions: ptr::null(),
            need_fullpath: false,
            block_extract: false,
        }
    }
}

/// `struct retro_game_geometry`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetroGameGeometry {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    /// 0.0 means "derive from base width / height"
    pub aspect_ratio: f32,
}

/// `struct retro_system_timing`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetroSystemTiming {
    pub fps: f64,
    pub sample_rate: f64,
}

/// `struct retro_system_av_info`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetroSystemAvInfo {
    pub geometry: RetroGameGeometry,
    pub timing: RetroSystemTiming,
}

/// `struct retro_game_info`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroGameInfo {
    pub path: *const c_char,
    pub data: *const c_void,
    pub size: usize,
    pub meta: *const c_char,
}

impl Default for RetroGameInfo {
    fn default() -> Self {
        Self {
            path: ptr::null(),
            data: ptr::null(),
            size: 0,
            meta: ptr::null(),
        }
    }
}

/// `struct retro_variable`
///
/// For `SET_VARIABLES` the array is terminated by an entry with a null key.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroVariable {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// `struct retro_message`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroMessage {
    pub msg: *const c_char,
    pub frames: u32,
}

/// `struct retro_message_ext`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroMessageExt {
    pub msg: *const c_char,
    pub duration: u32,
    pub priority: u32,
    pub level: u32,
    pub target: u32,
    pub kind: u32,
    pub progress: i8,
}

/// `struct retro_hw_render_callback`
///
/// In/out: the Core fills the request fields and the reset/destroy
/// callbacks, the host fills `get_current_framebuffer` and `get_proc_address`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroHwRenderCallback {
    pub context_type: u32,
    pub context_reset: Option<HwContextResetFn>,
    pub get_current_framebuffer: Option<HwGetCurrentFramebufferFn>,
    pub get_proc_address: Option<HwGetProcAddressFn>,
    pub depth: bool,
    pub stencil: bool,
    pub bottom_left_origin: bool,
    pub version_major: u32,
    pub version_minor: u32,
    pub cache_context: bool,
    pub context_destroy: Option<HwContextResetFn>,
    pub debug_context: bool,
}

impl Default for RetroHwRenderCallback {
    fn default() -> Self {
        Self {
            context_type: 0,
            context_reset: None,
            get_current_framebuffer: None,
            get_proc_address: None,
            depth: false,
            stencil: false,
            bottom_left_origin: false,
            version_major: 0,
            version_minor: 0,
            cache_context: false,
            context_destroy: None,
            debug_context: false,
        }
    }
}

/// `struct retro_hw_render_context_negotiation_interface`
///
/// Only the common header; API specific interfaces extend it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetroHwRenderContextNegotiationInterface {
    pub interface_type: u32,
    pub interface_version: u32,
}

/// `struct retro_controller_description`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroControllerDescription {
    pub desc: *const c_char,
    pub id: u32,
}

/// `struct retro_controller_info`
///
/// `SET_CONTROLLER_INFO` passes an array of these, one per port, terminated
/// by an entry whose `types` pointer is null.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroControllerInfo {
    pub types: *const RetroControllerDescription,
    pub num_types: u32,
}

/// `struct retro_log_callback`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetroLogCallback {
    pub log: Option<LogPrintfFn>,
}

/// `struct retro_rumble_interface`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetroRumbleInterface {
    pub set_rumble_state: Option<SetRumbleStateFn>,
}

/// `struct retro_audio_buffer_status_callback`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetroAudioBufferStatusCallback {
    pub callback: Option<AudioBufferStatusFn>,
}

/// `struct retro_framebuffer`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RetroFramebuffer {
    pub data: *mut c_void,
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
    pub format: u32,
    pub access_flags: u32,
    pub memory_flags: u32,
}

/// Opaque `struct retro_disk_control_callback`
///
/// The host only records the pointer; it never calls through it.
#[repr(C)]
pub struct RetroDiskControlCallback {
    _opaque: [u8; 0],
}
