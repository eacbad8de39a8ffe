//! Named values for the C enums and bit masks of the ABI

// Pixel formats (`enum retro_pixel_format`)
pub const RETRO_PIXEL_FORMAT_0RGB1555: u32 = 0;
pub const RETRO_PIXEL_FORMAT_XRGB8888: u32 = 1;
pub const RETRO_PIXEL_FORMAT_RGB565: u32 = 2;

// Hardware context types (`enum retro_hw_context_type`)
pub const RETRO_HW_CONTEXT_NONE: u32 = 0;
pub const RETRO_HW_CONTEXT_OPENGL: u32 = 1;
pub const RETRO_HW_CONTEXT_OPENGLES2: u32 = 2;
pub const RETRO_HW_CONTEXT_OPENGL_CORE: u32 = 3;
pub const RETRO_HW_CONTEXT_OPENGLES3: u32 = 4;
pub const RETRO_HW_CONTEXT_OPENGLES_VERSION: u32 = 5;
pub const RETRO_HW_CONTEXT_VULKAN: u32 = 6;
pub const RETRO_HW_CONTEXT_D3D11: u32 = 7;
pub const RETRO_HW_CONTEXT_D3D10: u32 = 8;
pub const RETRO_HW_CONTEXT_D3D12: u32 = 9;
pub const RETRO_HW_CONTEXT_D3D9: u32 = 10;

/// Passed as `data` to `retro_video_refresh_t` when a hardware frame is ready
pub const RETRO_HW_FRAME_BUFFER_VALID: usize = usize::MAX;

// Negotiation interface types (`enum retro_hw_render_context_negotiation_interface_type`)
pub const RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN: u32 = 0;
/// Highest Vulkan negotiation interface version this host understands
pub const RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN_VERSION: u32 = 2;

// Input devices
pub const RETRO_DEVICE_TYPE_SHIFT: u32 = 8;
pub const RETRO_DEVICE_MASK: u32 = (1 << RETRO_DEVICE_TYPE_SHIFT) - 1;
pub const RETRO_DEVICE_NONE: u32 = 0;
pub const RETRO_DEVICE_JOYPAD: u32 = 1;
pub const RETRO_DEVICE_MOUSE: u32 = 2;
pub const RETRO_DEVICE_KEYBOARD: u32 = 3;
pub const RETRO_DEVICE_LIGHTGUN: u32 = 4;
pub const RETRO_DEVICE_ANALOG: u32 = 5;
pub const RETRO_DEVICE_POINTER: u32 = 6;

// Joypad buttons
pub const RETRO_DEVICE_ID_JOYPAD_B: u32 = 0;
pub const RETRO_DEVICE_ID_JOYPAD_Y: u32 = 1;
pub const RETRO_DEVICE_ID_JOYPAD_SELECT: u32 = 2;
pub const RETRO_DEVICE_ID_JOYPAD_START: u32 = 3;
pub const RETRO_DEVICE_ID_JOYPAD_UP: u32 = 4;
pub const RETRO_DEVICE_ID_JOYPAD_DOWN: u32 = 5;
pub const RETRO_DEVICE_ID_JOYPAD_LEFT: u32 = 6;
pub const RETRO_DEVICE_ID_JOYPAD_RIGHT: u32 = 7;
pub const RETRO_DEVICE_ID_JOYPAD_A: u32 = 8;
pub const RETRO_DEVICE_ID_JOYPAD_X: u32 = 9;
pub const RETRO_DEVICE_ID_JOYPAD_L: u32 = 10;
pub const RETRO_DEVICE_ID_JOYPAD_R: u32 = 11;
pub const RETRO_DEVICE_ID_JOYPAD_L2: u32 = 12;
pub const RETRO_DEVICE_ID_JOYPAD_R2: u32 = 13;
pub const RETRO_DEVICE_ID_JOYPAD_L3: u32 = 14;
pub const RETRO_DEVICE_ID_JOYPAD_R3: u32 = 15;
/// Query all 16 joypad buttons at once as a bitmask
pub const RETRO_DEVICE_ID_JOYPAD_MASK: u32 = 256;

// Analog
pub const RETRO_DEVICE_INDEX_ANALOG_LEFT: u32 = 0;
pub const RETRO_DEVICE_INDEX_ANALOG_RIGHT: u32 = 1;
pub const RETRO_DEVICE_INDEX_ANALOG_BUTTON: u32 = 2;
pub const RETRO_DEVICE_ID_ANALOG_X: u32 = 0;
pub const RETRO_DEVICE_ID_ANALOG_Y: u32 = 1;

// Memory regions for `retro_get_memory_*`
pub const RETRO_MEMORY_SAVE_RAM: u32 = 0;
pub const RETRO_MEMORY_RTC: u32 = 1;
pub const RETRO_MEMORY_SYSTEM_RAM: u32 = 2;
pub const RETRO_MEMORY_VIDEO_RAM: u32 = 3;

// Log levels (`enum retro_log_level`)
pub const RETRO_LOG_DEBUG: u32 = 0;
pub const RETRO_LOG_INFO: u32 = 1;
pub const RETRO_LOG_WARN: u32 = 2;
pub const RETRO_LOG_ERROR: u32 = 3;

// `GET_AUDIO_VIDEO_ENABLE` flags
pub const RETRO_AV_ENABLE_VIDEO: i32 = 1 << 0;
pub const RETRO_AV_ENABLE_AUDIO: i32 = 1 << 1;
pub const RETRO_AV_ENABLE_FAST_SAVESTATES: i32 = 1 << 2;
pub const RETRO_AV_ENABLE_HARD_DISABLE_AUDIO: i32 = 1 << 3;

// `enum retro_savestate_context`
pub const RETRO_SAVESTATE_CONTEXT_NORMAL: u32 = 0;

// `enum retro_language`
pub const RETRO_LANGUAGE_ENGLISH: u32 = 0;
