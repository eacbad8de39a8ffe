//! Environment protocol opcodes
//!
//! The Core calls the environment callback with one of these opcodes and a
//! payload pointer whose type and direction depend on the opcode. Values must
//! match `libretro.h` exactly.

/// Flag for opcodes that are not yet part of the stable ABI
pub const EXPERIMENTAL: u32 = 0x10000;

/// Flag for frontend-private opcodes
pub const PRIVATE: u32 = 0x20000;

pub const SET_ROTATION: u32 = 1;
pub const GET_OVERSCAN: u32 = 2;
pub const GET_CAN_DUPE: u32 = 3;
pub const SET_MESSAGE: u32 = 6;
pub const SHUTDOWN: u32 = 7;
pub const SET_PERFORMANCE_LEVEL: u32 = 8;
pub const GET_SYSTEM_DIRECTORY: u32 = 9;
pub const SET_PIXEL_FORMAT: u32 = 10;
pub const SET_INPUT_DESCRIPTORS: u32 = 11;
pub const SET_KEYBOARD_CALLBACK: u32 = 12;
pub const SET_DISK_CONTROL_INTERFACE: u32 = 13;
pub const SET_HW_RENDER: u32 = 14;
pub const GET_VARIABLE: u32 = 15;
pub const SET_VARIABLES: u32 = 16;
pub const GET_VARIABLE_UPDATE: u32 = 17;
pub const SET_SUPPORT_NO_GAME: u32 = 18;
pub const GET_LIBRETRO_PATH: u32 = 19;
pub const SET_FRAME_TIME_CALLBACK: u32 = 21;
pub const SET_AUDIO_CALLBACK: u32 = 22;
pub const GET_RUMBLE_INTERFACE: u32 = 23;
pub const GET_INPUT_DEVICE_CAPABILITIES: u32 = 24;
pub const GET_SENSOR_INTERFACE: u32 = 25 | EXPERIMENTAL;
pub const GET_CAMERA_INTERFACE: u32 = 26 | EXPERIMENTAL;
pub const GET_LOG_INTERFACE: u32 = 27;
pub const GET_PERF_INTERFACE: u32 = 28;
pub const GET_LOCATION_INTERFACE: u32 = 29;
/// Also known as `GET_CONTENT_DIRECTORY`
pub const GET_CORE_ASSETS_DIRECTORY: u32 = 30;
pub const GET_SAVE_DIRECTORY: u32 = 31;
pub const SET_SYSTEM_AV_INFO: u32 = 32;
pub const SET_PROC_ADDRESS_CALLBACK: u32 = 33;
pub const SET_SUBSYSTEM_INFO: u32 = 34;
pub const SET_CONTROLLER_INFO: u32 = 35;
pub const SET_MEMORY_MAPS: u32 = 36 | EXPERIMENTAL;
pub const SET_GEOMETRY: u32 = 37;
pub const GET_USERNAME: u32 = 38;
pub const GET_LANGUAGE: u32 = 39;
pub const GET_CURRENT_SOFTWARE_FRAMEBUFFER: u32 = 40 | EXPERIMENTAL;
pub const GET_HW_RENDER_INTERFACE: u32 = 41 | EXPERIMENTAL;
pub const SET_SUPPORT_ACHIEVEMENTS: u32 = 42 | EXPERIMENTAL;
pub const SET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE: u32 = 43 | EXPERIMENTAL;
pub const SET_SERIALIZATION_QUIRKS: u32 = 44;
pub const SET_HW_SHARED_CONTEXT: u32 = 44 | EXPERIMENTAL;
pub const GET_VFS_INTERFACE: u32 = 45 | EXPERIMENTAL;
pub const GET_LED_INTERFACE: u32 = 46 | EXPERIMENTAL;
pub const GET_AUDIO_VIDEO_ENABLE: u32 = 47 | EXPERIMENTAL;
pub const GET_MIDI_INTERFACE: u32 = 48 | EXPERIMENTAL;
pub const GET_FASTFORWARDING: u32 = 49 | EXPERIMENTAL;
pub const GET_TARGET_REFRESH_RATE: u32 = 50 | EXPERIMENTAL;
pub const GET_INPUT_BITMASKS: u32 = 51 | EXPERIMENTAL;
pub const GET_CORE_OPTIONS_VERSION: u32 = 52;
pub const SET_CORE_OPTIONS: u32 = 53;
pub const SET_CORE_OPTIONS_INTL: u32 = 54;
pub const SET_CORE_OPTIONS_DISPLAY: u32 = 55;
pub const GET_PREFERRED_HW_RENDER: u32 = 56;
pub const GET_DISK_CONTROL_INTERFACE_VERSION: u32 = 57;
pub const SET_DISK_CONTROL_EXT_INTERFACE: u32 = 58;
pub const GET_MESSAGE_INTERFACE_VERSION: u32 = 59;
pub const SET_MESSAGE_EXT: u32 = 60;
pub const GET_INPUT_MAX_USERS: u32 = 61;
pub const SET_AUDIO_BUFFER_STATUS_CALLBACK: u32 = 62;
pub const SET_MINIMUM_AUDIO_LATENCY: u32 = 63;
pub const SET_FASTFORWARDING_OVERRIDE: u32 = 64;
pub const SET_CONTENT_INFO_OVERRIDE: u32 = 65;
pub const GET_GAME_INFO_EXT: u32 = 66;
pub const SET_CORE_OPTIONS_V2: u32 = 67;
pub const SET_CORE_OPTIONS_V2_INTL: u32 = 68;
pub const SET_CORE_OPTIONS_UPDATE_DISPLAY_CALLBACK: u32 = 69;
pub const SET_VARIABLE: u32 = 70;
pub const GET_THROTTLE_STATE: u32 = 71 | EXPERIMENTAL;
pub const GET_SAVESTATE_CONTEXT: u32 = 72 | EXPERIMENTAL;
pub const GET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_SUPPORT: u32 = 73 | EXPERIMENTAL;
pub const GET_JIT_CAPABLE: u32 = 74;
pub const GET_MICROPHONE_INTERFACE: u32 = 75 | EXPERIMENTAL;
pub const GET_DEVICE_POWER: u32 = 77 | EXPERIMENTAL;
pub const SET_NETPACKET_INTERFACE: u32 = 78;
pub const GET_PLAYLIST_DIRECTORY: u32 = 79;
pub const GET_FILE_BROWSER_START_DIRECTORY: u32 = 80;

/// Which way the payload flows for an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host writes into the payload
    Get,
    /// Host reads from the payload
    Set,
    /// Host reads the request and writes back host callbacks
    Negotiate,
}

/// One row of the opcode table
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub code: u32,
    pub name: &'static str,
    pub direction: Direction,
}

const fn op(code: u32, name: &'static str, direction: Direction) -> Opcode {
    Opcode {
        code,
        name,
        direction,
    }
}

/// Every opcode of the protocol, in numeric order
pub const OPCODES: &[Opcode] = &[
    op(SET_ROTATION, "SET_ROTATION", Direction::Set),
    op(GET_OVERSCAN, "GET_OVERSCAN", Direction::Get),
    op(GET_CAN_DUPE, "GET_CAN_DUPE", Direction::Get),
    op(SET_MESSAGE, "SET_MESSAGE", Direction::Set),
    op(SHUTDOWN, "SHUTDOWN", Direction::Set),
    op(SET_PERFORMANCE_LEVEL, "SET_PERFORMANCE_LEVEL", Direction::Set),
    op(GET_SYSTEM_DIRECTORY, "GET_SYSTEM_DIRECTORY", Direction::Get),
    op(SET_PIXEL_FORMAT, "SET_PIXEL_FORMAT", Direction::Set),
    op(SET_INPUT_DESCRIPTORS, "SET_INPUT_DESCRIPTORS", Direction::Set),
    op(SET_KEYBOARD_CALLBACK, "SET_KEYBOARD_CALLBACK", Direction::Set),
    op(SET_DISK_CONTROL_INTERFACE, "SET_DISK_CONTROL_INTERFACE", Direction::Set),
    op(SET_HW_RENDER, "SET_HW_RENDER", Direction::Negotiate),
    op(GET_VARIABLE, "GET_VARIABLE", Direction::Get),
    op(SET_VARIABLES, "SET_VARIABLES", Direction::Set),
    op(GET_VARIABLE_UPDATE, "GET_VARIABLE_UPDATE", Direction::Get),
    op(SET_SUPPORT_NO_GAME, "SET_SUPPORT_NO_GAME", Direction::Set),
    op(GET_LIBRETRO_PATH, "GET_LIBRETRO_PATH", Direction::Get),
    op(SET_FRAME_TIME_CALLBACK, "SET_FRAME_TIME_CALLBACK", Direction::Set),
    op(SET_AUDIO_CALLBACK, "SET_AUDIO_CALLBACK", Direction::Set),
    op(GET_RUMBLE_INTERFACE, "GET_RUMBLE_INTERFACE", Direction::Get),
    op(GET_INPUT_DEVICE_CAPABILITIES, "GET_INPUT_DEVICE_CAPABILITIES", Direction::Get),
    op(GET_LOG_INTERFACE, "GET_LOG_INTERFACE", Direction::Get),
    op(GET_PERF_INTERFACE, "GET_PERF_INTERFACE", Direction::Get),
    op(GET_LOCATION_INTERFACE, "GET_LOCATION_INTERFACE", Direction::Get),
    op(GET_CORE_ASSETS_DIRECTORY, "GET_CORE_ASSETS_DIRECTORY", Direction::Get),
    op(GET_SAVE_DIRECTORY, "GET_SAVE_DIRECTORY", Direction::Get),
    op(SET_SYSTEM_AV_INFO, "SET_SYSTEM_AV_INFO", Direction::Set),
    op(SET_PROC_ADDRESS_CALLBACK, "SET_PROC_ADDRESS_CALLBACK", Direction::Set),
    op(SET_SUBSYSTEM_INFO, "SET_SUBSYSTEM_INFO", Direction::Set),
    op(SET_CONTROLLER_INFO, "SET_CONTROLLER_INFO", Direction::Set),
    op(SET_GEOMETRY, "SET_GEOMETRY", Direction::Set),
    op(GET_USERNAME, "GET_USERNAME", Direction::Get),
    op(GET_LANGUAGE, "GET_LANGUAGE", Direction::Get),
    op(SET_SERIALIZATION_QUIRKS, "SET_SERIALIZATION_QUIRKS", Direction::Set),
    op(GET_CORE_OPTIONS_VERSION, "GET_CORE_OPTIONS_VERSION", Direction::Get),
    op(SET_CORE_OPTIONS, "SET_CORE_OPTIONS", Direction::Set),
    op(SET_CORE_OPTIONS_INTL, "SET_CORE_OPTIONS_INTL", Direction::Set),
    op(SET_CORE_OPTIONS_DISPLAY, "SET_CORE_OPTIONS_DISPLAY", Direction::Set),
    op(GET_PREFERRED_HW_RENDER, "GET_PREFERRED_HW_RENDER", Direction::Get),
    op(GET_DISK_CONTROL_INTERFACE_VERSION, "GET_DISK_CONTROL_INTERFACE_VERSION", Direction::Get),
    op(SET_DISK_CONTROL_EXT_INTERFACE, "SET_DISK_CONTROL_EXT_INTERFACE", Direction::Set),
    op(GET_MESSAGE_INTERFACE_VERSION, "GET_MESSAGE_INTERFACE_VERSION", Direction::Get),
    op(SET_MESSAGE_EXT, "SET_MESSAGE_EXT", Direction::Set),
    op(GET_INPUT_MAX_USERS, "GET_INPUT_MAX_USERS", Direction::Get),
    op(SET_AUDIO_BUFFER_STATUS_CALLBACK, "SET_AUDIO_BUFFER_STATUS_CALLBACK", Direction::Negotiate),
    op(SET_MINIMUM_AUDIO_LATENCY, "SET_MINIMUM_AUDIO_LATENCY", Direction::Set),
    op(SET_FASTFORWARDING_OVERRIDE, "SET_FASTFORWARDING_OVERRIDE", Direction::Set),
    op(SET_CONTENT_INFO_OVERRIDE, "SET_CONTENT_INFO_OVERRIDE", Direction::Set),
    op(GET_GAME_INFO_EXT, "GET_GAME_INFO_EXT", Direction::Get),
    op(SET_CORE_OPTIONS_V2, "SET_CORE_OPTIONS_V2", Direction::Set),
    op(SET_CORE_OPTIONS_V2_INTL, "SET_CORE_OPTIONS_V2_INTL", Direction::Set),
    op(SET_CORE_OPTIONS_UPDATE_DISPLAY_CALLBACK, "SET_CORE_OPTIONS_UPDATE_DISPLAY_CALLBACK", Direction::Set),
    op(SET_VARIABLE, "SET_VARIABLE", Direction::Set),
    op(GET_JIT_CAPABLE, "GET_JIT_CAPABLE", Direction::Get),
    op(SET_NETPACKET_INTERFACE, "SET_NETPACKET_INTERFACE", Direction::Set),
    op(GET_PLAYLIST_DIRECTORY, "GET_PLAYLIST_DIRECTORY", Direction::Get),
    op(GET_FILE_BROWSER_START_DIRECTORY, "GET_FILE_BROWSER_START_DIRECTORY", Direction::Get),
    op(GET_SENSOR_INTERFACE, "GET_SENSOR_INTERFACE", Direction::Get),
    op(GET_CAMERA_INTERFACE, "GET_CAMERA_INTERFACE", Direction::Get),
    op(SET_MEMORY_MAPS, "SET_MEMORY_MAPS", Direction::Set),
    op(GET_CURRENT_SOFTWARE_FRAMEBUFFER, "GET_CURRENT_SOFTWARE_FRAMEBUFFER", Direction::Get),
    op(GET_HW_RENDER_INTERFACE, "GET_HW_RENDER_INTERFACE", Direction::Get),
    op(SET_SUPPORT_ACHIEVEMENTS, "SET_SUPPORT_ACHIEVEMENTS", Direction::Set),
    op(SET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE, "SET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE", Direction::Negotiate),
    op(SET_HW_SHARED_CONTEXT, "SET_HW_SHARED_CONTEXT", Direction::Set),
    op(GET_VFS_INTERFACE, "GET_VFS_INTERFACE", Direction::Get),
    op(GET_LED_INTERFACE, "GET_LED_INTERFACE", Direction::Get),
    op(GET_AUDIO_VIDEO_ENABLE, "GET_AUDIO_VIDEO_ENABLE", Direction::Get),
    op(GET_MIDI_INTERFACE, "GET_MIDI_INTERFACE", Direction::Get),
    op(GET_FASTFORWARDING, "GET_FASTFORWARDING", Direction::Get),
    op(GET_TARGET_REFRESH_RATE, "GET_TARGET_REFRESH_RATE", Direction::Get),
    op(GET_INPUT_BITMASKS, "GET_INPUT_BITMASKS", Direction::Get),
    op(GET_THROTTLE_STATE, "GET_THROTTLE_STATE", Direction::Get),
    op(GET_SAVESTATE_CONTEXT, "GET_SAVESTATE_CONTEXT", Direction::Get),
    op(GET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_SUPPORT, "GET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_SUPPORT", Direction::Negotiate),
    op(GET_MICROPHONE_INTERFACE, "GET_MICROPHONE_INTERFACE", Direction::Get),
    op(GET_DEVICE_POWER, "GET_DEVICE_POWER", Direction::Get),
];

/// Look up an opcode, ignoring the experimental flag only for
/// `SET_HW_RENDER` which Cores send both ways
pub fn lookup(code: u32) -> Option<&'static Opcode> {
    let code = if code == SET_HW_RENDER | EXPERIMENTAL {
        SET_HW_RENDER
    } else {
        code
    };
    OPCODES.iter().find(|op| op.code == code)
}

/// Human-readable opcode name for logging
pub fn name(code: u32) -> &'static str {
    lookup(code).map(|op| op.name).unwrap_or("UNKNOWN")
}
