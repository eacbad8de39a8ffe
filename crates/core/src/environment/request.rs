//! Typed environment requests
//!
//! [`EnvRequest::decode`] is the only place the untyped payload pointer is
//! interpreted. Inputs are copied into owned values; outputs stay borrowed so
//! the handler can write its answer in place.

use std::ffi::{c_char, c_void, CStr};

use retrorunner_sdk::environment as op;
use retrorunner_sdk::{
    AudioBufferStatusFn, RetroAudioBufferStatusCallback, RetroControllerInfo, RetroGameGeometry,
    RetroHwRenderCallback, RetroHwRenderContextNegotiationInterface, RetroLogCallback,
    RetroMessage, RetroMessageExt, RetroRumbleInterface, RetroSystemAvInfo, RetroVariable,
};

use crate::contexts::ControllerDescription;

const SET_HW_RENDER_EXPERIMENTAL: u32 = op::SET_HW_RENDER | op::EXPERIMENTAL;

/// A decoded environment call
#[derive(Debug)]
pub enum EnvRequest<'a> {
    SetRotation(u32),
    GetOverscan(&'a mut bool),
    GetCanDupe(&'a mut bool),
    SetMessage { text: String, frames: u32 },
    Shutdown,
    SetPerformanceLevel(u32),
    GetSystemDirectory(&'a mut *const c_char),
    SetPixelFormat(u32),
    SetInputDescriptors,
    SetDiskControlInterface,
    SetHwRender(&'a mut RetroHwRenderCallback),
    GetVariable { key: String, value: &'a mut *const c_char },
    SetVariables(Vec<(String, String)>),
    GetVariableUpdate(&'a mut bool),
    SetSupportNoGame(bool),
    GetLibretroPath(&'a mut *const c_char),
    GetRumbleInterface(&'a mut RetroRumbleInterface),
    GetInputDeviceCapabilities(&'a mut u64),
    GetLogInterface(&'a mut RetroLogCallback),
    GetContentDirectory(&'a mut *const c_char),
    GetSaveDirectory(&'a mut *const c_char),
    SetSystemAvInfo(RetroSystemAvInfo),
    SetControllerInfo(Vec<Vec<ControllerDescription>>),
    SetGeometry(RetroGameGeometry),
    GetLanguage(&'a mut u32),
    SetSupportAchievements(bool),
    SetHwRenderContextNegotiationInterface(RetroHwRenderContextNegotiationInterface),
    SetSerializationQuirks(&'a mut u64),
    GetAudioVideoEnable(&'a mut i32),
    GetFastForwarding(&'a mut bool),
    GetTargetRefreshRate(&'a mut f32),
    GetInputBitmasks,
    GetCoreOptionsVersion(&'a mut u32),
    SetCoreOptionsDisplay,
    GetPreferredHwRender(&'a mut u32),
    GetDiskControlInterfaceVersion(&'a mut u32),
    GetMessageInterfaceVersion(&'a mut u32),
    SetMessageExt { text: String, level: u32, duration: u32 },
    GetInputMaxUsers(&'a mut u32),
    SetAudioBufferStatusCallback(Option<AudioBufferStatusFn>),
    SetMinimumAudioLatency(u32),
    /// `None` is the Core probing whether the call is supported
    SetVariable(Option<(String, String)>),
    GetSavestateContext(&'a mut u32),
    GetHwRenderContextNegotiationInterfaceSupport(&'a mut RetroHwRenderContextNegotiationInterface),
}

impl<'a> EnvRequest<'a> {
    /// Decode `cmd` and its payload
    ///
    /// Returns `None` for opcodes the host does not implement and for a null
    /// payload where one is required.
    ///
    /// # Safety
    /// `data` must be null or point to the payload type the protocol defines
    /// for `cmd`, valid for `'a`.
    pub unsafe fn decode(cmd: u32, data: *mut c_void) -> Option<Self> {
        let request = match cmd {
            op::SET_ROTATION => Self::SetRotation(read(data)?),
            op::GET_OVERSCAN => Self::GetOverscan(out(data)?),
            op::GET_CAN_DUPE => Self::GetCanDupe(out(data)?),
            op::SET_MESSAGE => {
                let message: RetroMessage = read(data)?;
                Self::SetMessage {
                    text: c_string(message.msg).unwrap_or_default(),
                    frames: message.frames,
                }
            }
            op::SHUTDOWN => Self::Shutdown,
            op::SET_PERFORMANCE_LEVEL => Self::SetPerformanceLevel(read(data)?),
            op::GET_SYSTEM_DIRECTORY => Self::GetSystemDirectory(out(data)?),
            op::SET_PIXEL_FORMAT => Self::SetPixelFormat(read(data)?),
            op::SET_INPUT_DESCRIPTORS => Self::SetInputDescriptors,
            op::SET_DISK_CONTROL_INTERFACE | op::SET_DISK_CONTROL_EXT_INTERFACE => {
                if data.is_null() {
                    return None;
                }
                Self::SetDiskControlInterface
            }
            op::SET_HW_RENDER | SET_HW_RENDER_EXPERIMENTAL => Self::SetHwRender(out(data)?),
            op::GET_VARIABLE => {
                let variable: &mut RetroVariable = out(data)?;
                Self::GetVariable {
                    key: c_string(variable.key)?,
                    value: &mut variable.value,
                }
            }
            op::SET_VARIABLES => {
                if data.is_null() {
                    return None;
                }
                Self::SetVariables(variable_list(data.cast()))
            }
            op::GET_VARIABLE_UPDATE => Self::GetVariableUpdate(out(data)?),
            op::SET_SUPPORT_NO_GAME => Self::SetSupportNoGame(read(data)?),
            op::GET_LIBRETRO_PATH => Self::GetLibretroPath(out(data)?),
            op::GET_RUMBLE_INTERFACE => Self::GetRumbleInterface(out(data)?),
            op::GET_INPUT_DEVICE_CAPABILITIES => Self::GetInputDeviceCapabilities(out(data)?),
            op::GET_LOG_INTERFACE => Self::GetLogInterface(out(data)?),
            op::GET_CORE_ASSETS_DIRECTORY => Self::GetContentDirectory(out(data)?),
            op::GET_SAVE_DIRECTORY => Self::GetSaveDirectory(out(data)?),
            op::SET_SYSTEM_AV_INFO => Self::SetSystemAvInfo(read(data)?),
            op::SET_CONTROLLER_INFO => Self::SetControllerInfo(controller_list(data.cast())),
            op::SET_GEOMETRY => Self::SetGeometry(read(data)?),
            op::GET_LANGUAGE => Self::GetLanguage(out(data)?),
            op::SET_SUPPORT_ACHIEVEMENTS => Self::SetSupportAchievements(read(data)?),
            op::SET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE => {
                Self::SetHwRenderContextNegotiationInterface(read(data)?)
            }
            op::SET_SERIALIZATION_QUIRKS => Self::SetSerializationQuirks(out(data)?),
            op::GET_AUDIO_VIDEO_ENABLE => Self::GetAudioVideoEnable(out(data)?),
            op::GET_FASTFORWARDING => Self::GetFastForwarding(out(data)?),
            op::GET_TARGET_REFRESH_RATE => Self::GetTargetRefreshRate(out(data)?),
            op::GET_INPUT_BITMASKS => Self::GetInputBitmasks,
            op::GET_CORE_OPTIONS_VERSION => Self::GetCoreOptionsVersion(out(data)?),
            op::SET_CORE_OPTIONS_DISPLAY => Self::SetCoreOptionsDisplay,
            op::GET_PREFERRED_HW_RENDER => Self::GetPreferredHwRender(out(data)?),
            op::GET_DISK_CONTROL_INTERFACE_VERSION => Self::GetDiskControlInterfaceVersion(out(data)?),
            op::GET_MESSAGE_INTERFACE_VERSION => Self::GetMessageInterfaceVersion(out(data)?),
            op::SET_MESSAGE_EXT => {
                let message: RetroMessageExt = read(data)?;
                Self::SetMessageExt {
                    text: c_string(message.msg).unwrap_or_default(),
                    level: message.level,
                    duration: message.duration,
                }
            }
            op::GET_INPUT_MAX_USERS => Self::GetInputMaxUsers(out(data)?),
            op::SET_AUDIO_BUFFER_STATUS_CALLBACK => {
                let callback = data
                    .cast::<RetroAudioBufferStatusCallback>()
                    .as_ref()
                    .and_then(|c| c.callback);
                Self::SetAudioBufferStatusCallback(callback)
            }
            op::SET_MINIMUM_AUDIO_LATENCY => Self::SetMinimumAudioLatency(read(data)?),
            op::SET_VARIABLE => {
                let declared = data
                    .cast::<RetroVariable>()
                    .as_ref()
                    .and_then(|v| Some((c_string(v.key)?, c_string(v.value)?)));
                Self::SetVariable(declared)
            }
            op::GET_SAVESTATE_CONTEXT => Self::GetSavestateContext(out(data)?),
            op::GET_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_SUPPORT => {
                Self::GetHwRenderContextNegotiationInterfaceSupport(out(data)?)
            }
            _ => return None,
        };
        Some(request)
    }
}

unsafe fn out<'a, T>(data: *mut c_void) -> Option<&'a mut T> {
    data.cast::<T>().as_mut()
}

unsafe fn read<T: Copy>(data: *mut c_void) -> Option<T> {
    data.cast::<T>().as_ref().copied()
}

unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Walk a `retro_variable` array up to its null-key terminator
unsafe fn variable_list(mut cursor: *const RetroVariable) -> Vec<(String, String)> {
    let mut variables = Vec::new();
    while let Some(variable) = cursor.as_ref() {
        let Some(key) = c_string(variable.key) else {
            break;
        };
        variables.push((key, c_string(variable.value).unwrap_or_default()));
        cursor = cursor.add(1);
    }
    variables
}

/// Walk a `retro_controller_info` array up to its null-types terminator
unsafe fn controller_list(mut cursor: *const RetroControllerInfo) -> Vec<Vec<ControllerDescription>> {
    let mut ports = Vec::new();
    while let Some(info) = cursor.as_ref() {
        if info.types.is_null() {
            break;
        }
        let types = std::slice::from_raw_parts(info.types, info.num_types as usize);
        ports.push(
            types
                .iter()
                .map(|t| ControllerDescription {
                    description: c_string(t.desc).unwrap_or_default(),
                    id: t.id,
                })
                .collect(),
        );
        cursor = cursor.add(1);
    }
    ports
}
