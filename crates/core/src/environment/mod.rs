//! Environment dispatcher
//!
//! Answers the Core's `retro_environment` calls. Each call is decoded into an
//! [`EnvRequest`] and handled against the runtime contexts, which the
//! dispatcher only reaches through weak references. Unknown opcodes are
//! refused without touching any state.

mod callbacks;
mod request;
mod variables;

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CString};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use retrorunner_sdk::environment as op;
use retrorunner_sdk::{
    RetroHwRenderCallback, RetroHwRenderContextNegotiationInterface,
    RETRO_AV_ENABLE_AUDIO, RETRO_AV_ENABLE_VIDEO, RETRO_DEVICE_ANALOG, RETRO_DEVICE_JOYPAD,
    RETRO_DEVICE_POINTER, RETRO_HW_CONTEXT_VULKAN,
    RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN,
    RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN_VERSION, RETRO_PIXEL_FORMAT_RGB565,
    RETRO_SAVESTATE_CONTEXT_NORMAL,
};

use crate::bridge;
use crate::config::RunnerConfig;
use crate::contexts::{
    CoreRuntimeContext, GameRuntimeContext, HwRender, NegotiationInterface, SharedCoreContext,
    SharedGameContext,
};
use crate::notify::{Notification, Notifier};

pub use callbacks::{log_printf, set_rumble_state};
pub use request::EnvRequest;
pub use variables::{Variable, VariableStore};

/// Devices the input driver can answer for
const INPUT_CAPABILITIES: u64 =
    (1 << RETRO_DEVICE_JOYPAD) | (1 << RETRO_DEVICE_ANALOG) | (1 << RETRO_DEVICE_POINTER);

const TARGET_REFRESH_RATE: f32 = 60.0;

pub struct Environment {
    config: Arc<RunnerConfig>,
    core: Weak<RwLock<CoreRuntimeContext>>,
    game: Weak<RwLock<GameRuntimeContext>>,
    variables: VariableStore,
    /// Path strings handed to the Core, keyed by opcode
    strings: HashMap<u32, CString>,
    notifier: Notifier,
    shutdown_requested: bool,
}

impl Environment {
    pub fn new(
        config: Arc<RunnerConfig>,
        core: &SharedCoreContext,
        game: &SharedGameContext,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            core: Arc::downgrade(core),
            game: Arc::downgrade(game),
            variables: VariableStore::new(),
            strings: HashMap::new(),
            notifier,
            shutdown_requested: false,
        }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Set a Core variable on behalf of the host
    pub fn set_variable(&mut self, key: &str, value: &str, notify_core: bool) {
        self.variables.set(key, value, notify_core);
    }

    /// Whether the Core asked to shut down since the last call
    pub fn take_shutdown_request(&mut self) -> bool {
        std::mem::take(&mut self.shutdown_requested)
    }

    /// Entry point for the raw environment callback
    ///
    /// # Safety
    /// `data` must be null or point to the payload the protocol defines for
    /// `cmd`, valid for the duration of the call.
    pub unsafe fn dispatch(&mut self, cmd: u32, data: *mut c_void) -> bool {
        match EnvRequest::decode(cmd, data) {
            Some(request) => {
                let handled = self.handle(request);
                tracing::trace!("Environment {} -> {}", op::name(cmd), handled);
                handled
            }
            None => {
                tracing::trace!("Environment {} ({:#x}) unsupported", op::name(cmd), cmd);
                false
            }
        }
    }

    pub fn handle(&mut self, request: EnvRequest<'_>) -> bool {
        match request {
            EnvRequest::SetRotation(rotation) => {
                let updated = self.with_game(|game| {
                    game.rotation = rotation;
                    game.geometry_changed = true;
                });
                if updated.is_some() {
                    self.notifier.notify(Notification::GameGeometryChanged);
                }
                updated.is_some()
            }
            EnvRequest::GetOverscan(out) => {
                *out = false;
                true
            }
            EnvRequest::GetCanDupe(out) => {
                *out = true;
                true
            }
            EnvRequest::SetMessage { text, frames } => {
                tracing::info!(target: "core", "Message ({} frames): {}", frames, text);
                true
            }
            EnvRequest::Shutdown => {
                tracing::info!("Core requested shutdown");
                self.shutdown_requested = true;
                true
            }
            EnvRequest::SetPerformanceLevel(level) => {
                self.with_core(|core| core.performance_level = level).is_some()
            }
            EnvRequest::GetSystemDirectory(out) => {
                let path = self.with_core(|core| core.system_path.clone());
                self.hand_out(op::GET_SYSTEM_DIRECTORY, path, out)
            }
            EnvRequest::SetPixelFormat(format) => {
                if format > RETRO_PIXEL_FORMAT_RGB565 {
                    tracing::warn!("Unknown pixel format {}", format);
                    return false;
                }
                self.with_core(|core| core.pixel_format = format).is_some()
            }
            EnvRequest::SetInputDescriptors | EnvRequest::GetInputBitmasks => true,
            EnvRequest::SetCoreOptionsDisplay => true,
            EnvRequest::SetDiskControlInterface => {
                self.with_core(|core| core.disk_control = true).is_some()
            }
            EnvRequest::SetHwRender(callback) => self.negotiate_hw_render(callback),
            EnvRequest::GetVariable { key, value } => match self.variables.value_ptr(&key) {
                Some(ptr) => {
                    *value = ptr;
                    true
                }
                None => false,
            },
            EnvRequest::SetVariables(declared) => {
                for (key, declaration) in &declared {
                    self.variables.declare(key, declaration);
                }
                true
            }
            EnvRequest::SetVariable(declared) => {
                if let Some((key, declaration)) = declared {
                    self.variables.declare(&key, &declaration);
                }
                true
            }
            EnvRequest::GetVariableUpdate(out) => {
                *out = self.variables.take_dirty();
                true
            }
            EnvRequest::SetSupportNoGame(supported) => {
                self.with_core(|core| core.support_no_game = supported).is_some()
            }
            EnvRequest::GetLibretroPath(out) => {
                let path = self.with_core(|core| core.core_path.clone());
                self.hand_out(op::GET_LIBRETRO_PATH, path, out)
            }
            EnvRequest::GetRumbleInterface(interface) => {
                interface.set_rumble_state = Some(set_rumble_state);
                true
            }
            EnvRequest::GetInputDeviceCapabilities(out) => {
                *out = INPUT_CAPABILITIES;
                true
            }
            EnvRequest::GetLogInterface(callback) => {
                callback.log = Some(log_printf());
                true
            }
            EnvRequest::GetContentDirectory(out) => {
                let path = self.with_game(|game| {
                    game.game_path.parent().map(Path::to_path_buf).unwrap_or_default()
                });
                self.hand_out(op::GET_CORE_ASSETS_DIRECTORY, path, out)
            }
            EnvRequest::GetSaveDirectory(out) => {
                let path = self.with_game(|game| game.save_path.clone());
                self.hand_out(op::GET_SAVE_DIRECTORY, path, out)
            }
            EnvRequest::SetSystemAvInfo(info) => match self.with_game(|game| game.update_av_info(info)) {
                Some(changed) => {
                    if changed {
                        self.notifier.notify(Notification::GameGeometryChanged);
                    }
                    true
                }
                None => false,
            },
            EnvRequest::SetControllerInfo(ports) => {
                tracing::debug!("Core declared controllers for {} ports", ports.len());
                self.with_core(|core| core.controllers = ports).is_some()
            }
            EnvRequest::SetGeometry(geometry) => {
                match self.with_game(|game| game.update_geometry(geometry)) {
                    Some(changed) => {
                        if changed {
                            tracing::debug!(
                                "Geometry changed to {}x{}",
                                geometry.base_width,
                                geometry.base_height
                            );
                            self.notifier.notify(Notification::GameGeometryChanged);
                        }
                        true
                    }
                    None => false,
                }
            }
            EnvRequest::GetLanguage(out) => match self.with_core(|core| core.language) {
                Some(language) => {
                    *out = language;
                    true
                }
                None => false,
            },
            EnvRequest::SetSupportAchievements(supported) => {
                self.with_core(|core| core.support_achievements = supported).is_some()
            }
            EnvRequest::SetHwRenderContextNegotiationInterface(interface) => {
                self.negotiate_interface(interface)
            }
            EnvRequest::SetSerializationQuirks(quirks) => {
                let value = *quirks;
                self.with_core(|core| core.serialization_quirks = value).is_some()
            }
            EnvRequest::GetAudioVideoEnable(out) => {
                *out = RETRO_AV_ENABLE_VIDEO | RETRO_AV_ENABLE_AUDIO;
                true
            }
            EnvRequest::GetFastForwarding(out) => match self.with_game(|game| game.is_fast_forwarding()) {
                Some(fast) => {
                    *out = fast;
                    true
                }
                None => false,
            },
            EnvRequest::GetTargetRefreshRate(out) => {
                *out = TARGET_REFRESH_RATE;
                true
            }
            EnvRequest::GetCoreOptionsVersion(out) => {
                // legacy SET_VARIABLES only
                *out = 0;
                true
            }
            EnvRequest::GetPreferredHwRender(out) => {
                *out = self.config.preferred_hw_context;
                true
            }
            EnvRequest::GetDiskControlInterfaceVersion(out)
            | EnvRequest::GetMessageInterfaceVersion(out) => {
                *out = 0;
                true
            }
            EnvRequest::SetMessageExt {
                text,
                level,
                duration,
            } => {
                tracing::info!(target: "core", "Message (level {}, {} ms): {}", level, duration, text);
                true
            }
            EnvRequest::GetInputMaxUsers(out) => {
                *out = self.config.max_users;
                true
            }
            EnvRequest::SetAudioBufferStatusCallback(callback) => {
                self.with_core(|core| core.audio_buffer_status = callback).is_some()
            }
            EnvRequest::SetMinimumAudioLatency(ms) => {
                self.with_core(|core| core.minimum_audio_latency_ms = ms).is_some()
            }
            EnvRequest::GetSavestateContext(out) => {
                *out = RETRO_SAVESTATE_CONTEXT_NORMAL;
                true
            }
            EnvRequest::GetHwRenderContextNegotiationInterfaceSupport(interface) => {
                interface.interface_version = if self.supports_vulkan_interface(interface.interface_type) {
                    RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN_VERSION
                } else {
                    0
                };
                true
            }
        }
    }

    fn with_core<R>(&self, f: impl FnOnce(&mut CoreRuntimeContext) -> R) -> Option<R> {
        let core = self.core.upgrade()?;
        let mut guard = core.write();
        Some(f(&mut guard))
    }

    fn with_game<R>(&self, f: impl FnOnce(&mut GameRuntimeContext) -> R) -> Option<R> {
        let game = self.game.upgrade()?;
        let mut guard = game.write();
        Some(f(&mut guard))
    }

    /// Give the Core a pointer to `path`
    ///
    /// The string is created once per opcode and lives as long as the
    /// dispatcher, so Cores may keep the pointer.
    fn hand_out(&mut self, opcode: u32, path: Option<PathBuf>, out: &mut *const c_char) -> bool {
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            return false;
        };
        if !self.strings.contains_key(&opcode) {
            let Ok(value) = CString::new(path.to_string_lossy().into_owned()) else {
                tracing::warn!("Path {:?} contains a NUL byte", path);
                return false;
            };
            self.strings.insert(opcode, value);
        }
        match self.strings.get(&opcode) {
            Some(value) => {
                *out = value.as_ptr();
                true
            }
            None => false,
        }
    }

    fn negotiate_hw_render(&mut self, callback: &mut RetroHwRenderCallback) -> bool {
        let (context, major, minor) = (
            callback.context_type,
            callback.version_major,
            callback.version_minor,
        );
        if self.config.hw_context_support(context, major, minor).is_none() {
            tracing::warn!("Refusing hardware context {} {}.{}", context, major, minor);
            return false;
        }

        callback.get_current_framebuffer = Some(bridge::get_current_framebuffer);
        callback.get_proc_address = Some(bridge::get_proc_address);

        let render = HwRender {
            context_type: context,
            version_major: major,
            version_minor: minor,
            depth: callback.depth,
            stencil: callback.stencil,
            bottom_left_origin: callback.bottom_left_origin,
            context_reset: callback.context_reset,
            context_destroy: callback.context_destroy,
        };
        tracing::info!("Hardware context {} {}.{} accepted", context, major, minor);
        self.with_core(|core| core.hw_render = Some(render)).is_some()
    }

    fn supports_vulkan_interface(&self, interface_type: u32) -> bool {
        interface_type == RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN
            && self
                .config
                .hw_context_support(RETRO_HW_CONTEXT_VULKAN, 0, 0)
                .is_some()
    }

    fn negotiate_interface(&mut self, interface: RetroHwRenderContextNegotiationInterface) -> bool {
        if !self.supports_vulkan_interface(interface.interface_type)
            || interface.interface_version > RETRO_HW_RENDER_CONTEXT_NEGOTIATION_INTERFACE_VULKAN_VERSION
        {
            tracing::warn!(
                "Refusing negotiation interface type {} version {}",
                interface.interface_type,
                interface.interface_version
            );
            return false;
        }
        let accepted = NegotiationInterface {
            interface_type: interface.interface_type,
            interface_version: interface.interface_version,
        };
        self.with_core(|core| core.negotiation = Some(accepted)).is_some()
    }
}
