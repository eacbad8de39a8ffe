//! Core loading and entry point binding
//!
//! A [`Core`] is either fully bound or does not exist. Every mandatory
//! entry point is resolved before the struct is built; the first missing one
//! aborts the load and the module is closed when the [`Library`] drops.

use std::ffi::{c_void, CStr, CString};
use std::path::Path;
use std::ptr::NonNull;

use retrorunner_sdk::symbols;
use retrorunner_sdk::{
    ApiVersionFn, AudioSampleBatchFn, AudioSampleFn, CheatSetFn, EnvironmentFn,
    GetMemoryDataFn, GetMemorySizeFn, GetSystemAvInfoFn, GetSystemInfoFn, InputPollFn,
    InputStateFn, LoadGameFn, RetroGameInfo, RetroSystemAvInfo, RetroSystemInfo,
    SerializeFn, SerializeSizeFn, SetAudioSampleBatchFn, SetAudioSampleFn,
    SetControllerPortDeviceFn, SetEnvironmentFn, SetInputPollFn, SetInputStateFn,
    SetVideoRefreshFn, UnserializeFn, VideoRefreshFn, VoidFn,
};

use crate::error::LoadError;
use crate::library::Library;

/// Bound entry point table
///
/// Mandatory entry points are plain function pointers; optional ones are
/// `Option`s so a missing export is representable.
#[derive(Clone, Copy)]
pub struct CoreSymbols {
    pub init: VoidFn,
    pub deinit: VoidFn,
    pub api_version: ApiVersionFn,
    pub get_system_info: GetSystemInfoFn,
    pub get_system_av_info: GetSystemAvInfoFn,
    pub set_controller_port_device: SetControllerPortDeviceFn,
    pub reset: VoidFn,
    pub run: VoidFn,
    pub serialize_size: SerializeSizeFn,
    pub serialize: SerializeFn,
    pub unserialize: UnserializeFn,
    pub get_memory_size: GetMemorySizeFn,
    pub get_memory_data: GetMemoryDataFn,
    pub load_game: LoadGameFn,
    pub unload_game: VoidFn,
    pub set_environment: SetEnvironmentFn,
    pub set_video_refresh: SetVideoRefreshFn,
    pub set_audio_sample: SetAudioSampleFn,
    pub set_audio_sample_batch: SetAudioSampleBatchFn,
    pub set_input_poll: SetInputPollFn,
    pub set_input_state: SetInputStateFn,
    pub cheat_reset: Option<VoidFn>,
    pub cheat_set: Option<CheatSetFn>,
}

impl CoreSymbols {
    /// Resolve the full table through `lookup`
    ///
    /// Fails on the first mandatory symbol `lookup` cannot find. Nothing is
    /// returned in that case, so a partially bound table never escapes.
    ///
    /// # Safety
    /// Every pointer `lookup` returns must be a function with the C signature
    /// libretro declares for that name.
    pub unsafe fn resolve<F>(mut lookup: F) -> Result<Self, LoadError>
    where
        F: FnMut(&[u8]) -> Option<NonNull<c_void>>,
    {
        macro_rules! required {
            ($name:expr) => {{
                let ptr = lookup($name)
                    .ok_or_else(|| LoadError::MissingSymbol(symbols::display($name).to_string()))?;
                std::mem::transmute::<*mut c_void, _>(ptr.as_ptr())
            }};
        }
        macro_rules! optional {
            ($name:expr) => {{
                lookup($name).map(|ptr| std::mem::transmute::<*mut c_void, _>(ptr.as_ptr()))
            }};
        }

        let table = Self {
            init: required!(symbols::RETRO_INIT),
            deinit: required!(symbols::RETRO_DEINIT),
            api_version: required!(symbols::RETRO_API_VERSION),
            get_system_info: required!(symbols::RETRO_GET_SYSTEM_INFO),
            get_system_av_info: required!(symbols::RETRO_GET_SYSTEM_AV_INFO),
            set_controller_port_device: required!(symbols::RETRO_SET_CONTROLLER_PORT_DEVICE),
            reset: required!(symbols::RETRO_RESET),
            run: required!(symbols::RETRO_RUN),
            serialize_size: required!(symbols::RETRO_SERIALIZE_SIZE),
            serialize: required!(symbols::RETRO_SERIALIZE),
            unserialize: required!(symbols::RETRO_UNSERIALIZE),
            get_memory_size: required!(symbols::RETRO_GET_MEMORY_SIZE),
            get_memory_data: required!(symbols::RETRO_GET_MEMORY_DATA),
            load_game: required!(symbols::RETRO_LOAD_GAME),
            unload_game: required!(symbols::RETRO_UNLOAD_GAME),
            set_environment: required!(symbols::RETRO_SET_ENVIRONMENT),
            set_video_refresh: required!(symbols::RETRO_SET_VIDEO_REFRESH),
            set_audio_sample: required!(symbols::RETRO_SET_AUDIO_SAMPLE),
            set_audio_sample_batch: required!(symbols::RETRO_SET_AUDIO_SAMPLE_BATCH),
            set_input_poll: required!(symbols::RETRO_SET_INPUT_POLL),
            set_input_state: required!(symbols::RETRO_SET_INPUT_STATE),
            cheat_reset: optional!(symbols::RETRO_CHEAT_RESET),
            cheat_set: optional!(symbols::RETRO_CHEAT_SET),
        };

        if table.cheat_reset.is_none() || table.cheat_set.is_none() {
            tracing::debug!("Core does not export cheat entry points");
        }

        Ok(table)
    }
}

/// The six host callbacks registered right after binding
#[derive(Clone, Copy)]
pub struct HostCallbacks {
    pub environment: EnvironmentFn,
    pub video_refresh: VideoRefreshFn,
    pub audio_sample: AudioSampleFn,
    pub audio_sample_batch: AudioSampleBatchFn,
    pub input_poll: InputPollFn,
    pub input_state: InputStateFn,
}

/// Owned copy of `retro_system_info`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    pub library_name: String,
    pub library_version: String,
    pub valid_extensions: String,
    pub need_fullpath: bool,
    pub block_extract: bool,
}

/// A loaded Core with its entry points bound
///
/// Deinitialization is the caller's job; dropping a Core only closes the
/// module.
pub struct Core {
    symbols: CoreSymbols,
    library: Option<Library>,
}

impl Core {
    /// Open the module at `path` and bind every mandatory entry point
    #[tracing::instrument(skip_all, fields(path = ?path))]
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let library = Library::open(path)?;

        // SAFETY: symbol names come from the libretro ABI and each is
        // transmuted to the matching signature from libretro.h
        let symbols = unsafe { CoreSymbols::resolve(|name| library.symbol(name)) };

        match symbols {
            Ok(symbols) => {
                tracing::info!("Core entry points bound: {:?}", library.path());
                Ok(Self {
                    symbols,
                    library: Some(library),
                })
            }
            Err(e) => {
                // library drops here and closes the module
                tracing::error!("Core {:?} rejected: {}", path, e);
                Err(e)
            }
        }
    }

    /// Wrap an already bound table that has no module behind it
    ///
    /// # Safety
    /// Every pointer in `symbols` must stay callable for the life of the Core.
    pub unsafe fn from_symbols(symbols: CoreSymbols) -> Self {
        Self {
            symbols,
            library: None,
        }
    }

    /// Register the host callbacks. Called once, right after binding.
    pub fn register_callbacks(&self, callbacks: &HostCallbacks) {
        // SAFETY: bound entry points are valid for the Core's lifetime
        unsafe {
            (self.symbols.set_environment)(callbacks.environment);
            (self.symbols.set_video_refresh)(callbacks.video_refresh);
            (self.symbols.set_audio_sample)(callbacks.audio_sample);
            (self.symbols.set_audio_sample_batch)(callbacks.audio_sample_batch);
            (self.symbols.set_input_poll)(callbacks.input_poll);
            (self.symbols.set_input_state)(callbacks.input_state);
        }
    }

    pub fn init(&self) {
        unsafe { (self.symbols.init)() }
    }

    pub fn deinit(&self) {
        unsafe { (self.symbols.deinit)() }
    }

    pub fn api_version(&self) -> u32 {
        unsafe { (self.symbols.api_version)() }
    }

    pub fn system_info(&self) -> SystemInfo {
        let mut raw = RetroSystemInfo::default();
        unsafe { (self.symbols.get_system_info)(&mut raw) };
        SystemInfo {
            library_name: c_str_or_empty(raw.library_name),
            library_version: c_str_or_empty(raw.library_version),
            valid_extensions: c_str_or_empty(raw.valid_extensions),
            need_fullpath: raw.need_fullpath,
            block_extract: raw.block_extract,
        }
    }

    pub fn system_av_info(&self) -> RetroSystemAvInfo {
        let mut info = RetroSystemAvInfo::default();
        unsafe { (self.symbols.get_system_av_info)(&mut info) };
        info
    }

    pub fn set_controller_port_device(&self, port: u32, device: u32) {
        unsafe { (self.symbols.set_controller_port_device)(port, device) }
    }

    pub fn reset(&self) {
        unsafe { (self.symbols.reset)() }
    }

    /// Run one simulation step
    pub fn run(&self) {
        unsafe { (self.symbols.run)() }
    }

    pub fn serialize_size(&self) -> usize {
        unsafe { (self.symbols.serialize_size)() }
    }

    /// Serialize into `buffer`, which must be at least `serialize_size()` long
    pub fn serialize(&self, buffer: &mut [u8]) -> bool {
        unsafe { (self.symbols.serialize)(buffer.as_mut_ptr().cast(), buffer.len()) }
    }

    pub fn unserialize(&self, data: &[u8]) -> bool {
        unsafe { (self.symbols.unserialize)(data.as_ptr().cast(), data.len()) }
    }

    /// Borrow one of the Core's memory regions (`RETRO_MEMORY_*`)
    ///
    /// `None` when the Core reports no data or a zero size.
    pub fn memory(&mut self, id: u32) -> Option<&mut [u8]> {
        let size = unsafe { (self.symbols.get_memory_size)(id) };
        let data = unsafe { (self.symbols.get_memory_data)(id) };
        if data.is_null() || size == 0 {
            return None;
        }
        // SAFETY: the Core owns `size` bytes at `data` until unload; the
        // borrow is tied to &mut self so no other Core call can run meanwhile
        Some(unsafe { std::slice::from_raw_parts_mut(data.cast::<u8>(), size) })
    }

    /// Load content. `path` and `data` must outlive the call.
    pub fn load_game(&self, path: Option<&CStr>, data: Option<&[u8]>) -> bool {
        let game = RetroGameInfo {
            path: path.map(CStr::as_ptr).unwrap_or(std::ptr::null()),
            data: data.map(|d| d.as_ptr().cast()).unwrap_or(std::ptr::null()),
            size: data.map(<[u8]>::len).unwrap_or(0),
            meta: std::ptr::null(),
        };
        unsafe { (self.symbols.load_game)(&game) }
    }

    pub fn unload_game(&self) {
        unsafe { (self.symbols.unload_game)() }
    }

    /// Whether the optional cheat entry points are present
    pub fn supports_cheats(&self) -> bool {
        self.symbols.cheat_reset.is_some() && self.symbols.cheat_set.is_some()
    }

    /// Returns false when the Core does not export `retro_cheat_reset`
    pub fn cheat_reset(&self) -> bool {
        match self.symbols.cheat_reset {
            Some(f) => {
                unsafe { f() };
                true
            }
            None => false,
        }
    }

    /// Returns false when the Core does not export `retro_cheat_set`
    pub fn cheat_set(&self, index: u32, enabled: bool, code: &str) -> bool {
        let (Some(f), Ok(code)) = (self.symbols.cheat_set, CString::new(code)) else {
            return false;
        };
        unsafe { f(index, enabled, code.as_ptr()) };
        true
    }

    /// Path of the backing module, if any
    pub fn path(&self) -> Option<&Path> {
        self.library.as_ref().map(Library::path)
    }

    /// Close the backing module. Consumes the Core so no entry point can be
    /// called afterwards.
    pub fn close(mut self) {
        if let Some(mut library) = self.library.take() {
            library.close();
        }
    }
}

fn c_str_or_empty(ptr: *const std::ffi::c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        // SAFETY: the Core hands out static NUL-terminated strings
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}
