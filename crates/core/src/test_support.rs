//! Stub Core and recording collaborators for orchestration tests
//!
//! The stub is a table of Rust `extern "C"` functions over process-wide
//! atomics. Tests that start a runner hold [`TEST_LOCK`] and call
//! [`reset_stub`] first.

use std::ffi::{c_void, CStr};
use std::path::Path;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{const_mutex, Mutex};
use retrorunner_engine::{Core, CoreSymbols, LoadError};
use retrorunner_sdk::environment as op;
use retrorunner_sdk::{
    AudioSampleBatchFn, EnvironmentFn, RetroGameInfo, RetroSystemAvInfo, RetroSystemInfo,
    RetroVariable, VideoRefreshFn, RETRO_API_VERSION, RETRO_MEMORY_SAVE_RAM,
};

use crate::contexts::{CoreRuntimeContext, GameRuntimeContext};
use crate::drivers::{
    AudioSink, DriverFactory, Frame, InputSink, SoftwareInput, VideoSink, VideoSurface,
};
use crate::error::{OperationError, OperationResult};

pub static TEST_LOCK: Mutex<()> = const_mutex(());

pub static RUN_CALLS: AtomicU32 = AtomicU32::new(0);
pub static INIT_CALLS: AtomicU32 = AtomicU32::new(0);
pub static DEINIT_CALLS: AtomicU32 = AtomicU32::new(0);
pub static RESET_CALLS: AtomicU32 = AtomicU32::new(0);
pub static UNLOAD_CALLS: AtomicU32 = AtomicU32::new(0);
pub static CONTROLLER_CALLS: AtomicU32 = AtomicU32::new(0);
pub static LAST_DEVICE: AtomicU32 = AtomicU32::new(0);
pub static SERIALIZE_SIZE: AtomicUsize = AtomicUsize::new(0);
pub static UNSERIALIZE_LEN: AtomicUsize = AtomicUsize::new(0);
pub static SRAM_SIZE: AtomicUsize = AtomicUsize::new(0);
pub static LOAD_GAME_RESULT: AtomicBool = AtomicBool::new(true);
pub static NEED_FULLPATH: AtomicBool = AtomicBool::new(false);
pub static LOADED_SIZE: AtomicUsize = AtomicUsize::new(0);
pub static CAN_DUPE: AtomicBool = AtomicBool::new(false);
pub static OPTION_OFF: AtomicBool = AtomicBool::new(false);
pub static OPEN_ATTEMPTS: AtomicU32 = AtomicU32::new(0);
pub static OPEN_FAILURES: AtomicU32 = AtomicU32::new(0);

pub const SRAM_CAPACITY: usize = 64;
static mut SRAM: [u8; SRAM_CAPACITY] = [0; SRAM_CAPACITY];

static ENVIRONMENT: Mutex<Option<EnvironmentFn>> = const_mutex(None);
static VIDEO_REFRESH: Mutex<Option<VideoRefreshFn>> = const_mutex(None);
static AUDIO_BATCH: Mutex<Option<AudioSampleBatchFn>> = const_mutex(None);

pub fn reset_stub() {
    for counter in [
        &RUN_CALLS,
        &INIT_CALLS,
        &DEINIT_CALLS,
        &RESET_CALLS,
        &UNLOAD_CALLS,
        &CONTROLLER_CALLS,
        &LAST_DEVICE,
        &OPEN_ATTEMPTS,
        &OPEN_FAILURES,
    ] {
        counter.store(0, Ordering::SeqCst);
    }
    SERIALIZE_SIZE.store(0, Ordering::SeqCst);
    UNSERIALIZE_LEN.store(0, Ordering::SeqCst);
    SRAM_SIZE.store(0, Ordering::SeqCst);
    LOADED_SIZE.store(0, Ordering::SeqCst);
    LOAD_GAME_RESULT.store(true, Ordering::SeqCst);
    NEED_FULLPATH.store(false, Ordering::SeqCst);
    CAN_DUPE.store(false, Ordering::SeqCst);
    OPTION_OFF.store(false, Ordering::SeqCst);
    *ENVIRONMENT.lock() = None;
    *VIDEO_REFRESH.lock() = None;
    *AUDIO_BATCH.lock() = None;
}

/// Fill the stub's save RAM with `value`
pub fn fill_sram(value: u8) {
    // SAFETY: tests touching SRAM hold TEST_LOCK
    unsafe { (*ptr::addr_of_mut!(SRAM)).fill(value) };
}

pub fn sram_byte(index: usize) -> u8 {
    // SAFETY: as above
    unsafe { (*ptr::addr_of!(SRAM))[index] }
}

fn environment() -> Option<EnvironmentFn> {
    *ENVIRONMENT.lock()
}

unsafe extern "C" fn stub_set_environment(cb: EnvironmentFn) {
    *ENVIRONMENT.lock() = Some(cb);
    let variables = [
        RetroVariable {
            key: c"stub_option".as_ptr(),
            value: c"Stub option; on|off".as_ptr(),
        },
        RetroVariable {
            key: ptr::null(),
            value: ptr::null(),
        },
    ];
    cb(op::SET_VARIABLES, variables.as_ptr() as *mut c_void);
}

unsafe extern "C" fn stub_set_video_refresh(cb: VideoRefreshFn) {
    *VIDEO_REFRESH.lock() = Some(cb);
}

unsafe extern "C" fn stub_set_audio_sample(_cb: retrorunner_sdk::AudioSampleFn) {}

unsafe extern "C" fn stub_set_audio_sample_batch(cb: AudioSampleBatchFn) {
    *AUDIO_BATCH.lock() = Some(cb);
}

unsafe extern "C" fn stub_set_input_poll(_cb: retrorunner_sdk::InputPollFn) {}

unsafe extern "C" fn stub_set_input_state(_cb: retrorunner_sdk::InputStateFn) {}

unsafe extern "C" fn stub_init() {
    INIT_CALLS.fetch_add(1, Ordering::SeqCst);
    if let Some(env) = environment() {
        let mut dupe = false;
        if env(op::GET_CAN_DUPE, (&mut dupe as *mut bool).cast()) {
            CAN_DUPE.store(dupe, Ordering::SeqCst);
        }
    }
}

unsafe extern "C" fn stub_deinit() {
    DEINIT_CALLS.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn stub_api_version() -> u32 {
    RETRO_API_VERSION
}

unsafe extern "C" fn stub_get_system_info(info: *mut RetroSystemInfo) {
    *info = RetroSystemInfo {
        library_name: c"Stub".as_ptr(),
        library_version: c"1.0".as_ptr(),
        valid_extensions: c"bin".as_ptr(),
        need_fullpath: NEED_FULLPATH.load(Ordering::SeqCst),
        block_extract: false,
    };
}

unsafe extern "C" fn stub_get_system_av_info(info: *mut RetroSystemAvInfo) {
    let info = &mut *info;
    info.geometry.base_width = 320;
    info.geometry.base_height = 240;
    info.geometry.max_width = 320;
    info.geometry.max_height = 240;
    info.timing.fps = 240.0;
    info.timing.sample_rate = 48000.0;
}

unsafe extern "C" fn stub_set_controller_port_device(_port: u32, device: u32) {
    CONTROLLER_CALLS.fetch_add(1, Ordering::SeqCst);
    LAST_DEVICE.store(device, Ordering::SeqCst);
}

unsafe extern "C" fn stub_reset() {
    RESET_CALLS.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn stub_run() {
    RUN_CALLS.fetch_add(1, Ordering::SeqCst);

    if let Some(env) = environment() {
        let mut updated = false;
        if env(op::GET_VARIABLE_UPDATE, (&mut updated as *mut bool).cast()) && updated {
            let mut variable = RetroVariable {
                key: c"stub_option".as_ptr(),
                value: ptr::null(),
            };
            if env(op::GET_VARIABLE, (&mut variable as *mut RetroVariable).cast()) {
                let value = CStr::from_ptr(variable.value);
                OPTION_OFF.store(value.to_bytes() == b"off", Ordering::SeqCst);
            }
        }
    }

    let video = *VIDEO_REFRESH.lock();
    if let Some(video) = video {
        video(ptr::null(), 320, 240, 640);
    }
    let audio = *AUDIO_BATCH.lock();
    if let Some(audio) = audio {
        let samples = [0i16; 8];
        audio(samples.as_ptr(), 4);
    }
}

unsafe extern "C" fn stub_serialize_size() -> usize {
    SERIALIZE_SIZE.load(Ordering::SeqCst)
}

unsafe extern "C" fn stub_serialize(data: *mut c_void, size: usize) -> bool {
    if size < SERIALIZE_SIZE.load(Ordering::SeqCst) {
        return false;
    }
    ptr::write_bytes(data.cast::<u8>(), 0xAB, size);
    true
}

unsafe extern "C" fn stub_unserialize(_data: *const c_void, size: usize) -> bool {
    UNSERIALIZE_LEN.store(size, Ordering::SeqCst);
    true
}

unsafe extern "C" fn stub_get_memory_size(id: u32) -> usize {
    if id == RETRO_MEMORY_SAVE_RAM {
        SRAM_SIZE.load(Ordering::SeqCst).min(SRAM_CAPACITY)
    } else {
        0
    }
}

unsafe extern "C" fn stub_get_memory_data(id: u32) -> *mut c_void {
    if id == RETRO_MEMORY_SAVE_RAM && SRAM_SIZE.load(Ordering::SeqCst) > 0 {
        ptr::addr_of_mut!(SRAM).cast()
    } else {
        ptr::null_mut()
    }
}

unsafe extern "C" fn stub_load_game(game: *const RetroGameInfo) -> bool {
    if let Some(game) = game.as_ref() {
        LOADED_SIZE.store(game.size, Ordering::SeqCst);
    }
    LOAD_GAME_RESULT.load(Ordering::SeqCst)
}

unsafe extern "C" fn stub_unload_game() {
    UNLOAD_CALLS.fetch_add(1, Ordering::SeqCst);
}

fn stub_symbols() -> CoreSymbols {
    CoreSymbols {
        init: stub_init,
        deinit: stub_deinit,
        api_version: stub_api_version,
        get_system_info: stub_get_system_info,
        get_system_av_info: stub_get_system_av_info,
        set_controller_port_device: stub_set_controller_port_device,
        reset: stub_reset,
        run: stub_run,
        serialize_size: stub_serialize_size,
        serialize: stub_serialize,
        unserialize: stub_unserialize,
        get_memory_size: stub_get_memory_size,
        get_memory_data: stub_get_memory_data,
        load_game: stub_load_game,
        unload_game: stub_unload_game,
        set_environment: stub_set_environment,
        set_video_refresh: stub_set_video_refresh,
        set_audio_sample: stub_set_audio_sample,
        set_audio_sample_batch: stub_set_audio_sample_batch,
        set_input_poll: stub_set_input_poll,
        set_input_state: stub_set_input_state,
        cheat_reset: None,
        cheat_set: None,
    }
}

/// Opener yielding the stub Core for any path
pub fn stub_core(_path: &Path) -> Result<Core, LoadError> {
    OPEN_ATTEMPTS.fetch_add(1, Ordering::SeqCst);
    // SAFETY: the stub functions are statics
    Ok(unsafe { Core::from_symbols(stub_symbols()) })
}

/// Opener failing while `OPEN_FAILURES` is non-zero
pub fn flaky_core(path: &Path) -> Result<Core, LoadError> {
    let failing = OPEN_FAILURES
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        OPEN_ATTEMPTS.fetch_add(1, Ordering::SeqCst);
        return Err(LoadError::MissingSymbol("retro_run".to_string()));
    }
    stub_core(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    VideoInit(u64),
    VideoResize(u32, u32),
    VideoDestroy,
    Frame,
    AudioInit,
    AudioStart,
    AudioStop,
    AudioDestroy,
}

/// Shared log of collaborator calls
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn count(&self, event: &Event) -> usize {
        self.0.lock().iter().filter(|e| *e == event).count()
    }
}

pub struct RecordingVideo(Recorder);

impl VideoSink for RecordingVideo {
    fn init(&mut self, surface: &VideoSurface, _core: &CoreRuntimeContext, _game: &GameRuntimeContext) -> bool {
        self.0.push(Event::VideoInit(surface.id));
        true
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.0.push(Event::VideoResize(width, height));
    }

    fn prepare(&mut self) {}

    fn on_new_frame(&mut self, _frame: Frame<'_>) {
        self.0.push(Event::Frame);
    }

    fn draw_frame(&mut self) {}

    fn destroy(&mut self) {
        self.0.push(Event::VideoDestroy);
    }

    fn take_screenshot(&mut self, path: &Path) -> OperationResult {
        std::fs::write(path, b"frame").map_err(|_| OperationError::CannotWriteData)
    }
}

pub struct RecordingAudio(Recorder);

impl AudioSink for RecordingAudio {
    fn init(&mut self, _sample_rate: f64, _low_latency: bool) -> bool {
        self.0.push(Event::AudioInit);
        true
    }

    fn start(&mut self) {
        self.0.push(Event::AudioStart);
    }

    fn stop(&mut self) {
        self.0.push(Event::AudioStop);
    }

    fn on_sample(&mut self, _left: i16, _right: i16) {}

    fn on_sample_batch(&mut self, samples: &[i16]) -> usize {
        samples.len() / 2
    }

    fn destroy(&mut self) {
        self.0.push(Event::AudioDestroy);
    }
}

pub struct RecordingDrivers(pub Recorder);

impl DriverFactory for RecordingDrivers {
    fn video(&self, _name: &str, _core: &CoreRuntimeContext) -> Option<Box<dyn VideoSink>> {
        Some(Box::new(RecordingVideo(self.0.clone())))
    }

    fn audio(&self, _name: &str) -> Box<dyn AudioSink> {
        Box::new(RecordingAudio(self.0.clone()))
    }

    fn input(&self, _name: &str) -> Arc<dyn InputSink> {
        Arc::new(SoftwareInput::new())
    }
}

/// Poll `condition` until it holds or five seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
