//! Video, audio and input collaborators
//!
//! The worker drives these through small traits so rendering backends, audio
//! DSP and input mapping stay replaceable. Video and audio sinks are created
//! and used on the worker thread only. The input sink is shared: the host
//! updates it from any thread while the Core reads it on the worker.

mod null;
mod software_input;

use std::ffi::CStr;
use std::path::Path;
use std::sync::Arc;

use retrorunner_sdk::ProcAddressFn;

use crate::contexts::{CoreRuntimeContext, GameRuntimeContext};
use crate::error::OperationResult;

pub use null::{NullAudio, NullVideo};
pub use software_input::SoftwareInput;

/// Host drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSurface {
    /// Identity of the native surface; a new id means a new surface
    pub id: u64,
    /// Opaque native window handle
    pub window: usize,
    pub width: u32,
    pub height: u32,
}

/// Pixel payload of a `retro_video_refresh` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameData<'a> {
    /// `height * pitch` bytes in the negotiated pixel format
    Software(&'a [u8]),
    /// Rendered into the hardware framebuffer
    Hardware,
    /// Repeat the previous frame
    Dupe,
}

#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub data: FrameData<'a>,
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
}

pub trait VideoSink {
    /// Create output for `surface`. Returns false if the surface is unusable.
    fn init(&mut self, surface: &VideoSurface, core: &CoreRuntimeContext, game: &GameRuntimeContext) -> bool;

    /// The surface kept its identity but changed size
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// The Core changed its frame geometry or rotation
    fn on_geometry_changed(&mut self, _game: &GameRuntimeContext) {}

    /// Per-frame setup before the Core runs
    fn prepare(&mut self);

    fn on_new_frame(&mut self, frame: Frame<'_>);

    /// Present after the Core returned from its step
    fn draw_frame(&mut self);

    fn destroy(&mut self);

    /// Framebuffer object the Core renders into
    fn current_framebuffer(&self) -> usize {
        0
    }

    /// Resolve a graphics API symbol for a hardware-rendering Core
    fn proc_address(&self, _symbol: &CStr) -> Option<ProcAddressFn> {
        None
    }

    fn take_screenshot(&mut self, path: &Path) -> OperationResult;
}

pub trait AudioSink {
    fn init(&mut self, sample_rate: f64, low_latency: bool) -> bool;
    fn start(&mut self);
    fn stop(&mut self);
    fn on_sample(&mut self, left: i16, right: i16);

    /// Interleaved stereo samples. Returns the number of frames consumed.
    fn on_sample_batch(&mut self, samples: &[i16]) -> usize;

    fn destroy(&mut self) {}
}

pub trait InputSink: Send + Sync {
    /// Prepare state for `max_users` ports
    fn init(&self, max_users: u32);

    fn poll(&self) {}

    fn state(&self, port: u32, device: u32, index: u32, id: u32) -> i16;

    /// Returns false when the port or button is out of range
    fn update_button(&self, port: u32, button: u32, pressed: bool) -> bool;

    /// `value` in `-1.0..=1.0`. Returns false when out of range.
    fn update_axis(&self, port: u32, index: u32, axis: u32, value: f32) -> bool;
}

/// Builds collaborators by driver name
pub trait DriverFactory: Send + Sync {
    /// `None` when no video backend matches `name`
    fn video(&self, name: &str, core: &CoreRuntimeContext) -> Option<Box<dyn VideoSink>>;

    fn audio(&self, name: &str) -> Box<dyn AudioSink>;

    fn input(&self, name: &str) -> Arc<dyn InputSink>;
}

/// Drivers shipped with the runtime: headless video and audio plus
/// [`SoftwareInput`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDrivers;

impl DriverFactory for DefaultDrivers {
    fn video(&self, name: &str, _core: &CoreRuntimeContext) -> Option<Box<dyn VideoSink>> {
        tracing::debug!("Video driver {:?} -> null", name);
        Some(Box::new(NullVideo::default()))
    }

    fn audio(&self, name: &str) -> Box<dyn AudioSink> {
        tracing::debug!("Audio driver {:?} -> null", name);
        Box::new(NullAudio::default())
    }

    fn input(&self, name: &str) -> Arc<dyn InputSink> {
        tracing::debug!("Input driver {:?} -> software", name);
        Arc::new(SoftwareInput::new())
    }
}
