//! Capabilities and requirements declared by the loaded Core

use std::path::PathBuf;

use retrorunner_engine::SystemInfo;
use retrorunner_sdk::{
    AudioBufferStatusFn, HwContextResetFn, RETRO_DEVICE_ANALOG, RETRO_DEVICE_MASK,
    RETRO_LANGUAGE_ENGLISH, RETRO_PIXEL_FORMAT_0RGB1555,
};

/// Negotiated hardware rendering parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct HwRender {
    /// `RETRO_HW_CONTEXT_*`
    pub context_type: u32,
    pub version_major: u32,
    pub version_minor: u32,
    pub depth: bool,
    pub stencil: bool,
    pub bottom_left_origin: bool,
    /// Called after the video output has created its context
    pub context_reset: Option<HwContextResetFn>,
    /// Called before the video output tears its context down
    pub context_destroy: Option<HwContextResetFn>,
}

/// Header of an accepted context negotiation interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationInterface {
    pub interface_type: u32,
    pub interface_version: u32,
}

/// One controller type a Core offers for a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescription {
    pub description: String,
    /// `RETRO_DEVICE_*`, possibly subclassed
    pub id: u32,
}

#[derive(Debug, Clone)]
pub struct CoreRuntimeContext {
    pub core_path: PathBuf,
    pub system_path: PathBuf,
    pub system_info: SystemInfo,
    /// `RETRO_PIXEL_FORMAT_*`
    pub pixel_format: u32,
    /// `None` for software rendering
    pub hw_render: Option<HwRender>,
    pub negotiation: Option<NegotiationInterface>,
    /// Controller types per port, in declaration order
    pub controllers: Vec<Vec<ControllerDescription>>,
    pub language: u32,
    pub support_no_game: bool,
    pub performance_level: u32,
    pub serialization_quirks: u64,
    pub support_achievements: bool,
    pub minimum_audio_latency_ms: u32,
    pub audio_buffer_status: Option<AudioBufferStatusFn>,
    /// The Core handed over a disk control interface
    pub disk_control: bool,
}

impl CoreRuntimeContext {
    pub fn new(core_path: impl Into<PathBuf>, system_path: impl Into<PathBuf>) -> Self {
        Self {
            core_path: core_path.into(),
            system_path: system_path.into(),
            system_info: SystemInfo::default(),
            pixel_format: RETRO_PIXEL_FORMAT_0RGB1555,
            hw_render: None,
            negotiation: None,
            controllers: Vec::new(),
            language: RETRO_LANGUAGE_ENGLISH,
            support_no_game: false,
            performance_level: 0,
            serialization_quirks: 0,
            support_achievements: false,
            minimum_audio_latency_ms: 0,
            audio_buffer_status: None,
            disk_control: false,
        }
    }

    pub fn uses_hardware_render(&self) -> bool {
        self.hw_render.is_some()
    }

    /// Whether any port offers an analog controller
    pub fn has_analog_controller(&self) -> bool {
        self.controllers
            .iter()
            .flatten()
            .any(|c| c.id & RETRO_DEVICE_MASK == RETRO_DEVICE_ANALOG)
    }
}
