//! Runner configuration
//!
//! Settings live in a TOML file next to the save directory:
//! - Type-safe struct via serde, every field defaulted
//! - Auto-generation of the default file on first load
//!
//! # Example
//!
//! ```toml
//! version = 1
//! debug = false
//! video_driver = "gles"
//! max_users = 4
//! idle_frame_interval_ms = 16
//!
//! [[supported_hw_contexts]]
//! context = 4
//! max_major = 3
//! max_minor = 2
//! ```

mod loader;

use std::path::Path;
use std::time::Duration;

use retrorunner_sdk::{
    RETRO_HW_CONTEXT_OPENGLES2, RETRO_HW_CONTEXT_OPENGLES3, RETRO_HW_CONTEXT_OPENGLES_VERSION,
    RETRO_HW_CONTEXT_VULKAN, RETRO_LANGUAGE_ENGLISH,
};
use serde::{Deserialize, Serialize};

pub use loader::{config_path, CONFIG_FILE_NAME};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write a file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One hardware context type the video output can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwContextSupport {
    /// `RETRO_HW_CONTEXT_*`
    pub context: u32,
    pub max_major: u32,
    pub max_minor: u32,
}

impl HwContextSupport {
    /// Whether a request for `major.minor` of this context fits
    ///
    /// A zero major version means the Core does not care.
    pub fn accepts(&self, context: u32, major: u32, minor: u32) -> bool {
        self.context == context
            && (major == 0 || (major, minor) <= (self.max_major, self.max_minor))
    }
}

/// Runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    pub video_driver: String,
    pub audio_driver: String,
    pub input_driver: String,

    /// Reported through `GET_INPUT_MAX_USERS`
    pub max_users: u32,

    /// `RETRO_LANGUAGE_*` reported through `GET_LANGUAGE`
    pub language: u32,

    /// Reported through `GET_PREFERRED_HW_RENDER`
    pub preferred_hw_context: u32,

    /// Context types accepted by `SET_HW_RENDER`
    pub supported_hw_contexts: Vec<HwContextSupport>,

    /// Worker sleep while paused or waiting for readiness
    pub idle_frame_interval_ms: u64,

    pub load_sram_on_start: bool,
    pub save_sram_on_stop: bool,
    pub low_latency_audio: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            video_driver: "gles".to_string(),
            audio_driver: "null".to_string(),
            input_driver: "software".to_string(),
            max_users: 4,
            language: RETRO_LANGUAGE_ENGLISH,
            preferred_hw_context: RETRO_HW_CONTEXT_OPENGLES3,
            supported_hw_contexts: vec![
                HwContextSupport {
                    context: RETRO_HW_CONTEXT_OPENGLES2,
                    max_major: 2,
                    max_minor: 0,
                },
                HwContextSupport {
                    context: RETRO_HW_CONTEXT_OPENGLES3,
                    max_major: 3,
                    max_minor: 2,
                },
                HwContextSupport {
                    context: RETRO_HW_CONTEXT_OPENGLES_VERSION,
                    max_major: 3,
                    max_minor: 2,
                },
                HwContextSupport {
                    context: RETRO_HW_CONTEXT_VULKAN,
                    max_major: 1,
                    max_minor: 3,
                },
            ],
            idle_frame_interval_ms: 16,
            load_sram_on_start: true,
            save_sram_on_stop: true,
            low_latency_audio: false,
        }
    }
}

impl RunnerConfig {
    /// Load config from `path`, creating a default file if missing
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded runner config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("Created default runner config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved runner config to {:?}", path);
        Ok(())
    }

    pub fn idle_frame_interval(&self) -> Duration {
        Duration::from_millis(self.idle_frame_interval_ms)
    }

    /// Find the entry accepting `context` at `major.minor`
    pub fn hw_context_support(&self, context: u32, major: u32, minor: u32) -> Option<&HwContextSupport> {
        self.supported_hw_contexts
            .iter()
            .find(|s| s.accepts(context, major, minor))
    }
}
