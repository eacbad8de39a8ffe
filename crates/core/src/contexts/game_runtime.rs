//! State of the loaded content

use std::path::PathBuf;

use retrorunner_sdk::{RetroGameGeometry, RetroSystemAvInfo};

/// Frame rate assumed until the Core reports one
const DEFAULT_FPS: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct GameRuntimeContext {
    pub game_path: PathBuf,
    pub save_path: PathBuf,
    pub av_info: RetroSystemAvInfo,
    /// `SET_ROTATION` value, in 90 degree steps
    pub rotation: u32,
    /// Set when the frame geometry changed since the video output last looked
    pub geometry_changed: bool,
    /// Fast-forward multiplier; 1.0 is normal speed
    pub speed: f64,
}

impl GameRuntimeContext {
    pub fn new(game_path: impl Into<PathBuf>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            game_path: game_path.into(),
            save_path: save_path.into(),
            av_info: RetroSystemAvInfo::default(),
            rotation: 0,
            geometry_changed: false,
            speed: 1.0,
        }
    }

    pub fn geometry(&self) -> &RetroGameGeometry {
        &self.av_info.geometry
    }

    /// Declared frame rate, falling back to 60 when unknown
    pub fn fps(&self) -> f64 {
        let fps = self.av_info.timing.fps;
        if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_FPS
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.av_info.timing.sample_rate
    }

    pub fn is_fast_forwarding(&self) -> bool {
        self.speed > 1.0
    }

    /// Replace the geometry. Returns true when the base size changed, which
    /// also raises `geometry_changed`.
    pub fn update_geometry(&mut self, geometry: RetroGameGeometry) -> bool {
        let current = &self.av_info.geometry;
        let changed =
            current.base_width != geometry.base_width || current.base_height != geometry.base_height;
        self.av_info.geometry = geometry;
        if changed {
            self.geometry_changed = true;
        }
        changed
    }

    /// Replace geometry and timing. Returns whether the base size changed.
    pub fn update_av_info(&mut self, info: RetroSystemAvInfo) -> bool {
        self.av_info.timing = info.timing;
        self.update_geometry(info.geometry)
    }

    /// Take and clear the geometry-changed flag
    pub fn take_geometry_changed(&mut self) -> bool {
        std::mem::take(&mut self.geometry_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: u32, height: u32) -> RetroGameGeometry {
        RetroGameGeometry {
            base_width: width,
            base_height: height,
            max_width: width,
            max_height: height,
            aspect_ratio: 0.0,
        }
    }

    #[test]
    fn test_geometry_change_only_on_base_size() {
        let mut ctx = GameRuntimeContext::new("game.nes", "/saves");
        assert!(ctx.update_geometry(geometry(256, 240)));
        assert!(ctx.take_geometry_changed());

        let mut same = geometry(256, 240);
        same.max_width = 512;
        same.aspect_ratio = 4.0 / 3.0;
        assert!(!ctx.update_geometry(same));
        assert!(!ctx.geometry_changed);
        assert_eq!(ctx.geometry().max_width, 512);
    }

    #[test]
    fn test_fps_fallback() {
        let mut ctx = GameRuntimeContext::new("game.nes", "/saves");
        assert_eq!(ctx.fps(), 60.0);
        ctx.av_info.timing.fps = 50.0;
        assert_eq!(ctx.fps(), 50.0);
        ctx.av_info.timing.fps = f64::NAN;
        assert_eq!(ctx.fps(), 60.0);
    }
}
