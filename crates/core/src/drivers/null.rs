//! Headless video and audio

use std::path::Path;

use super::{AudioSink, Frame, VideoSink, VideoSurface};
use crate::contexts::{CoreRuntimeContext, GameRuntimeContext};
use crate::error::{OperationError, OperationResult};

/// Accepts every surface and discards frames
#[derive(Debug, Default)]
pub struct NullVideo {
    frames: u64,
    last_size: (u32, u32),
}

impl NullVideo {
    /// Frames received since init
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_size(&self) -> (u32, u32) {
        self.last_size
    }
}

impl VideoSink for NullVideo {
    fn init(&mut self, surface: &VideoSurface, _core: &CoreRuntimeContext, _game: &GameRuntimeContext) -> bool {
        tracing::debug!("Null video on surface {} ({}x{})", surface.id, surface.width, surface.height);
        self.frames = 0;
        true
    }

    fn prepare(&mut self) {}

    fn on_new_frame(&mut self, frame: Frame<'_>) {
        self.frames += 1;
        self.last_size = (frame.width, frame.height);
    }

    fn draw_frame(&mut self) {}

    fn destroy(&mut self) {}

    fn take_screenshot(&mut self, path: &Path) -> OperationResult {
        tracing::warn!("Null video cannot capture {:?}", path);
        Err(OperationError::Failed)
    }
}

/// Discards samples
#[derive(Debug, Default)]
pub struct NullAudio {
    playing: bool,
}

impl AudioSink for NullAudio {
    fn init(&mut self, sample_rate: f64, _low_latency: bool) -> bool {
        tracing::debug!("Null audio at {} Hz", sample_rate);
        true
    }

    fn start(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn on_sample(&mut self, _left: i16, _right: i16) {}

    fn on_sample_batch(&mut self, samples: &[i16]) -> usize {
        samples.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::FrameData;

    #[test]
    fn test_null_video_counts_frames() {
        let mut video = NullVideo::default();
        let surface = VideoSurface {
            id: 1,
            window: 0,
            width: 640,
            height: 480,
        };
        let core = CoreRuntimeContext::new("core.so", "/sys");
        let game = GameRuntimeContext::new("game.nes", "/saves");
        assert!(video.init(&surface, &core, &game));

        video.on_new_frame(Frame {
            data: FrameData::Dupe,
            width: 256,
            height: 240,
            pitch: 512,
        });
        assert_eq!(video.frames(), 1);
        assert_eq!(video.last_size(), (256, 240));
        assert_eq!(video.take_screenshot(Path::new("shot.png")), Err(OperationError::Failed));
    }

    #[test]
    fn test_null_audio_consumes_whole_frames() {
        let mut audio = NullAudio::default();
        assert_eq!(audio.on_sample_batch(&[0; 8]), 4);
    }
}
