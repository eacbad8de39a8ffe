//! `extern "C"` entry points registered with the Core

use std::ffi::{c_char, c_void, CStr};

use retrorunner_engine::HostCallbacks;
use retrorunner_sdk::{ProcAddressFn, RETRO_HW_FRAME_BUFFER_VALID};

use super::hub::with_hub;
use crate::drivers::{Frame, FrameData};

/// Callback table for [`Core::register_callbacks`](retrorunner_engine::Core::register_callbacks)
pub fn host_callbacks() -> HostCallbacks {
    HostCallbacks {
        environment,
        video_refresh,
        audio_sample,
        audio_sample_batch,
        input_poll,
        input_state,
    }
}

unsafe extern "C" fn environment(cmd: u32, data: *mut c_void) -> bool {
    with_hub(|hub| match hub.environment.try_borrow_mut() {
        Ok(mut env) => env.dispatch(cmd, data),
        Err(_) => {
            tracing::warn!("Re-entrant environment call {:#x} refused", cmd);
            false
        }
    })
    .unwrap_or(false)
}

unsafe extern "C" fn video_refresh(data: *const c_void, width: u32, height: u32, pitch: usize) {
    let data = if data.is_null() {
        FrameData::Dupe
    } else if data as usize == RETRO_HW_FRAME_BUFFER_VALID {
        FrameData::Hardware
    } else {
        // SAFETY: a software frame is `height` rows of `pitch` bytes
        FrameData::Software(std::slice::from_raw_parts(data.cast::<u8>(), height as usize * pitch))
    };
    let frame = Frame {
        data,
        width,
        height,
        pitch,
    };
    with_hub(|hub| {
        if let Ok(mut video) = hub.video.try_borrow_mut() {
            if let Some(video) = video.as_mut() {
                video.on_new_frame(frame);
            }
        }
    });
}

unsafe extern "C" fn audio_sample(left: i16, right: i16) {
    with_hub(|hub| {
        if let Ok(mut audio) = hub.audio.try_borrow_mut() {
            if let Some(audio) = audio.as_mut() {
                audio.on_sample(left, right);
            }
        }
    });
}

unsafe extern "C" fn audio_sample_batch(data: *const i16, frames: usize) -> usize {
    if data.is_null() || frames == 0 {
        return 0;
    }
    // SAFETY: the Core passes `frames` interleaved stereo frames
    let samples = std::slice::from_raw_parts(data, frames * 2);
    with_hub(|hub| match hub.audio.try_borrow_mut() {
        Ok(mut audio) => audio.as_mut().map_or(frames, |a| a.on_sample_batch(samples)),
        Err(_) => frames,
    })
    .unwrap_or(frames)
}

unsafe extern "C" fn input_poll() {
    with_hub(|hub| {
        if let Ok(input) = hub.input.try_borrow() {
            if let Some(input) = input.as_ref() {
                input.poll();
            }
        }
    });
}

unsafe extern "C" fn input_state(port: u32, device: u32, index: u32, id: u32) -> i16 {
    with_hub(|hub| match hub.input.try_borrow() {
        Ok(input) => input.as_ref().map_or(0, |i| i.state(port, device, index, id)),
        Err(_) => 0,
    })
    .unwrap_or(0)
}

pub(crate) unsafe extern "C" fn get_current_framebuffer() -> usize {
    with_hub(|hub| match hub.video.try_borrow() {
        Ok(video) => video.as_ref().map_or(0, |v| v.current_framebuffer()),
        Err(_) => 0,
    })
    .unwrap_or(0)
}

pub(crate) unsafe extern "C" fn get_proc_address(symbol: *const c_char) -> Option<ProcAddressFn> {
    if symbol.is_null() {
        return None;
    }
    let symbol = CStr::from_ptr(symbol);
    with_hub(|hub| match hub.video.try_borrow() {
        Ok(video) => video.as_ref().and_then(|v| v.proc_address(symbol)),
        Err(_) => None,
    })
    .flatten()
}
