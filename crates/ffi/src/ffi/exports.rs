//! C-compatible exports called by the host application
//!
//! Every export tolerates a null runner and catches panics, reporting them as
//! failure values.

use std::ffi::{c_char, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::instrument;

use retrorunner_core::{config_path, status_code, AppContext, OperationError, OperationResult, RunnerConfig, VideoSurface};

/// Opaque runner handle
pub struct RrRunner {
    app: AppContext,
}

/// Host drawing surface
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RrVideoSurface {
    /// Identity of the native surface; a new id means a new surface
    pub id: u64,
    /// Native window handle
    pub window: usize,
    pub width: u32,
    pub height: u32,
}

/// Notification callback: `code` is 100 (content loaded), 101 (terminated)
/// or 102 (game geometry changed)
pub type RrNotifyFn = unsafe extern "C" fn(user_data: *mut c_void, code: i32);

/// Host pointer handed back to the notify callback on the delivery thread
struct UserData(*mut c_void);

// SAFETY: the host promises the pointer may be used from the delivery thread
unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

fn guarded<R>(fallback: R, f: impl FnOnce() -> R) -> R {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        tracing::error!("Panic caught at the C boundary");
        fallback
    })
}

unsafe fn handle<'a>(runner: *const RrRunner) -> Option<&'a RrRunner> {
    runner.as_ref()
}

unsafe fn c_path(path: *const c_char) -> Option<PathBuf> {
    if path.is_null() {
        return None;
    }
    let path = CStr::from_ptr(path).to_str().ok()?;
    Some(PathBuf::from(path))
}

unsafe fn c_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        None
    } else {
        CStr::from_ptr(s).to_str().ok()
    }
}

/// Create a runner
///
/// `config_dir` holds `retrorunner.toml` (`$RETRORUNNER_CONFIG` overrides
/// the location); the file is created with defaults when missing. Null uses
/// built-in defaults. Returns null on failure.
///
/// # Safety
/// - `config_dir` must be null or a valid null-terminated C string
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn rr_create(config_dir: *const c_char) -> *mut RrRunner {
    guarded(std::ptr::null_mut(), || {
        let config = match c_path(config_dir).map(|dir| config_path(&dir)) {
            Some(path) => match RunnerConfig::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    super::logging::init(false);
                    tracing::error!("Failed to load config {:?}: {}", path, e);
                    return std::ptr::null_mut();
                }
            },
            None => RunnerConfig::default(),
        };
        super::logging::init(config.debug);

        match AppContext::new(config) {
            Ok(app) => {
                tracing::info!("Runner created");
                Box::into_raw(Box::new(RrRunner { app }))
            }
            Err(e) => {
                tracing::error!("Failed to create runner: {}", e);
                std::ptr::null_mut()
            }
        }
    })
}

/// Stop the runner, wait for its worker and free it
///
/// # Safety
/// - `runner` must be null or a pointer returned by [`rr_create`] that was
///   not destroyed yet
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn rr_destroy(runner: *mut RrRunner) {
    if runner.is_null() {
        return;
    }
    let runner = Box::from_raw(runner);
    guarded((), move || drop(runner));
}

/// Set rom, core, system and save paths for the next session
///
/// # Safety
/// - `runner` must be null or valid
/// - every path must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn rr_set_paths(
    runner: *const RrRunner,
    rom: *const c_char,
    core: *const c_char,
    system: *const c_char,
    save: *const c_char,
) -> bool {
    let Some(runner) = handle(runner) else {
        return false;
    };
    let (Some(rom), Some(core), Some(system), Some(save)) = (c_path(rom), c_path(core), c_path(system), c_path(save))
    else {
        tracing::warn!("rr_set_paths: null or non UTF-8 path");
        return false;
    };
    guarded(false, || runner.app.set_paths(rom, core, system, save))
}

/// Start (or retry) the session
///
/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn rr_start(runner: *const RrRunner) -> bool {
    let Some(runner) = handle(runner) else {
        return false;
    };
    guarded(false, || match runner.app.start() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Start rejected: {}", e);
            false
        }
    })
}

/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_pause(runner: *const RrRunner) {
    if let Some(runner) = handle(runner) {
        guarded((), || runner.app.pause());
    }
}

/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_resume(runner: *const RrRunner) {
    if let Some(runner) = handle(runner) {
        guarded((), || runner.app.resume());
    }
}

/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_reset(runner: *const RrRunner) {
    if let Some(runner) = handle(runner) {
        guarded((), || runner.app.reset());
    }
}

/// Ask the session to stop. Does not wait for the worker.
///
/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_stop(runner: *const RrRunner) {
    if let Some(runner) = handle(runner) {
        guarded((), || runner.app.stop());
    }
}

/// Attach or resize a surface; null detaches
///
/// # Safety
/// - `runner` must be null or valid
/// - `surface` must be null or point to a valid [`RrVideoSurface`]
#[no_mangle]
pub unsafe extern "C" fn rr_set_video_surface(runner: *const RrRunner, surface: *const RrVideoSurface) {
    let Some(runner) = handle(runner) else {
        return;
    };
    let surface = surface.as_ref().map(|s| VideoSurface {
        id: s.id,
        window: s.window,
        width: s.width,
        height: s.height,
    });
    guarded((), || runner.app.set_video_surface(surface));
}

/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_set_controller(runner: *const RrRunner, port: u32, device: u32) {
    if let Some(runner) = handle(runner) {
        guarded((), || runner.app.set_controller(port, device));
    }
}

/// Queue a command by numeric code
///
/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_add_command(runner: *const RrRunner, code: i32) -> bool {
    match handle(runner) {
        Some(runner) => guarded(false, || runner.app.add_command(code)),
        None => false,
    }
}

unsafe fn path_operation(
    runner: *const RrRunner,
    path: *const c_char,
    op: impl FnOnce(&AppContext, &Path) -> OperationResult,
) -> i32 {
    let Some(runner) = handle(runner) else {
        return OperationError::AppNotRunning.code();
    };
    let Some(path) = c_path(path) else {
        return OperationError::Failed.code();
    };
    guarded(OperationError::Failed.code(), || status_code(op(&runner.app, &path)))
}

/// Save a state. Returns a status code; with `wait` false only queueing is
/// reported.
///
/// # Safety
/// - `runner` must be null or valid
/// - `path` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn rr_save_state(runner: *const RrRunner, path: *const c_char, wait: bool) -> i32 {
    path_operation(runner, path, |app, path| app.save_state(path, wait))
}

/// # Safety
/// See [`rr_save_state`]
#[no_mangle]
pub unsafe extern "C" fn rr_load_state(runner: *const RrRunner, path: *const c_char, wait: bool) -> i32 {
    path_operation(runner, path, |app, path| app.load_state(path, wait))
}

/// # Safety
/// See [`rr_save_state`]
#[no_mangle]
pub unsafe extern "C" fn rr_save_sram(runner: *const RrRunner, path: *const c_char, wait: bool) -> i32 {
    path_operation(runner, path, |app, path| app.save_sram(path, wait))
}

/// # Safety
/// See [`rr_save_state`]
#[no_mangle]
pub unsafe extern "C" fn rr_load_sram(runner: *const RrRunner, path: *const c_char, wait: bool) -> i32 {
    path_operation(runner, path, |app, path| app.load_sram(path, wait))
}

/// # Safety
/// See [`rr_save_state`]
#[no_mangle]
pub unsafe extern "C" fn rr_take_screenshot(runner: *const RrRunner, path: *const c_char, wait: bool) -> i32 {
    path_operation(runner, path, |app, path| app.take_screenshot(path, wait))
}

/// Load a TOML cheat list and apply it
///
/// # Safety
/// See [`rr_save_state`]
#[no_mangle]
pub unsafe extern "C" fn rr_load_cheats(runner: *const RrRunner, path: *const c_char, wait: bool) -> i32 {
    path_operation(runner, path, |app, path| app.load_cheats(path, wait))
}

/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_update_button(runner: *const RrRunner, port: u32, button: u32, pressed: bool) -> bool {
    match handle(runner) {
        Some(runner) => guarded(false, || runner.app.update_button(port, button, pressed)),
        None => false,
    }
}

/// `value` in `-1.0..=1.0`
///
/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_update_axis(runner: *const RrRunner, port: u32, index: u32, axis: u32, value: f32) -> bool {
    match handle(runner) {
        Some(runner) => guarded(false, || runner.app.update_axis(port, index, axis, value)),
        None => false,
    }
}

/// Set a Core option
///
/// # Safety
/// - `runner` must be null or valid
/// - `key` and `value` must be null or valid null-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn rr_set_variable(
    runner: *const RrRunner,
    key: *const c_char,
    value: *const c_char,
    notify_core: bool,
) -> bool {
    let Some(runner) = handle(runner) else {
        return false;
    };
    let (Some(key), Some(value)) = (c_str(key), c_str(value)) else {
        return false;
    };
    guarded(false, || {
        runner.app.set_variable(key, value, notify_core);
        true
    })
}

/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_set_speed(runner: *const RrRunner, multiplier: f64) {
    if let Some(runner) = handle(runner) {
        guarded((), || runner.app.set_speed(multiplier));
    }
}

/// Lifecycle flags as a bit set; 0 for a null runner
///
/// # Safety
/// - `runner` must be null or valid
#[no_mangle]
pub unsafe extern "C" fn rr_get_state(runner: *const RrRunner) -> u32 {
    match handle(runner) {
        Some(runner) => runner.app.state().bits(),
        None => 0,
    }
}

/// Register the notification callback; null unregisters
///
/// The callback runs on a dedicated delivery thread.
///
/// # Safety
/// - `runner` must be null or valid
/// - `user_data` must stay valid until the callback is replaced and any
///   delivery already in flight has returned, or the runner is destroyed
#[no_mangle]
pub unsafe extern "C" fn rr_set_notify_callback(
    runner: *const RrRunner,
    callback: Option<RrNotifyFn>,
    user_data: *mut c_void,
) {
    let Some(runner) = handle(runner) else {
        return;
    };
    let callback = callback.map(|callback| {
        let user_data = UserData(user_data);
        std::sync::Arc::new(move |notification: retrorunner_core::Notification| {
            let user_data = &user_data;
            // SAFETY: guaranteed by the caller of rr_set_notify_callback
            unsafe { callback(user_data.0, notification as i32) };
        }) as retrorunner_core::NotifyCallback
    });
    guarded((), || runner.app.set_notify_callback(callback));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_runner_is_tolerated() {
        unsafe {
            assert!(!rr_start(std::ptr::null()));
            assert!(!rr_add_command(std::ptr::null(), 18));
            assert_eq!(rr_get_state(std::ptr::null()), 0);
            assert_eq!(rr_save_state(std::ptr::null(), c"x".as_ptr(), true), -999);
            rr_pause(std::ptr::null());
            rr_destroy(std::ptr::null_mut());
        }
    }

    #[test]
    fn test_runner_lifecycle_without_session() {
        unsafe {
            let runner = rr_create(std::ptr::null());
            assert!(!runner.is_null());

            assert!(!rr_start(runner));
            assert_eq!(rr_save_state(runner, c"slot.state".as_ptr(), true), -999);
            assert_eq!(rr_save_state(runner, std::ptr::null(), true), -1000);
            assert!(!rr_set_paths(runner, std::ptr::null(), c"core".as_ptr(), c"sys".as_ptr(), c"save".as_ptr()));
            assert!(rr_set_paths(runner, c"game.bin".as_ptr(), c"core".as_ptr(), c"sys".as_ptr(), c"save".as_ptr()));
            assert_eq!(rr_get_state(runner), 1);

            assert!(rr_update_button(runner, 0, 3, true));
            assert!(!rr_update_button(runner, 99, 3, true));
            assert!(rr_set_variable(runner, c"key".as_ptr(), c"value".as_ptr(), false));
            assert!(!rr_set_variable(runner, std::ptr::null(), c"value".as_ptr(), false));

            rr_destroy(runner);
        }
    }

    #[test]
    fn test_create_writes_default_config_in_dir() {
        if std::env::var_os("RETRORUNNER_CONFIG").is_some() {
            return;
        }
        let dir = std::env::temp_dir().join(format!("retrorunner-ffi-config-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let c_dir = std::ffi::CString::new(dir.to_str().unwrap()).unwrap();

        unsafe {
            let runner = rr_create(c_dir.as_ptr());
            assert!(!runner.is_null());
            rr_destroy(runner);
        }
        assert!(dir.join(retrorunner_core::CONFIG_FILE_NAME).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
