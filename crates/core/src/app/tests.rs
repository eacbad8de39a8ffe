use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::unbounded;

use super::*;
use crate::commands::mark_worker_thread;
use crate::notify::Notification;
use crate::test_support::*;

const SURFACE: VideoSurface = VideoSurface {
    id: 1,
    window: 0,
    width: 640,
    height: 480,
};

fn session_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("retrorunner_app_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("game.bin"), [1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    dir
}

fn runner(recorder: &Recorder, opener: CoreOpener) -> AppContext {
    let config = RunnerConfig {
        idle_frame_interval_ms: 1,
        load_sram_on_start: false,
        save_sram_on_stop: false,
        ..RunnerConfig::default()
    };
    let mut app = AppContext::with_drivers(config, Arc::new(RecordingDrivers(recorder.clone()))).unwrap();
    app.set_core_opener(opener);
    app
}

fn set_paths(app: &AppContext, dir: &Path) -> bool {
    app.set_paths(dir.join("game.bin"), "stub_core.so", dir.join("system"), dir.join("saves"))
}

fn started(app: &AppContext, dir: &Path) {
    assert!(set_paths(app, dir));
    app.start().unwrap();
    assert!(wait_until(|| app.state().contains(AppState::CONTENT_READY)));
}

fn shut_down(app: &AppContext) {
    app.stop();
    app.join();
    assert!(!app.state().contains(AppState::RUNNING));
}

#[test]
fn test_start_loads_core_content_input_and_audio() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("start");
    let recorder = Recorder::default();
    let app = runner(&recorder, stub_core);

    started(&app, &dir);
    assert!(app.state().contains(AppState::CORE_READY | AppState::PATHS_READY));
    assert!(wait_until(|| recorder.count(&Event::AudioStart) == 1));
    assert!(wait_until(|| CONTROLLER_CALLS.load(Ordering::SeqCst) == 4));

    assert_eq!(INIT_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(LOADED_SIZE.load(Ordering::SeqCst), 8);
    assert!(CAN_DUPE.load(Ordering::SeqCst));
    // no surface yet, so nothing steps
    assert_eq!(RUN_CALLS.load(Ordering::SeqCst), 0);
    assert!(!app.state().contains(AppState::VIDEO_READY));

    shut_down(&app);
    assert_eq!(UNLOAD_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(DEINIT_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.count(&Event::AudioStop), 1);
    assert_eq!(recorder.count(&Event::AudioDestroy), 1);
    assert!(app.state().is_empty());
}

#[test]
fn test_full_path_cores_get_no_buffer() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    NEED_FULLPATH.store(true, Ordering::SeqCst);
    let dir = session_dir("fullpath");
    let app = runner(&Recorder::default(), stub_core);

    started(&app, &dir);
    assert_eq!(LOADED_SIZE.load(Ordering::SeqCst), 0);
    shut_down(&app);
}

#[test]
fn test_start_requires_paths() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let app = runner(&Recorder::default(), stub_core);

    assert!(matches!(app.start(), Err(RunnerError::PathsNotReady)));
    assert_eq!(app.save_state("unused.state", true), Err(OperationError::AppNotRunning));
    assert_eq!(OPEN_ATTEMPTS.load(Ordering::SeqCst), 0);
}

#[test]
fn test_second_start_is_rejected_while_running() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("twice");
    let app = runner(&Recorder::default(), stub_core);

    started(&app, &dir);
    assert!(!set_paths(&app, &dir));
    assert!(matches!(app.start(), Err(RunnerError::AlreadyRunning)));
    shut_down(&app);
}

#[test]
fn test_detach_right_after_attach_leaves_video_down() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("detach");
    let recorder = Recorder::default();
    let app = runner(&recorder, stub_core);

    started(&app, &dir);
    for id in 2..6 {
        app.set_video_surface(Some(VideoSurface { id, ..SURFACE }));
        app.set_video_surface(None);
    }
    // a synchronous command runs after everything queued before it
    let _ = app.save_sram(dir.join("barrier.srm"), true);

    assert!(!app.state().contains(AppState::VIDEO_READY));
    let inits: usize = (2..6).map(|id| recorder.count(&Event::VideoInit(id))).sum();
    assert_eq!(recorder.count(&Event::VideoDestroy), inits);

    shut_down(&app);
}

#[test]
fn test_steps_run_once_video_is_attached() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("steps");
    let recorder = Recorder::default();
    let app = runner(&recorder, stub_core);

    app.set_video_surface(Some(SURFACE));
    started(&app, &dir);
    assert!(wait_until(|| app.state().contains(AppState::VIDEO_READY)));
    assert_eq!(recorder.count(&Event::VideoInit(1)), 1);
    assert!(wait_until(|| RUN_CALLS.load(Ordering::SeqCst) > 3));
    assert!(recorder.count(&Event::Frame) > 0);

    app.set_video_surface(Some(VideoSurface { width: 800, height: 600, ..SURFACE }));
    assert!(wait_until(|| recorder.count(&Event::VideoResize(800, 600)) == 1));

    app.set_video_surface(None);
    assert!(wait_until(|| recorder.count(&Event::VideoDestroy) == 1));
    assert!(wait_until(|| !app.state().contains(AppState::VIDEO_READY)));
    let steps = RUN_CALLS.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(RUN_CALLS.load(Ordering::SeqCst), steps);

    shut_down(&app);
    assert_eq!(recorder.count(&Event::VideoDestroy), 1);
}

#[test]
fn test_pause_stops_steps_and_audio_once() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("pause");
    let recorder = Recorder::default();
    let app = runner(&recorder, stub_core);

    app.set_video_surface(Some(SURFACE));
    started(&app, &dir);
    assert!(wait_until(|| RUN_CALLS.load(Ordering::SeqCst) > 3));

    app.pause();
    assert!(app.state().contains(AppState::PAUSED));
    assert!(wait_until(|| recorder.count(&Event::AudioStop) == 1));
    let steps = RUN_CALLS.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(RUN_CALLS.load(Ordering::SeqCst), steps);

    app.pause();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(recorder.count(&Event::AudioStop), 1);

    app.resume();
    assert!(!app.state().contains(AppState::PAUSED));
    assert!(wait_until(|| RUN_CALLS.load(Ordering::SeqCst) > steps));
    assert!(wait_until(|| recorder.count(&Event::AudioStart) == 2));

    shut_down(&app);
    assert_eq!(recorder.count(&Event::AudioStop), 2);
}

#[test]
fn test_save_state_reports_empty_core_state() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("state");
    let app = runner(&Recorder::default(), stub_core);
    started(&app, &dir);

    let path = dir.join("states").join("slot0.state");
    assert_eq!(app.save_state(&path, true), Err(OperationError::EmptyMemory));
    assert!(!path.exists());

    SERIALIZE_SIZE.store(16, Ordering::SeqCst);
    assert_eq!(app.save_state(&path, true), Ok(()));
    assert_eq!(std::fs::read(&path).unwrap(), vec![0xAB; 16]);

    assert_eq!(app.load_state(&path, true), Ok(()));
    assert_eq!(UNSERIALIZE_LEN.load(Ordering::SeqCst), 16);
    assert_eq!(app.load_state(dir.join("missing.state"), true), Err(OperationError::EmptyFile));

    shut_down(&app);
}

#[test]
fn test_sram_round_trip_through_files() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("sram");
    let app = runner(&Recorder::default(), stub_core);
    started(&app, &dir);

    let path = dir.join("game.srm");
    assert_eq!(app.save_sram(&path, true), Err(OperationError::EmptyMemory));

    SRAM_SIZE.store(SRAM_CAPACITY, Ordering::SeqCst);
    fill_sram(0x5A);
    assert_eq!(app.save_sram(&path, true), Ok(()));
    assert_eq!(std::fs::read(&path).unwrap().len(), SRAM_CAPACITY);

    fill_sram(0);
    assert_eq!(app.load_sram(&path, true), Ok(()));
    assert_eq!(sram_byte(0), 0x5A);
    assert_eq!(sram_byte(SRAM_CAPACITY - 1), 0x5A);

    shut_down(&app);
}

#[test]
fn test_screenshot_needs_video() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("shot");
    let app = runner(&Recorder::default(), stub_core);
    started(&app, &dir);

    let path = dir.join("shot.png");
    assert_eq!(app.take_screenshot(&path, true), Err(OperationError::Failed));

    app.set_video_surface(Some(SURFACE));
    assert!(wait_until(|| app.state().contains(AppState::VIDEO_READY)));
    assert_eq!(app.take_screenshot(&path, true), Ok(()));
    assert!(path.exists());

    shut_down(&app);
}

#[test]
fn test_asynchronous_operations_return_immediately() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    SERIALIZE_SIZE.store(4, Ordering::SeqCst);
    let dir = session_dir("async");
    let app = runner(&Recorder::default(), stub_core);
    started(&app, &dir);

    let path = dir.join("async.state");
    assert_eq!(app.save_state(&path, false), Ok(()));
    assert!(wait_until(|| path.exists()));

    shut_down(&app);
}

#[test]
fn test_synchronous_operation_from_worker_thread_is_refused() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("worker_thread");
    let app = runner(&Recorder::default(), stub_core);
    started(&app, &dir);

    let result = std::thread::scope(|s| {
        s.spawn(|| {
            mark_worker_thread();
            app.save_state(dir.join("never.state"), true)
        })
        .join()
        .unwrap()
    });
    assert_eq!(result, Err(OperationError::BadOperation));

    shut_down(&app);
}

#[test]
fn test_core_load_failure_keeps_worker_alive_for_retry() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    OPEN_FAILURES.store(1, Ordering::SeqCst);
    let dir = session_dir("retry");
    let app = runner(&Recorder::default(), flaky_core);

    assert!(set_paths(&app, &dir));
    app.start().unwrap();
    assert!(wait_until(|| OPEN_ATTEMPTS.load(Ordering::SeqCst) == 1));
    std::thread::sleep(Duration::from_millis(20));
    let state = app.state();
    assert!(state.contains(AppState::RUNNING));
    assert!(!state.contains(AppState::CORE_READY));

    app.start().unwrap();
    assert!(wait_until(|| app.state().contains(AppState::CONTENT_READY)));
    assert_eq!(OPEN_ATTEMPTS.load(Ordering::SeqCst), 2);

    shut_down(&app);
}

#[test]
fn test_content_failure_ends_the_session() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    LOAD_GAME_RESULT.store(false, Ordering::SeqCst);
    let dir = session_dir("bad_content");
    let app = runner(&Recorder::default(), stub_core);
    let (tx, rx) = unbounded();
    app.set_notify_callback(Some(Arc::new(move |n| {
        let _ = tx.send(n);
    })));

    assert!(set_paths(&app, &dir));
    app.start().unwrap();
    app.join();

    let state = app.state();
    assert!(!state.contains(AppState::RUNNING));
    assert!(!state.contains(AppState::PATHS_READY));
    assert_eq!(DEINIT_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(UNLOAD_CALLS.load(Ordering::SeqCst), 0);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Notification::Terminated));
    assert!(matches!(app.start(), Err(RunnerError::PathsNotReady)));
}

#[test]
fn test_content_loaded_is_notified() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("notify");
    let app = runner(&Recorder::default(), stub_core);
    let (tx, rx) = unbounded();
    app.set_notify_callback(Some(Arc::new(move |n| {
        let _ = tx.send(n);
    })));

    started(&app, &dir);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Notification::ContentLoaded));
    shut_down(&app);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Notification::Terminated));
}

#[test]
fn test_stop_requires_new_paths_before_restart() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("restart");
    let app = runner(&Recorder::default(), stub_core);

    started(&app, &dir);
    shut_down(&app);
    assert!(matches!(app.start(), Err(RunnerError::PathsNotReady)));

    started(&app, &dir);
    assert_eq!(INIT_CALLS.load(Ordering::SeqCst), 2);
    shut_down(&app);
}

#[test]
fn test_variable_change_reaches_core() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("variable");
    let app = runner(&Recorder::default(), stub_core);

    app.set_video_surface(Some(SURFACE));
    started(&app, &dir);
    app.set_variable("stub_option", "off", true);
    assert!(wait_until(|| OPTION_OFF.load(Ordering::SeqCst)));

    shut_down(&app);
}

#[test]
fn test_reset_and_controller_reach_core() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("reset");
    let app = runner(&Recorder::default(), stub_core);

    app.reset();
    started(&app, &dir);
    app.reset();
    assert!(wait_until(|| RESET_CALLS.load(Ordering::SeqCst) == 1));

    assert!(wait_until(|| CONTROLLER_CALLS.load(Ordering::SeqCst) == 4));
    app.set_controller(0, 0x101);
    assert!(wait_until(|| LAST_DEVICE.load(Ordering::SeqCst) == 0x101));

    shut_down(&app);
}

#[test]
fn test_cheats_file_loads_without_core_support() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let dir = session_dir("cheats");
    let app = runner(&Recorder::default(), stub_core);
    started(&app, &dir);

    assert_eq!(app.load_cheats(dir.join("missing.toml"), true), Err(OperationError::EmptyFile));

    let path = dir.join("game.cheats.toml");
    std::fs::write(&path, "[[cheat]]\ndescription = \"Lives\"\ncode = \"010203\"\n").unwrap();
    assert_eq!(app.load_cheats(&path, true), Ok(()));

    shut_down(&app);
}

#[test]
fn test_add_command_by_code() {
    let _lock = TEST_LOCK.lock();
    reset_stub();
    let app = runner(&Recorder::default(), stub_core);

    assert!(!app.add_command(9999));
    // path commands need a session
    assert!(!app.add_command(Opcode::SaveState as i32));
    assert!(app.add_command(Opcode::ResetGame as i32));
}

#[test]
fn test_input_updates_are_range_checked() {
    let app = AppContext::new(RunnerConfig::default()).unwrap();

    assert!(app.update_button(0, 0, true));
    assert!(!app.update_button(99, 0, true));
    assert!(app.update_axis(0, 0, 0, 0.5));
}
