//! The runner: host-facing control surface plus its worker thread
//!
//! [`AppContext`] methods may be called from any thread. They never touch the
//! Core; they read the atomic [`AppState`] and enqueue commands for the
//! worker, which owns the Core and both runtime contexts.

mod operations;
mod worker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};
use retrorunner_engine::{Core, LoadError};

use crate::commands::{on_worker_thread, Command, CommandKind, CommandQueue, Opcode};
use crate::config::RunnerConfig;
use crate::contexts::{CoreRuntimeContext, GameRuntimeContext, SharedCoreContext, SharedGameContext};
use crate::drivers::{DefaultDrivers, DriverFactory, InputSink, VideoSurface};
use crate::error::{OperationError, OperationResult, RunnerError};
use crate::notify::{FrontendNotifier, NotifyCallback};
use crate::paths::Paths;
use crate::state::{AppState, SharedState};

use worker::WorkerInit;

/// Opens a Core module; swapped out in tests
pub type CoreOpener = fn(&Path) -> Result<Core, LoadError>;

/// Everything `set_paths` prepares for the next session
pub(crate) struct Session {
    paths: Paths,
    core_ctx: SharedCoreContext,
    game_ctx: SharedGameContext,
}

impl Session {
    fn new(paths: Paths, config: &RunnerConfig) -> Self {
        let mut core_ctx = CoreRuntimeContext::new(&paths.core, &paths.system);
        core_ctx.language = config.language;
        let game_ctx = GameRuntimeContext::new(&paths.rom, &paths.save);
        Self {
            paths,
            core_ctx: Arc::new(RwLock::new(core_ctx)),
            game_ctx: Arc::new(RwLock::new(game_ctx)),
        }
    }
}

pub struct AppContext {
    config: Arc<RunnerConfig>,
    state: Arc<SharedState>,
    queue: Arc<CommandQueue>,
    /// Prepared by `set_paths`, handed to the worker by `start`
    session: Mutex<Option<Session>>,
    /// Paths of the current or last session
    paths: Mutex<Option<Paths>>,
    surface: Arc<Mutex<Option<VideoSurface>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    notifier: FrontendNotifier,
    input: Arc<dyn InputSink>,
    drivers: Arc<dyn DriverFactory>,
    core_opener: CoreOpener,
}

impl AppContext {
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        Self::with_drivers(config, Arc::new(DefaultDrivers))
    }

    pub fn with_drivers(config: RunnerConfig, drivers: Arc<dyn DriverFactory>) -> Result<Self, RunnerError> {
        let notifier = FrontendNotifier::spawn().map_err(RunnerError::WorkerSpawn)?;
        let input = drivers.input(&config.input_driver);
        Ok(Self {
            config: Arc::new(config),
            state: Arc::new(SharedState::new()),
            queue: Arc::new(CommandQueue::new()),
            session: Mutex::new(None),
            paths: Mutex::new(None),
            surface: Arc::new(Mutex::new(None)),
            worker: Mutex::new(None),
            notifier,
            input,
            drivers,
            core_opener: Core::load,
        })
    }

    /// Replace how Core modules are opened
    pub fn set_core_opener(&mut self, opener: CoreOpener) {
        self.core_opener = opener;
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Snapshot of the lifecycle flags
    pub fn state(&self) -> AppState {
        self.state.load()
    }

    pub fn set_notify_callback(&self, callback: Option<NotifyCallback>) {
        self.notifier.set_callback(callback);
    }

    /// Prepare a session. Ignored while a session already holds paths.
    pub fn set_paths(
        &self,
        rom: impl Into<PathBuf>,
        core: impl Into<PathBuf>,
        system: impl Into<PathBuf>,
        save: impl Into<PathBuf>,
    ) -> bool {
        if self.state.contains(AppState::PATHS_READY) {
            tracing::warn!("Paths already set");
            return false;
        }
        let paths = Paths::new(rom, core, system, save);
        tracing::info!("Paths set: rom={:?} core={:?}", paths.rom, paths.core);

        *self.paths.lock() = Some(paths.clone());
        *self.session.lock() = Some(Session::new(paths, &self.config));
        self.state.set(AppState::PATHS_READY)
    }

    /// Start the worker and queue core and content loading
    ///
    /// While a worker is alive but its Core failed to load, this retries the
    /// load instead.
    #[tracing::instrument(skip_all)]
    pub fn start(&self) -> Result<(), RunnerError> {
        let mut worker = self.worker.lock();

        if self.state.contains(AppState::RUNNING) {
            if self.state.contains(AppState::CORE_READY) {
                return Err(RunnerError::AlreadyRunning);
            }
            tracing::info!("Retrying core load");
            self.queue.push(Command::new(CommandKind::LoadCore));
            self.queue.push(Command::new(CommandKind::LoadContent));
            return Ok(());
        }

        if !self.state.contains(AppState::PATHS_READY) {
            return Err(RunnerError::PathsNotReady);
        }
        let Some(session) = self.session.lock().take() else {
            return Err(RunnerError::PathsNotReady);
        };

        if let Some(previous) = worker.take() {
            if previous.join().is_err() {
                tracing::error!("Previous worker panicked");
            }
        }

        self.state.clear(AppState::PAUSED);
        self.state.set(AppState::RUNNING);
        self.queue.push(Command::new(CommandKind::LoadCore));
        self.queue.push(Command::new(CommandKind::LoadContent));

        let init = WorkerInit {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            queue: Arc::clone(&self.queue),
            session,
            surface: Arc::clone(&self.surface),
            notifier: self.notifier.notifier(),
            input: Arc::clone(&self.input),
            drivers: Arc::clone(&self.drivers),
            core_opener: self.core_opener,
        };

        let spawned = std::thread::Builder::new()
            .name("retrorunner-worker".to_string())
            .spawn(move || worker::run(init));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                tracing::info!("Runner started");
                Ok(())
            }
            Err(e) => {
                self.state.clear(AppState::RUNNING);
                self.queue.clear();
                Err(RunnerError::WorkerSpawn(e))
            }
        }
    }

    /// Suspend simulation steps and audio
    pub fn pause(&self) {
        if !self.state.contains(AppState::RUNNING) {
            return;
        }
        self.state.set(AppState::PAUSED);
        self.queue.push(Command::new(CommandKind::PauseGame));
        self.queue.push(Command::new(CommandKind::DisableAudio));
    }

    pub fn resume(&self) {
        if !self.state.contains(AppState::PAUSED) {
            return;
        }
        self.state.clear(AppState::PAUSED);
        self.queue.push(Command::new(CommandKind::EnableAudio));
    }

    /// Reset the content. Ignored until content is loaded.
    pub fn reset(&self) {
        if self.state.contains(AppState::CONTENT_READY) {
            self.queue.push(Command::new(CommandKind::ResetGame));
        } else {
            tracing::debug!("Reset ignored, no content loaded");
        }
    }

    /// Ask the worker to save SRAM and stop. Does not wait.
    pub fn stop(&self) {
        if !self.state.contains(AppState::RUNNING) {
            return;
        }
        if self.config.save_sram_on_stop && self.state.contains(AppState::CONTENT_READY) {
            if let Some(sram) = self.paths.lock().as_ref().map(Paths::sram) {
                self.queue.push(Command::new(CommandKind::SaveSram(sram)));
            }
        }
        self.queue.push(Command::new(CommandKind::StopGame));
    }

    /// Wait for the worker thread to exit
    pub fn join(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Worker panicked");
            }
        }
    }

    /// Attach, resize or detach the host drawing surface
    pub fn set_video_surface(&self, surface: Option<VideoSurface>) {
        let mut current = self.surface.lock();
        match surface {
            Some(surface) => {
                let same = current.is_some_and(|c| c.id == surface.id);
                *current = Some(surface);
                let kind = if same {
                    CommandKind::UpdateVideoSize
                } else {
                    CommandKind::InitVideo
                };
                self.queue.push(Command::new(kind));
            }
            None => {
                // VIDEO_READY only changes on the worker
                *current = None;
                self.queue.push(Command::new(CommandKind::UnloadVideo));
            }
        }
    }

    pub fn set_controller(&self, port: u32, device: u32) {
        self.queue.push(Command::new(CommandKind::SetController { port, device }));
    }

    /// Set a Core option. With `notify_core` the Core sees the change on its
    /// next update poll.
    pub fn set_variable(&self, key: &str, value: &str, notify_core: bool) {
        self.queue.push(Command::new(CommandKind::SetVariable {
            key: key.to_string(),
            value: value.to_string(),
            notify_core,
        }));
    }

    /// Fast-forward multiplier; 1.0 is normal speed
    pub fn set_speed(&self, multiplier: f64) {
        self.queue.push(Command::new(CommandKind::SetSpeed(multiplier)));
    }

    /// Queue a command by numeric code. Path operations use default paths.
    pub fn add_command(&self, code: i32) -> bool {
        let Some(opcode) = Opcode::from_code(code) else {
            tracing::warn!("Unknown command code {}", code);
            return false;
        };
        let paths = self.paths.lock().clone();
        let kind = match (opcode, paths) {
            (Opcode::LoadCore, _) => CommandKind::LoadCore,
            (Opcode::LoadContent, _) => CommandKind::LoadContent,
            (Opcode::InitVideo, _) => CommandKind::InitVideo,
            (Opcode::InitInput, _) => CommandKind::InitInput,
            (Opcode::InitAudio, _) => CommandKind::InitAudio,
            (Opcode::UnloadVideo, _) => CommandKind::UnloadVideo,
            (Opcode::UpdateVideoSize, _) => CommandKind::UpdateVideoSize,
            (Opcode::ResetGame, _) => CommandKind::ResetGame,
            (Opcode::PauseGame, _) => CommandKind::PauseGame,
            (Opcode::StopGame, _) => CommandKind::StopGame,
            (Opcode::EnableAudio, _) => CommandKind::EnableAudio,
            (Opcode::DisableAudio, _) => CommandKind::DisableAudio,
            (Opcode::TakeScreenshot, Some(p)) => CommandKind::TakeScreenshot(p.state_screenshot(0)),
            (Opcode::SaveSram, Some(p)) => CommandKind::SaveSram(p.sram()),
            (Opcode::LoadSram, Some(p)) => CommandKind::LoadSram(p.sram()),
            (Opcode::SaveState, Some(p)) => CommandKind::SaveState(p.state(0)),
            (Opcode::LoadState, Some(p)) => CommandKind::LoadState(p.state(0)),
            (Opcode::LoadCheats, Some(p)) => CommandKind::LoadCheats(p.cheats()),
            (_, None) => {
                tracing::warn!("Command {:?} needs paths", opcode);
                return false;
            }
        };
        self.queue.push(Command::new(kind));
        true
    }

    pub fn save_state(&self, path: impl Into<PathBuf>, wait: bool) -> OperationResult {
        self.submit(CommandKind::SaveState(path.into()), wait)
    }

    pub fn load_state(&self, path: impl Into<PathBuf>, wait: bool) -> OperationResult {
        self.submit(CommandKind::LoadState(path.into()), wait)
    }

    pub fn save_sram(&self, path: impl Into<PathBuf>, wait: bool) -> OperationResult {
        self.submit(CommandKind::SaveSram(path.into()), wait)
    }

    pub fn load_sram(&self, path: impl Into<PathBuf>, wait: bool) -> OperationResult {
        self.submit(CommandKind::LoadSram(path.into()), wait)
    }

    pub fn take_screenshot(&self, path: impl Into<PathBuf>, wait: bool) -> OperationResult {
        self.submit(CommandKind::TakeScreenshot(path.into()), wait)
    }

    pub fn load_cheats(&self, path: impl Into<PathBuf>, wait: bool) -> OperationResult {
        self.submit(CommandKind::LoadCheats(path.into()), wait)
    }

    /// Host input: joypad button
    pub fn update_button(&self, port: u32, button: u32, pressed: bool) -> bool {
        self.input.update_button(port, button, pressed)
    }

    /// Host input: analog axis in `-1.0..=1.0`
    pub fn update_axis(&self, port: u32, index: u32, axis: u32, value: f32) -> bool {
        self.input.update_axis(port, index, axis, value)
    }

    fn submit(&self, kind: CommandKind, wait: bool) -> OperationResult {
        if !self.state.contains(AppState::RUNNING) {
            return Err(OperationError::AppNotRunning);
        }
        if !wait {
            self.queue.push(Command::new(kind));
            return Ok(());
        }
        if on_worker_thread() {
            tracing::error!("Synchronous {:?} issued from the worker thread", kind);
            return Err(OperationError::BadOperation);
        }

        let (command, completion) = Command::with_reply(kind);
        self.queue.push(command);
        if !self.state.contains(AppState::RUNNING) {
            // the worker may have torn down before seeing the command
            self.queue.clear();
        }
        completion.wait().unwrap_or(Err(OperationError::AppNotRunning))
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

#[cfg(test)]
mod tests;
