//! The emulation worker thread
//!
//! Owns the Core, both runtime contexts and every collaborator for the length
//! of a session. Each loop iteration drains the command queue, then either
//! runs one paced simulation step or sleeps for an idle frame.

use std::ffi::CString;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use retrorunner_engine::Core;
use retrorunner_sdk::{RETRO_API_VERSION, RETRO_DEVICE_ANALOG, RETRO_DEVICE_JOYPAD};

use super::{CoreOpener, Session};
use crate::bridge::{host_callbacks, CallbackHub, HubGuard};
use crate::cheats::CheatManager;
use crate::commands::{mark_worker_thread, Command, CommandKind, CommandQueue};
use crate::config::RunnerConfig;
use crate::contexts::{SharedCoreContext, SharedGameContext};
use crate::drivers::{DriverFactory, InputSink, VideoSurface};
use crate::environment::Environment;
use crate::error::{OperationError, OperationResult, RunnerError};
use crate::notify::{Notification, Notifier};
use crate::pacer::FramePacer;
use crate::paths::Paths;
use crate::state::{AppState, SharedState};

/// Everything a worker needs, built on the caller thread
pub(super) struct WorkerInit {
    pub config: Arc<RunnerConfig>,
    pub state: Arc<SharedState>,
    pub queue: Arc<CommandQueue>,
    pub session: Session,
    pub surface: Arc<Mutex<Option<VideoSurface>>>,
    pub notifier: Notifier,
    pub input: Arc<dyn InputSink>,
    pub drivers: Arc<dyn DriverFactory>,
    pub core_opener: CoreOpener,
}

pub(super) struct Worker {
    pub(super) config: Arc<RunnerConfig>,
    pub(super) state: Arc<SharedState>,
    queue: Arc<CommandQueue>,
    surface: Arc<Mutex<Option<VideoSurface>>>,
    notifier: Notifier,
    input: Arc<dyn InputSink>,
    drivers: Arc<dyn DriverFactory>,
    core_opener: CoreOpener,
    pub(super) paths: Paths,
    core_ctx: SharedCoreContext,
    game_ctx: SharedGameContext,
    pub(super) hub: Rc<CallbackHub>,
    pub(super) core: Option<Core>,
    pub(super) cheats: CheatManager,
    /// Rom bytes handed to the Core, kept until unload
    content: Option<Vec<u8>>,
    pacer: FramePacer,
}

/// Thread entry point
pub(super) fn run(init: WorkerInit) {
    mark_worker_thread();
    let mut worker = Worker::new(init);

    let guard = match HubGuard::install(Rc::clone(&worker.hub)) {
        Ok(guard) => guard,
        Err(e) => {
            tracing::error!("Worker cannot start: {}", e);
            worker.teardown();
            return;
        }
    };

    worker.run_loop();
    // the Core may still call back while unloading
    worker.teardown();
    drop(guard);
}

impl Worker {
    fn new(init: WorkerInit) -> Self {
        let Session {
            paths,
            core_ctx,
            game_ctx,
        } = init.session;
        let environment = Environment::new(
            Arc::clone(&init.config),
            &core_ctx,
            &game_ctx,
            init.notifier.clone(),
        );

        Self {
            config: init.config,
            state: init.state,
            queue: init.queue,
            surface: init.surface,
            notifier: init.notifier,
            input: init.input,
            drivers: init.drivers,
            core_opener: init.core_opener,
            paths,
            core_ctx,
            game_ctx,
            hub: Rc::new(CallbackHub::new(environment)),
            core: None,
            cheats: CheatManager::new(),
            content: None,
            pacer: FramePacer::new(),
        }
    }

    #[tracing::instrument(skip_all)]
    fn run_loop(&mut self) {
        tracing::info!("Worker started for {:?}", self.paths.rom);
        let idle = self.config.idle_frame_interval();

        loop {
            if let Err(e) = self.drain_commands() {
                tracing::error!("Session ended: {}", e);
                break;
            }

            let state = self.state.load();
            if !state.contains(AppState::RUNNING) {
                break;
            }
            if state.contains(AppState::PAUSED) {
                std::thread::sleep(idle);
                continue;
            }
            if state.can_step() {
                self.step();
            } else {
                std::thread::sleep(idle);
            }
        }
    }

    /// Execute every queued command. Stops early after `StopGame`.
    fn drain_commands(&mut self) -> Result<(), RunnerError> {
        while let Some(command) = self.queue.pop() {
            let id = command.id();
            let (kind, reply) = command.into_parts();
            tracing::debug!("Command {} {:?}", id, kind);

            let stop = kind == CommandKind::StopGame;
            let result = self.execute(kind)?;
            match reply {
                Some(reply) => reply.complete(result),
                None => {
                    if let Err(e) = result {
                        tracing::warn!("Command {} failed: {}", id, e);
                    }
                }
            }
            if stop {
                break;
            }
        }
        Ok(())
    }

    fn execute(&mut self, kind: CommandKind) -> Result<OperationResult, RunnerError> {
        let result = match kind {
            CommandKind::LoadCore => {
                self.load_core();
                Ok(())
            }
            CommandKind::LoadContent => self.load_content()?,
            CommandKind::InitVideo => self.init_video(),
            CommandKind::UpdateVideoSize => self.update_video_size(),
            CommandKind::UnloadVideo => {
                self.unload_video();
                Ok(())
            }
            CommandKind::InitInput => self.init_input(),
            CommandKind::InitAudio => self.init_audio(),
            CommandKind::ResetGame => self.reset_game(),
            CommandKind::PauseGame => {
                self.pacer.reset();
                Ok(())
            }
            CommandKind::StopGame => {
                tracing::info!("Stop requested");
                self.state.clear(AppState::RUNNING);
                Ok(())
            }
            CommandKind::EnableAudio => self.set_audio_enabled(true),
            CommandKind::DisableAudio => self.set_audio_enabled(false),
            CommandKind::SetController { port, device } => self.set_controller(port, device),
            CommandKind::SetVariable {
                key,
                value,
                notify_core,
            } => {
                self.hub
                    .environment
                    .borrow_mut()
                    .set_variable(&key, &value, notify_core);
                Ok(())
            }
            CommandKind::SetSpeed(multiplier) => {
                self.pacer.set_multiplier(multiplier);
                self.game_ctx.write().speed = self.pacer.multiplier();
                Ok(())
            }
            CommandKind::TakeScreenshot(path) => self.take_screenshot(&path),
            CommandKind::SaveSram(path) => self.save_sram(&path),
            CommandKind::LoadSram(path) => self.load_sram(&path),
            CommandKind::SaveState(path) => self.save_state(&path),
            CommandKind::LoadState(path) => self.load_state(&path),
            CommandKind::LoadCheats(path) => self.load_cheats(&path),
        };
        Ok(result)
    }

    /// One paced simulation step
    fn step(&mut self) {
        let fps = self.game_ctx.read().fps();
        self.pacer.hold(fps);

        if let Some(video) = self.hub.video.borrow_mut().as_mut() {
            video.prepare();
        }
        if let Some(core) = &self.core {
            core.run();
        }
        if let Some(video) = self.hub.video.borrow_mut().as_mut() {
            video.draw_frame();
        }

        let changed = {
            let mut game = self.game_ctx.write();
            game.take_geometry_changed().then(|| game.clone())
        };
        if let Some(game) = changed {
            if let Some(video) = self.hub.video.borrow_mut().as_mut() {
                video.on_geometry_changed(&game);
            }
        }

        if self.hub.environment.borrow_mut().take_shutdown_request() {
            self.state.clear(AppState::RUNNING);
        }
    }

    #[tracing::instrument(skip_all)]
    fn load_core(&mut self) {
        if self.core.is_some() {
            tracing::warn!("Core already loaded");
            return;
        }

        let path = self.paths.core.clone();
        let core = match (self.core_opener)(&path) {
            Ok(core) => core,
            Err(e) => {
                tracing::error!("Failed to load core {:?}: {}", path, e);
                return;
            }
        };

        core.register_callbacks(&host_callbacks());
        core.init();
        let api_version = core.api_version();
        if api_version != RETRO_API_VERSION {
            tracing::warn!(
                "Core API version {} differs from host version {}",
                api_version,
                RETRO_API_VERSION
            );
        }

        let info = core.system_info();
        tracing::info!(
            "Loaded core {} {} ({})",
            info.library_name,
            info.library_version,
            info.valid_extensions
        );
        self.core_ctx.write().system_info = info;
        self.core = Some(core);
        self.state.set(AppState::CORE_READY);
    }

    /// Load the rom. A refusal by the Core ends the session.
    #[tracing::instrument(skip_all)]
    fn load_content(&mut self) -> Result<OperationResult, RunnerError> {
        if self.state.contains(AppState::CONTENT_READY) {
            tracing::warn!("Content already loaded");
            return Ok(Ok(()));
        }
        let Some(core) = self.core.as_ref().filter(|_| self.state.contains(AppState::CORE_READY)) else {
            tracing::warn!("Content load requested before the core is ready");
            return Ok(Err(OperationError::ComponentMissing));
        };

        let rom = self.paths.rom.clone();
        let need_fullpath = self.core_ctx.read().system_info.need_fullpath;
        if !need_fullpath {
            match std::fs::read(&rom) {
                Ok(data) => self.content = Some(data),
                Err(e) => {
                    tracing::error!("Cannot read content {:?}: {}", rom, e);
                    return Err(RunnerError::ContentLoad(rom));
                }
            }
        }
        let Ok(path) = CString::new(rom.to_string_lossy().into_owned()) else {
            return Err(RunnerError::ContentLoad(rom));
        };

        if !core.load_game(Some(&path), self.content.as_deref()) {
            tracing::error!("Core refused content {:?}", rom);
            self.content = None;
            return Err(RunnerError::ContentLoad(rom));
        }

        let av_info = core.system_av_info();
        {
            let mut game = self.game_ctx.write();
            game.update_av_info(av_info);
            game.geometry_changed = false;
        }
        self.state.set(AppState::CONTENT_READY);
        tracing::info!(
            "Content loaded: {}x{} @ {:.2} fps, {} Hz",
            av_info.geometry.base_width,
            av_info.geometry.base_height,
            av_info.timing.fps,
            av_info.timing.sample_rate
        );
        self.notifier.notify(Notification::ContentLoaded);

        let sram = self.paths.sram();
        if self.config.load_sram_on_start && sram.exists() {
            self.queue.push(Command::new(CommandKind::LoadSram(sram)));
        }
        let cheats = self.paths.cheats();
        if cheats.exists() {
            self.queue.push(Command::new(CommandKind::LoadCheats(cheats)));
        }
        self.queue.push(Command::new(CommandKind::InitInput));
        self.queue.push(Command::new(CommandKind::InitAudio));
        if self.surface.lock().is_some() {
            self.queue.push(Command::new(CommandKind::InitVideo));
        }
        Ok(Ok(()))
    }

    fn init_video(&mut self) -> OperationResult {
        if !self.state.contains(AppState::CONTENT_READY) {
            tracing::debug!("Video init deferred until content is loaded");
            return Ok(());
        }
        let Some(surface) = *self.surface.lock() else {
            tracing::debug!("No video surface set");
            return Err(OperationError::ComponentMissing);
        };
        if self.hub.video.borrow().is_some() {
            self.unload_video();
        }

        let core_ctx = self.core_ctx.read().clone();
        let game_ctx = self.game_ctx.read().clone();
        let Some(mut video) = self.drivers.video(&self.config.video_driver, &core_ctx) else {
            tracing::error!("No video driver named {:?}", self.config.video_driver);
            return Err(OperationError::ComponentMissing);
        };
        if !video.init(&surface, &core_ctx, &game_ctx) {
            tracing::error!("Video init failed for surface {}", surface.id);
            return Err(OperationError::Failed);
        }

        *self.hub.video.borrow_mut() = Some(video);
        self.state.set(AppState::VIDEO_READY);
        tracing::info!("Video ready on surface {} ({}x{})", surface.id, surface.width, surface.height);

        if let Some(reset) = core_ctx.hw_render.and_then(|hw| hw.context_reset) {
            // SAFETY: supplied by the Core through SET_HW_RENDER
            unsafe { reset() };
        }
        Ok(())
    }

    fn update_video_size(&mut self) -> OperationResult {
        let Some(surface) = *self.surface.lock() else {
            return Ok(());
        };
        match self.hub.video.borrow_mut().as_mut() {
            Some(video) => {
                video.resize(surface.width, surface.height);
                Ok(())
            }
            None => Err(OperationError::ComponentMissing),
        }
    }

    fn unload_video(&mut self) {
        if self.hub.video.borrow().is_some() {
            let destroy = self.core_ctx.read().hw_render.and_then(|hw| hw.context_destroy);
            if let Some(destroy) = destroy {
                // SAFETY: supplied by the Core through SET_HW_RENDER
                unsafe { destroy() };
            }
        }
        let video = self.hub.video.borrow_mut().take();
        if let Some(mut video) = video {
            video.destroy();
            tracing::debug!("Video destroyed");
        }
        self.state.clear(AppState::VIDEO_READY);
    }

    fn init_input(&mut self) -> OperationResult {
        let device = if self.core_ctx.read().has_analog_controller() {
            RETRO_DEVICE_ANALOG
        } else {
            RETRO_DEVICE_JOYPAD
        };
        let users = self.config.max_users;

        self.input.init(users);
        *self.hub.input.borrow_mut() = Some(Arc::clone(&self.input));
        if let Some(core) = &self.core {
            for port in 0..users {
                core.set_controller_port_device(port, device);
            }
        }
        tracing::debug!("Input ready: {} users, device {}", users, device);
        Ok(())
    }

    fn init_audio(&mut self) -> OperationResult {
        if self.hub.audio.borrow().is_some() {
            tracing::debug!("Audio already initialized");
            return Ok(());
        }

        let sample_rate = self.game_ctx.read().sample_rate();
        let mut audio = self.drivers.audio(&self.config.audio_driver);
        if !audio.init(sample_rate, self.config.low_latency_audio) {
            tracing::error!("Audio init failed at {} Hz", sample_rate);
            return Err(OperationError::Failed);
        }
        if !self.state.contains(AppState::PAUSED) {
            audio.start();
            self.state.set(AppState::AUDIO_ENABLED);
        }
        *self.hub.audio.borrow_mut() = Some(audio);
        Ok(())
    }

    fn set_audio_enabled(&mut self, enabled: bool) -> OperationResult {
        let mut slot = self.hub.audio.borrow_mut();
        let Some(audio) = slot.as_mut() else {
            tracing::debug!("No audio output to toggle");
            return Ok(());
        };
        if self.state.contains(AppState::AUDIO_ENABLED) == enabled {
            return Ok(());
        }
        if enabled {
            audio.start();
            self.state.set(AppState::AUDIO_ENABLED);
        } else {
            audio.stop();
            self.state.clear(AppState::AUDIO_ENABLED);
        }
        Ok(())
    }

    fn reset_game(&mut self) -> OperationResult {
        match &self.core {
            Some(core) if self.state.contains(AppState::CONTENT_READY) => {
                core.reset();
                tracing::info!("Game reset");
                Ok(())
            }
            _ => {
                tracing::warn!("Reset requested without loaded content");
                Ok(())
            }
        }
    }

    fn set_controller(&mut self, port: u32, device: u32) -> OperationResult {
        match &self.core {
            Some(core) => {
                core.set_controller_port_device(port, device);
                tracing::debug!("Port {} set to device {}", port, device);
                Ok(())
            }
            None => {
                tracing::warn!("Controller change without a core");
                Err(OperationError::ComponentMissing)
            }
        }
    }

    /// Release everything and report the session as over
    fn teardown(&mut self) {
        if self.state.contains(AppState::CONTENT_READY) {
            if let Some(core) = &self.core {
                core.unload_game();
            }
            self.state.clear(AppState::CONTENT_READY);
        }
        self.content = None;

        self.unload_video();
        let audio = self.hub.audio.borrow_mut().take();
        if let Some(mut audio) = audio {
            if self.state.contains(AppState::AUDIO_ENABLED) {
                audio.stop();
            }
            audio.destroy();
        }
        self.hub.input.borrow_mut().take();

        if let Some(core) = self.core.take() {
            core.deinit();
            core.close();
        }

        self.state.clear(
            AppState::CORE_READY
                | AppState::RUNNING
                | AppState::PAUSED
                | AppState::AUDIO_ENABLED
                | AppState::PATHS_READY,
        );
        let dropped = self.queue.clear();
        if dropped > 0 {
            tracing::debug!("Dropped {} pending commands", dropped);
        }

        tracing::info!("Worker stopped");
        self.notifier.notify(Notification::Terminated);
    }
}
