//! Save data, states, screenshots and cheats
//!
//! Every operation answers with an [`OperationResult`] whose error maps to
//! the integer status reported to synchronous callers.

use std::path::Path;

use retrorunner_engine::Core;
use retrorunner_sdk::RETRO_MEMORY_SAVE_RAM;

use super::worker::Worker;
use crate::error::{OperationError, OperationResult};
use crate::state::AppState;

impl Worker {
    /// The Core, if content is loaded
    fn running_core(&self) -> Result<&Core, OperationError> {
        match &self.core {
            Some(core) if self.state.contains(AppState::CONTENT_READY) => Ok(core),
            _ => Err(OperationError::ComponentMissing),
        }
    }

    pub(super) fn save_state(&mut self, path: &Path) -> OperationResult {
        let core = self.running_core()?;
        let size = core.serialize_size();
        if size == 0 {
            tracing::warn!("Core reports an empty state");
            return Err(OperationError::EmptyMemory);
        }

        let mut buffer = vec![0u8; size];
        if !core.serialize(&mut buffer) {
            tracing::error!("Core failed to serialize {} bytes", size);
            return Err(OperationError::CannotReadMemory);
        }
        write_file(path, &buffer)?;
        tracing::info!("Saved state to {:?} ({} bytes)", path, size);
        Ok(())
    }

    pub(super) fn load_state(&mut self, path: &Path) -> OperationResult {
        let core = self.running_core()?;
        let data = read_file(path)?;
        if !core.unserialize(&data) {
            tracing::error!("Core rejected state {:?}", path);
            return Err(OperationError::CannotWriteData);
        }
        tracing::info!("Loaded state from {:?}", path);
        Ok(())
    }

    pub(super) fn save_sram(&mut self, path: &Path) -> OperationResult {
        self.running_core()?;
        let Some(memory) = self.core.as_mut().and_then(|core| core.memory(RETRO_MEMORY_SAVE_RAM)) else {
            tracing::debug!("Core has no save RAM");
            return Err(OperationError::EmptyMemory);
        };
        write_file(path, memory)?;
        tracing::info!("Saved SRAM to {:?}", path);
        Ok(())
    }

    pub(super) fn load_sram(&mut self, path: &Path) -> OperationResult {
        self.running_core()?;
        let Some(memory) = self.core.as_mut().and_then(|core| core.memory(RETRO_MEMORY_SAVE_RAM)) else {
            tracing::debug!("Core has no save RAM");
            return Err(OperationError::EmptyMemory);
        };
        let data = read_file(path)?;
        if data.len() != memory.len() {
            tracing::warn!(
                "SRAM file {:?} is {} bytes, Core expects {}",
                path,
                data.len(),
                memory.len()
            );
        }
        let len = data.len().min(memory.len());
        memory[..len].copy_from_slice(&data[..len]);
        tracing::info!("Loaded SRAM from {:?}", path);
        Ok(())
    }

    pub(super) fn take_screenshot(&mut self, path: &Path) -> OperationResult {
        let mut video = self.hub.video.borrow_mut();
        let Some(video) = video.as_mut() else {
            tracing::warn!("Screenshot requested without video output");
            return Err(OperationError::Failed);
        };
        video.take_screenshot(path)
    }

    pub(super) fn load_cheats(&mut self, path: &Path) -> OperationResult {
        self.running_core()?;
        if let Err(e) = self.cheats.load_file(path) {
            tracing::warn!("Cannot load cheats from {:?}: {}", path, e);
            return Err(OperationError::EmptyFile);
        }
        let core = self.running_core()?;
        if !self.cheats.apply(core) {
            tracing::info!("Core does not support cheats, {} ignored", self.cheats.len());
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, OperationError> {
    match std::fs::read(path) {
        Ok(data) if !data.is_empty() => Ok(data),
        Ok(_) => {
            tracing::warn!("{:?} is empty", path);
            Err(OperationError::EmptyFile)
        }
        Err(e) => {
            tracing::warn!("Cannot read {:?}: {}", path, e);
            Err(OperationError::EmptyFile)
        }
    }
}

fn write_file(path: &Path, data: &[u8]) -> OperationResult {
    let written = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
    .and_then(|()| std::fs::write(path, data));

    written.map_err(|e| {
        tracing::error!("Cannot write {:?}: {}", path, e);
        OperationError::CannotWriteData
    })
}
