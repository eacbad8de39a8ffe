//! Runner lifecycle flags
//!
//! The flags are independent bits, but some have causal preconditions:
//! content cannot be ready without a Core, and a simulation step needs video
//! and content while not paused. [`SharedState`] checks those preconditions
//! on every transition.

use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Lifecycle flags of a runner
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AppState: u32 {
        /// Rom, core, system and save paths are known
        const PATHS_READY = 1 << 0;
        /// A Core is loaded and initialized
        const CORE_READY = 1 << 1;
        /// The Core accepted the content
        const CONTENT_READY = 1 << 2;
        /// A video output is initialized
        const VIDEO_READY = 1 << 3;
        /// The worker loop is active
        const RUNNING = 1 << 4;
        /// Simulation steps are suspended
        const PAUSED = 1 << 5;
        /// Audio output is started
        const AUDIO_ENABLED = 1 << 6;
    }
}

impl AppState {
    /// Whether a simulation step may run
    pub fn can_step(self) -> bool {
        self.contains(Self::VIDEO_READY | Self::CONTENT_READY) && !self.contains(Self::PAUSED)
    }

    /// Whether `flag` may be raised from this state
    pub fn permits(self, flag: AppState) -> bool {
        if flag.contains(Self::CONTENT_READY) && !self.union(flag).contains(Self::CORE_READY) {
            return false;
        }
        if flag.contains(Self::CORE_READY) && !self.union(flag).contains(Self::PATHS_READY) {
            return false;
        }
        true
    }
}

/// Atomic holder for [`AppState`]
///
/// Readable from any thread. Transitions that violate a precondition are
/// refused and logged.
#[derive(Debug, Default)]
pub struct SharedState(AtomicU32);

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub fn load(&self) -> AppState {
        AppState::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    pub fn contains(&self, flag: AppState) -> bool {
        self.load().contains(flag)
    }

    /// Raise `flag`. Returns false when a precondition does not hold.
    pub fn set(&self, flag: AppState) -> bool {
        let result = self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            let current = AppState::from_bits_truncate(bits);
            current.permits(flag).then(|| current.union(flag).bits())
        });
        if result.is_err() {
            tracing::warn!("Refused state transition {:?} from {:?}", flag, self.load());
        }
        result.is_ok()
    }

    /// Clear `flag`
    ///
    /// Clearing CORE_READY also clears CONTENT_READY.
    pub fn clear(&self, flag: AppState) {
        let mut mask = flag;
        if mask.contains(AppState::CORE_READY) {
            mask |= AppState::CONTENT_READY;
        }
        self.0.fetch_and(!mask.bits(), Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_requires_core() {
        let state = SharedState::new();
        assert!(state.set(AppState::PATHS_READY | AppState::RUNNING));
        assert!(!state.set(AppState::CONTENT_READY));
        assert!(!state.contains(AppState::CONTENT_READY));

        assert!(state.set(AppState::CORE_READY));
        assert!(state.set(AppState::CONTENT_READY));
        assert!(state.contains(AppState::CONTENT_READY));
    }

    #[test]
    fn test_clearing_core_clears_content() {
        let state = SharedState::new();
        state.set(AppState::PATHS_READY);
        state.set(AppState::CORE_READY);
        state.set(AppState::CONTENT_READY);
        state.clear(AppState::CORE_READY);
        assert!(!state.contains(AppState::CONTENT_READY));
        assert!(state.contains(AppState::PATHS_READY));
    }

    #[test]
    fn test_can_step_over_all_states() {
        for bits in 0..=AppState::all().bits() {
            let state = AppState::from_bits_truncate(bits);
            let expected = state.contains(AppState::VIDEO_READY)
                && state.contains(AppState::CONTENT_READY)
                && !state.contains(AppState::PAUSED);
            assert_eq!(state.can_step(), expected, "{:?}", state);
        }
    }

    #[test]
    fn test_core_requires_paths() {
        let state = SharedState::new();
        assert!(!state.set(AppState::CORE_READY));
        assert!(state.set(AppState::PATHS_READY | AppState::CORE_READY));
    }
}
