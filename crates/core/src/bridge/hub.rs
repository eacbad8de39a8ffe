use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

use crate::drivers::{AudioSink, InputSink, VideoSink};
use crate::environment::Environment;

thread_local! {
    static HUB: RefCell<Option<Rc<CallbackHub>>> = const { RefCell::new(None) };
}

/// Everything the Core's callbacks reach during a session
///
/// Only touched from the worker thread. Borrows must never be held across a
/// call into the Core; the trampolines skip the call when they find a slot
/// already borrowed.
pub struct CallbackHub {
    pub environment: RefCell<Environment>,
    pub video: RefCell<Option<Box<dyn VideoSink>>>,
    pub audio: RefCell<Option<Box<dyn AudioSink>>>,
    pub input: RefCell<Option<Arc<dyn InputSink>>>,
}

impl CallbackHub {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment: RefCell::new(environment),
            video: RefCell::new(None),
            audio: RefCell::new(None),
            input: RefCell::new(None),
        }
    }
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("a callback hub is already installed on this thread")]
    AlreadyInstalled,
}

/// Keeps a hub installed on the current thread until dropped
#[must_use]
pub struct HubGuard {
    _not_send: PhantomData<Rc<()>>,
}

impl HubGuard {
    pub fn install(hub: Rc<CallbackHub>) -> Result<Self, HubError> {
        HUB.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                return Err(HubError::AlreadyInstalled);
            }
            *slot = Some(hub);
            Ok(Self {
                _not_send: PhantomData,
            })
        })
    }
}

impl Drop for HubGuard {
    fn drop(&mut self) {
        let _ = HUB.try_with(|slot| slot.borrow_mut().take());
    }
}

/// Run `f` against the installed hub, `None` when there is none
pub fn with_hub<R>(f: impl FnOnce(&CallbackHub) -> R) -> Option<R> {
    // clone out so `f` may re-enter
    let hub = HUB.try_with(|slot| slot.borrow().clone()).ok().flatten()?;
    Some(f(&hub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::contexts::{CoreRuntimeContext, GameRuntimeContext};
    use crate::notify::Notifier;
    use parking_lot::RwLock;

    fn hub() -> Rc<CallbackHub> {
        let core = Arc::new(RwLock::new(CoreRuntimeContext::new("core.so", "/system")));
        let game = Arc::new(RwLock::new(GameRuntimeContext::new("game.nes", "/saves")));
        let env = Environment::new(Arc::new(RunnerConfig::default()), &core, &game, Notifier::disconnected());
        Rc::new(CallbackHub::new(env))
    }

    #[test]
    fn test_install_and_remove() {
        assert!(with_hub(|_| ()).is_none());
        {
            let _guard = HubGuard::install(hub()).unwrap();
            assert!(with_hub(|_| ()).is_some());
            assert!(matches!(HubGuard::install(hub()), Err(HubError::AlreadyInstalled)));
        }
        assert!(with_hub(|_| ()).is_none());
    }

    #[test]
    fn test_hub_is_per_thread() {
        let _guard = HubGuard::install(hub()).unwrap();
        let seen = std::thread::spawn(|| with_hub(|_| ()).is_some()).join().unwrap();
        assert!(!seen);
    }
}
