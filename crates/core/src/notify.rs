//! Frontend notifications
//!
//! The worker never calls into the host UI directly. Notifications go over a
//! channel to a dedicated thread that invokes the host's callback, so a slow
//! host cannot stall emulation.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

/// Events reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Notification {
    ContentLoaded = 100,
    Terminated = 101,
    GameGeometryChanged = 102,
}

/// Host callback receiving notifications
pub type NotifyCallback = Arc<dyn Fn(Notification) + Send + Sync + 'static>;

type CallbackSlot = Arc<RwLock<Option<NotifyCallback>>>;

/// Cheap, cloneable sending side
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Sender<Notification>,
}

impl Notifier {
    /// Queue `notification` for delivery. Never blocks.
    pub fn notify(&self, notification: Notification) {
        tracing::debug!("Notify frontend: {:?}", notification);
        if self.sender.send(notification).is_err() {
            tracing::warn!("Notification thread gone, dropping {:?}", notification);
        }
    }

    /// A notifier whose messages go nowhere
    pub fn disconnected() -> Self {
        let (sender, _) = unbounded();
        Self { sender }
    }

    #[cfg(test)]
    pub(crate) fn from_sender(sender: Sender<Notification>) -> Self {
        Self { sender }
    }
}

/// Owns the delivery thread and the host callback
pub struct FrontendNotifier {
    notifier: Option<Notifier>,
    callback: CallbackSlot,
    thread: Option<JoinHandle<()>>,
}

impl FrontendNotifier {
    /// Spawn the delivery thread
    pub fn spawn() -> std::io::Result<Self> {
        let (sender, receiver) = unbounded();
        let callback: CallbackSlot = Arc::new(RwLock::new(None));
        let slot = Arc::clone(&callback);

        let thread = std::thread::Builder::new()
            .name("retrorunner-notify".to_string())
            .spawn(move || deliver(receiver, slot))?;

        Ok(Self {
            notifier: Some(Notifier { sender }),
            callback,
            thread: Some(thread),
        })
    }

    /// Replace the host callback; `None` silences delivery
    pub fn set_callback(&self, callback: Option<NotifyCallback>) {
        *self.callback.write() = callback;
    }

    /// A sender for the worker and the environment dispatcher
    pub fn notifier(&self) -> Notifier {
        match &self.notifier {
            Some(notifier) => notifier.clone(),
            None => Notifier::disconnected(),
        }
    }
}

impl Drop for FrontendNotifier {
    fn drop(&mut self) {
        // the thread exits once every sender is gone
        self.notifier.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Notification thread panicked");
            }
        }
    }
}

fn deliver(receiver: Receiver<Notification>, callback: CallbackSlot) {
    while let Ok(notification) = receiver.recv() {
        // released before the call so the callback may replace itself
        let current = callback.read().clone();
        if let Some(current) = current {
            current(notification);
        }
    }
    tracing::debug!("Notification thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_notifications_reach_callback_in_order() {
        let notifier = FrontendNotifier::spawn().unwrap();
        let (tx, rx) = unbounded();
        notifier.set_callback(Some(Arc::new(move |n| {
            let _ = tx.send(n);
        })));

        let sender = notifier.notifier();
        sender.notify(Notification::ContentLoaded);
        sender.notify(Notification::GameGeometryChanged);

        let timeout = Duration::from_secs(5);
        assert_eq!(rx.recv_timeout(timeout), Ok(Notification::ContentLoaded));
        assert_eq!(rx.recv_timeout(timeout), Ok(Notification::GameGeometryChanged));
    }

    #[test]
    fn test_callback_may_clear_itself() {
        let notifier = Arc::new(FrontendNotifier::spawn().unwrap());
        let (tx, rx) = unbounded();
        let inner = Arc::downgrade(&notifier);
        notifier.set_callback(Some(Arc::new(move |n| {
            if let Some(inner) = inner.upgrade() {
                inner.set_callback(None);
            }
            let _ = tx.send(n);
        })));

        let sender = notifier.notifier();
        sender.notify(Notification::Terminated);
        let timeout = Duration::from_secs(3);
        assert_eq!(rx.recv_timeout(timeout), Ok(Notification::Terminated));

        // cleared: nothing further is delivered
        sender.notify(Notification::ContentLoaded);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_codes() {
        assert_eq!(Notification::ContentLoaded as i32, 100);
        assert_eq!(Notification::Terminated as i32, 101);
        assert_eq!(Notification::GameGeometryChanged as i32, 102);
    }

    #[test]
    fn test_disconnected_notifier_does_not_block() {
        Notifier::disconnected().notify(Notification::Terminated);
    }
}
