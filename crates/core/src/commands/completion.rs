//! One-shot result channel for synchronous commands
//!
//! The caller keeps the [`Completion`] and blocks on it; the worker owns the
//! [`Completer`] and answers exactly once. Dropping the completer without
//! answering wakes the caller with `None`.

use std::cell::Cell;

use crossbeam_channel::{bounded, Receiver, Sender};

thread_local! {
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Mark the current thread as an emulation worker
pub(crate) fn mark_worker_thread() {
    ON_WORKER.with(|flag| flag.set(true));
}

/// Whether the current thread is an emulation worker
pub fn on_worker_thread() -> bool {
    ON_WORKER.with(Cell::get)
}

/// Create a linked completer / completion pair
pub fn completion<R>() -> (Completer<R>, Completion<R>) {
    let (sender, receiver) = bounded(1);
    (Completer { sender }, Completion { receiver })
}

/// Worker side of a synchronous command
#[derive(Debug)]
pub struct Completer<R> {
    sender: Sender<R>,
}

impl<R> Completer<R> {
    /// Store the result and wake the waiting caller
    pub fn complete(self, value: R) {
        if self.sender.send(value).is_err() {
            tracing::trace!("Completion dropped before the result arrived");
        }
    }
}

/// Caller side of a synchronous command
#[derive(Debug)]
pub struct Completion<R> {
    receiver: Receiver<R>,
}

impl<R> Completion<R> {
    /// Block until the worker answers
    ///
    /// Returns `None` when the command was dropped unanswered.
    ///
    /// # Panics
    /// In debug builds, when called on the worker thread (it would wait on
    /// itself forever).
    pub fn wait(self) -> Option<R> {
        debug_assert!(
            !on_worker_thread(),
            "synchronous command awaited on the worker thread"
        );
        self.receiver.recv().ok()
    }

    /// Take the result if it is already available
    pub fn try_get(&self) -> Option<R> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_returns_after_complete() {
        let (completer, completion) = completion::<i32>();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete(7);
        });
        assert_eq!(completion.wait(), Some(7));
        handle.join().unwrap();
    }

    #[test]
    fn test_dropped_completer_wakes_caller() {
        let (completer, completion) = completion::<i32>();
        drop(completer);
        assert_eq!(completion.wait(), None);
    }

    #[test]
    fn test_try_get_before_and_after() {
        let (completer, completion) = completion::<&str>();
        assert_eq!(completion.try_get(), None);
        completer.complete("done");
        assert_eq!(completion.try_get(), Some("done"));
    }

    #[test]
    fn test_worker_flag_is_thread_local() {
        let marked = thread::spawn(|| {
            mark_worker_thread();
            on_worker_thread()
        })
        .join()
        .unwrap();
        assert!(marked);
        assert!(!on_worker_thread());
    }
}
