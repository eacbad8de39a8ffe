//! Worker command queue
//!
//! Any number of caller threads push; the worker thread pops. Commands from
//! one producer come out in the order that producer pushed them.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Command;

/// FIFO mailbox between caller threads and the worker
#[derive(Debug)]
pub struct CommandQueue {
    sender: Sender<Command>,
    receiver: Receiver<Command>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Append a command. Safe to call from any thread.
    pub fn push(&self, command: Command) {
        tracing::trace!("Queued command {} {:?}", command.id(), command.kind());
        // both ends live in self, so the channel cannot be disconnected
        if let Err(e) = self.sender.send(command) {
            tracing::error!("Command queue disconnected: {}", e);
        }
    }

    /// Remove and return the front command, if any
    pub fn pop(&self) -> Option<Command> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Drop every queued command
    ///
    /// Synchronous commands among them wake their callers unanswered.
    pub fn clear(&self) -> usize {
        let mut count = 0;
        while self.receiver.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}
