//! Commands executed on the emulation worker
//!
//! Caller threads never touch the Core or the runtime contexts directly.
//! They push a [`Command`] onto the [`CommandQueue`]; the worker drains the
//! queue at the top of every loop iteration. A command built with
//! [`Command::with_reply`] is synchronous: the caller blocks on the returned
//! [`Completion`] until the worker answers.

mod completion;
mod queue;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

pub use completion::{completion, on_worker_thread, Completer, Completion};
pub(crate) use completion::mark_worker_thread;
pub use queue::CommandQueue;

use crate::error::OperationResult;

/// Unique id of a queued command
pub type CommandId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Numeric command codes accepted by the fire-and-forget entry point
///
/// Path-carrying operations submitted this way use their default path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Opcode {
    LoadCore = 11,
    LoadContent = 12,
    InitVideo = 13,
    InitInput = 14,
    InitAudio = 15,
    UnloadVideo = 16,
    UpdateVideoSize = 17,
    ResetGame = 18,
    PauseGame = 19,
    StopGame = 20,
    EnableAudio = 21,
    DisableAudio = 22,
    TakeScreenshot = 23,
    SaveSram = 24,
    LoadSram = 25,
    SaveState = 26,
    LoadState = 27,
    LoadCheats = 28,
}

impl Opcode {
    const ALL: [Opcode; 18] = [
        Opcode::LoadCore,
        Opcode::LoadContent,
        Opcode::InitVideo,
        Opcode::InitInput,
        Opcode::InitAudio,
        Opcode::UnloadVideo,
        Opcode::UpdateVideoSize,
        Opcode::ResetGame,
        Opcode::PauseGame,
        Opcode::StopGame,
        Opcode::EnableAudio,
        Opcode::DisableAudio,
        Opcode::TakeScreenshot,
        Opcode::SaveSram,
        Opcode::LoadSram,
        Opcode::SaveState,
        Opcode::LoadState,
        Opcode::LoadCheats,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as i32 == code)
    }
}

/// What the worker should do
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    LoadCore,
    LoadContent,
    InitVideo,
    UpdateVideoSize,
    UnloadVideo,
    InitInput,
    InitAudio,
    ResetGame,
    PauseGame,
    StopGame,
    EnableAudio,
    DisableAudio,
    SetController { port: u32, device: u32 },
    SetVariable { key: String, value: String, notify_core: bool },
    SetSpeed(f64),
    TakeScreenshot(PathBuf),
    SaveSram(PathBuf),
    LoadSram(PathBuf),
    SaveState(PathBuf),
    LoadState(PathBuf),
    LoadCheats(PathBuf),
}

/// A queued unit of work
#[derive(Debug)]
pub struct Command {
    id: CommandId,
    kind: CommandKind,
    reply: Option<Completer<OperationResult>>,
}

impl Command {
    /// Fire-and-forget command
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            reply: None,
        }
    }

    /// Synchronous command plus the handle its caller waits on
    pub fn with_reply(kind: CommandKind) -> (Self, Completion<OperationResult>) {
        let (completer, completion) = completion();
        let mut command = Self::new(kind);
        command.reply = Some(completer);
        (command, completion)
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn is_synchronous(&self) -> bool {
        self.reply.is_some()
    }

    pub fn into_parts(self) -> (CommandKind, Option<Completer<OperationResult>>) {
        (self.kind, self.reply)
    }
}
