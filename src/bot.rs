use std::time::Duration;

use strum_macros::Display;
use tracing::debug;

use crate::engine::Keystroke;
use crate::error::BotRejected;
use crate::scheduler::{Scheduler, TaskId, TaskKind};
use crate::session::{Mode, SessionState};

pub const DEFAULT_BOT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeactivateReason {
    /// Switched off by the user; human input takes over.
    Stopped,
    SessionEnded,
    Reset,
}

impl DeactivateReason {
    /// Only a user stop hands the keyboard back; the other reasons are part
    /// of a cleanup that sets up input state itself.
    pub fn restores_human_input(self) -> bool {
        self == DeactivateReason::Stopped
    }
}

/// Scripted auto-typer: submits the expected character at a fixed cadence.
#[derive(Debug)]
pub struct BotDriver {
    interval: Duration,
    task: Option<TaskId>,
}

impl Default for BotDriver {
    fn default() -> Self {
        Self::new(DEFAULT_BOT_INTERVAL)
    }
}

impl BotDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn owns(&self, id: TaskId) -> bool {
        self.task == Some(id)
    }

    /// Activation is refused while anything else is driving the session.
    pub fn check_activation(
        &self,
        session: &SessionState,
        countdown_running: bool,
    ) -> Result<(), BotRejected> {
        if self.is_running() {
            return Err(BotRejected::AlreadyRunning);
        }
        if countdown_running || session.mode() == Mode::Countdown {
            return Err(BotRejected::CountdownInProgress);
        }
        if session.mode() == Mode::Active {
            return Err(BotRejected::SessionActive);
        }
        Ok(())
    }

    pub fn start(&mut self, scheduler: &mut Scheduler, now: Duration) -> bool {
        if self.task.is_some() {
            return false;
        }
        self.task = Some(scheduler.schedule_repeating(
            TaskKind::BotStep,
            now + self.interval,
            self.interval,
        ));
        true
    }

    /// Cancels the pending step. Returns whether the bot was running, so
    /// racing callers can tell who did the work.
    pub fn deactivate(&mut self, scheduler: &mut Scheduler, reason: DeactivateReason) -> bool {
        match self.task.take() {
            Some(id) => {
                scheduler.cancel(id);
                debug!(%reason, "bot deactivated");
                true
            }
            None => false,
        }
    }

    /// The bot never makes mistakes.
    pub fn next_keystroke(session: &SessionState) -> Option<Keystroke> {
        session.expected_char().map(Keystroke::Char)
    }
}
