use std::fmt;
use std::time::Duration;

use crate::scheduler::{Scheduler, TaskId, TaskKind};

pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Count(u32),
    /// Terminal marker; input is accepted from here on.
    Go,
}

impl fmt::Display for CountdownTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownTick::Count(n) => write!(f, "{n}"),
            CountdownTick::Go => write!(f, "Go!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { remaining: u32, task: TaskId },
    Finished,
}

/// Pre-game suspension: N, N-1, ... 1, Go, one tick per second.
#[derive(Debug)]
pub struct Countdown {
    length: u32,
    phase: Phase,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECS)
    }
}

impl Countdown {
    pub fn new(length: u32) -> Self {
        Self {
            length,
            phase: Phase::Idle,
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Begins counting and returns the first tick to show. `None` if a
    /// countdown is already running.
    pub fn start(&mut self, scheduler: &mut Scheduler, now: Duration) -> Option<CountdownTick> {
        if self.is_running() {
            return None;
        }
        if self.length == 0 {
            self.phase = Phase::Finished;
            return Some(CountdownTick::Go);
        }

        let task =
            scheduler.schedule_repeating(TaskKind::CountdownTick, now + TICK_INTERVAL, TICK_INTERVAL);
        self.phase = Phase::Running {
            remaining: self.length,
            task,
        };
        Some(CountdownTick::Count(self.length))
    }

    /// Advances on a fired tick task. Ticks from any other task id (a
    /// cancelled or superseded countdown) are ignored.
    pub fn on_tick(&mut self, scheduler: &mut Scheduler, id: TaskId) -> Option<CountdownTick> {
        let Phase::Running { remaining, task } = self.phase else {
            return None;
        };
        if task != id {
            return None;
        }

        let remaining = remaining - 1;
        if remaining == 0 {
            scheduler.cancel(task);
            self.phase = Phase::Finished;
            Some(CountdownTick::Go)
        } else {
            self.phase = Phase::Running { remaining, task };
            Some(CountdownTick::Count(remaining))
        }
    }

    /// Aborts a running countdown without finishing it.
    pub fn cancel(&mut self, scheduler: &mut Scheduler) -> bool {
        match self.phase {
            Phase::Running { task, .. } => {
                scheduler.cancel(task);
                self.phase = Phase::Idle;
                true
            }
            Phase::Idle | Phase::Finished => {
                self.phase = Phase::Idle;
                false
            }
        }
    }
}
