use std::time::Duration;

use tracing::debug;

use crate::metrics::{accuracy_percent, words_per_minute, WpmSample};
use crate::scheduler::{Scheduler, TaskId, TaskKind};
use crate::session::SessionState;

pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Figures shown while a session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveHud {
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_secs: u64,
}

/// Samples elapsed time once per interval while a session is active.
#[derive(Debug)]
pub struct TimerDriver {
    interval: Duration,
    task: Option<TaskId>,
    hud: LiveHud,
    samples: Vec<WpmSample>,
}

impl Default for TimerDriver {
    fn default() -> Self {
        Self::new(SAMPLE_INTERVAL)
    }
}

impl TimerDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
            hud: LiveHud::default(),
            samples: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Arms the repeating sample task. A second start while running is
    /// ignored and returns `false`.
    pub fn start(&mut self, scheduler: &mut Scheduler, now: Duration) -> bool {
        if self.task.is_some() {
            debug!("timer already running, ignoring start");
            return false;
        }
        self.task = Some(scheduler.schedule_repeating(
            TaskKind::TimerSample,
            now + self.interval,
            self.interval,
        ));
        true
    }

    pub fn stop(&mut self, scheduler: &mut Scheduler) -> bool {
        match self.task.take() {
            Some(id) => scheduler.cancel(id),
            None => false,
        }
    }

    /// Forgets the previous session's figures. Stop first.
    pub fn clear(&mut self) {
        self.hud = LiveHud::default();
        self.samples.clear();
    }

    pub fn owns(&self, id: TaskId) -> bool {
        self.task == Some(id)
    }

    /// Recomputes live WPM from the session at `now` and records a sample.
    pub fn sample(&mut self, session: &SessionState, now: Duration) -> LiveHud {
        let elapsed = session.elapsed_secs(now);
        let wpm = words_per_minute(session.correct_count(), elapsed);

        self.hud.elapsed_secs = elapsed.floor() as u64;
        self.hud.wpm = wpm;
        self.samples.push(WpmSample::new(elapsed, wpm));
        self.hud
    }

    /// Refreshes accuracy after an engine step.
    pub fn track_accuracy(&mut self, session: &SessionState) -> LiveHud {
        self.hud.accuracy = accuracy_percent(session.correct_count(), session.typed_count());
        self.hud
    }

    pub fn hud(&self) -> LiveHud {
        self.hud
    }

    pub fn samples(&self) -> &[WpmSample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Keystroke, TypingEngine};
    use crate::session::Mode;

    #[test]
    fn test_double_start_is_ignored() {
        let mut scheduler = Scheduler::new();
        let mut timer = TimerDriver::default();

        assert!(timer.start(&mut scheduler, Duration::ZERO));
        assert!(!timer.start(&mut scheduler, Duration::ZERO));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_stop_cancels_task() {
        let mut scheduler = Scheduler::new();
        let mut timer = TimerDriver::default();
        timer.start(&mut scheduler, Duration::ZERO);

        assert!(timer.stop(&mut scheduler));
        assert!(!timer.stop(&mut scheduler));
        assert!(!timer.is_running());
        assert_eq!(scheduler.pop_due(Duration::from_secs(10)), None);
    }

    #[test]
    fn test_sample_computes_live_wpm() {
        let engine = TypingEngine::default();
        let mut session = SessionState::new("aaaaaaaaaaaa");
        session.mode = Mode::Active;
        session.started_at = Some(Duration::ZERO);
        for _ in 0..10 {
            engine.submit(&mut session, Keystroke::Char('a'));
        }

        let mut timer = TimerDriver::default();
        let hud = timer.sample(&session, Duration::from_secs(6));

        // 10 chars = 2 words in a tenth of a minute
        assert_eq!(hud.wpm, 20);
        assert_eq!(hud.elapsed_secs, 6);
        assert_eq!(timer.samples(), &[WpmSample::new(6.0, 20)]);
    }

    #[test]
    fn test_track_accuracy() {
        let engine = TypingEngine::default();
        let mut session = SessionState::new("abcd");
        session.mode = Mode::Active;
        engine.submit(&mut session, Keystroke::Char('a'));
        engine.submit(&mut session, Keystroke::Char('x'));

        let mut timer = TimerDriver::default();
        assert_eq!(timer.track_accuracy(&session).accuracy, 50);
    }
}
