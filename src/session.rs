use std::time::Duration;

use strum_macros::Display;

/// Judgement recorded for one passage character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharOutcome {
    #[default]
    Untouched,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Mode {
    Idle,
    Countdown,
    Active,
    Ended,
}

/// Which driver may feed the engine while the session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InputSource {
    Human,
    Bot,
}

/// The authoritative record of one typing session.
///
/// Counters only move through [`crate::engine::TypingEngine`]; mode and
/// timing changes come from the orchestrator. A fresh value is built for
/// every reset.
#[derive(Debug, Clone)]
pub struct SessionState {
    passage: Vec<char>,
    pub(crate) outcomes: Vec<CharOutcome>,
    pub(crate) cursor: usize,
    pub(crate) typed_count: usize,
    pub(crate) correct_count: usize,
    pub(crate) mistake_count: usize,
    pub(crate) started_at: Option<Duration>,
    pub(crate) mode: Mode,
    pub(crate) input_source: InputSource,
}

impl SessionState {
    pub fn new(passage: &str) -> Self {
        let passage: Vec<char> = passage.chars().collect();
        Self {
            outcomes: vec![CharOutcome::Untouched; passage.len()],
            passage,
            cursor: 0,
            typed_count: 0,
            correct_count: 0,
            mistake_count: 0,
            started_at: None,
            mode: Mode::Idle,
            input_source: InputSource::Human,
        }
    }

    pub fn passage(&self) -> &[char] {
        &self.passage
    }

    pub fn passage_text(&self) -> String {
        self.passage.iter().collect()
    }

    pub fn outcomes(&self) -> &[CharOutcome] {
        &self.outcomes
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn typed_count(&self) -> usize {
        self.typed_count
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn mistake_count(&self) -> usize {
        self.mistake_count
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input_source(&self) -> InputSource {
        self.input_source
    }

    pub fn len(&self) -> usize {
        self.passage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passage.is_empty()
    }

    /// Character awaiting judgement, `None` once the passage is exhausted.
    pub fn expected_char(&self) -> Option<char> {
        self.passage.get(self.cursor).copied()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.passage.len()
    }

    pub fn progress_percent(&self) -> u8 {
        if self.passage.is_empty() {
            return 0;
        }
        (self.cursor * 100 / self.passage.len()) as u8
    }

    /// Seconds since the first accepted keystroke, measured at `now`.
    pub fn elapsed_secs(&self, now: Duration) -> f64 {
        self.started_at
            .map(|start| now.saturating_sub(start).as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            cursor: self.cursor,
            outcomes: &self.outcomes,
            progress_percent: self.progress_percent(),
        }
    }

    /// Checks the counter invariants; used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let judged = self
            .outcomes
            .iter()
            .filter(|o| **o != CharOutcome::Untouched)
            .count();
        let correct = self
            .outcomes
            .iter()
            .filter(|o| **o == CharOutcome::Correct)
            .count();

        self.outcomes.len() == self.passage.len()
            && self.cursor <= self.passage.len()
            && self.typed_count == self.cursor
            && judged == self.cursor
            && correct == self.correct_count
            && self.correct_count + self.mistake_count == self.typed_count
    }
}

/// What a renderer needs to redraw the passage after an engine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<'a> {
    pub cursor: usize,
    pub outcomes: &'a [CharOutcome],
    pub progress_percent: u8,
}
