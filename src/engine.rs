use crate::session::{CharOutcome, Mode, SessionState};

/// One input event fed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    /// The last passage character was judged; the session is now `Ended`.
    Completed,
    /// The keystroke was refused and nothing changed.
    Rejected,
}

/// What a forward step found, so callers can fire cosmetic effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub transition: Transition,
    pub mismatch: bool,
}

impl StepOutcome {
    fn rejected() -> Self {
        Self {
            transition: Transition::Rejected,
            mismatch: false,
        }
    }
}

/// Per-character matching engine.
#[derive(Debug, Clone, Copy)]
pub struct TypingEngine {
    allow_backspace: bool,
}

impl Default for TypingEngine {
    fn default() -> Self {
        Self {
            allow_backspace: true,
        }
    }
}

impl TypingEngine {
    pub fn new(allow_backspace: bool) -> Self {
        Self { allow_backspace }
    }

    pub fn allow_backspace(&self) -> bool {
        self.allow_backspace
    }

    pub fn set_allow_backspace(&mut self, allow: bool) {
        self.allow_backspace = allow;
    }

    pub fn submit(&self, state: &mut SessionState, key: Keystroke) -> Transition {
        self.step(state, key).transition
    }

    /// Judges one keystroke against the passage and updates `state`.
    pub fn step(&self, state: &mut SessionState, key: Keystroke) -> StepOutcome {
        if state.mode != Mode::Active {
            return StepOutcome::rejected();
        }

        let outcome = match key {
            Keystroke::Char(c) => forward(state, c),
            Keystroke::Backspace if self.allow_backspace => backward(state),
            Keystroke::Backspace => StepOutcome::rejected(),
        };
        debug_assert!(state.is_consistent());
        outcome
    }
}

fn forward(state: &mut SessionState, c: char) -> StepOutcome {
    let Some(expected) = state.expected_char() else {
        return StepOutcome::rejected();
    };

    let idx = state.cursor;
    let mismatch = c != expected;
    if mismatch {
        state.outcomes[idx] = CharOutcome::Incorrect;
        state.mistake_count += 1;
    } else {
        state.outcomes[idx] = CharOutcome::Correct;
        state.correct_count += 1;
    }
    state.typed_count += 1;
    state.cursor += 1;

    let transition = if state.is_exhausted() {
        state.mode = Mode::Ended;
        Transition::Completed
    } else {
        Transition::Continue
    };

    StepOutcome {
        transition,
        mismatch,
    }
}

fn backward(state: &mut SessionState) -> StepOutcome {
    if state.cursor == 0 {
        return StepOutcome::rejected();
    }

    state.cursor -= 1;
    match state.outcomes[state.cursor] {
        CharOutcome::Correct => state.correct_count -= 1,
        CharOutcome::Incorrect => state.mistake_count -= 1,
        CharOutcome::Untouched => {}
    }
    state.outcomes[state.cursor] = CharOutcome::Untouched;
    state.typed_count -= 1;

    StepOutcome {
        transition: Transition::Continue,
        mismatch: false,
    }
}
