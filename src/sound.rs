use std::io::{self, Write};

use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "camelCase")]
pub enum SoundCue {
    KeyPress,
    CountdownTick,
}

/// Fire-and-forget audio output.
pub trait SoundPort {
    fn play(&mut self, cue: SoundCue);

    /// Ports that may only play after a user gesture return `true`.
    fn requires_unlock(&self) -> bool {
        true
    }
}

/// Silence, for when sound is disabled or unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSound;

impl SoundPort for NullSound {
    fn play(&mut self, _cue: SoundCue) {}

    fn requires_unlock(&self) -> bool {
        false
    }
}

/// Rings the terminal bell for countdown ticks. Key presses stay quiet.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl SoundPort for TerminalBell {
    fn play(&mut self, cue: SoundCue) {
        if cue == SoundCue::CountdownTick {
            let mut out = io::stdout();
            let _ = out.write_all(b"\x07").and_then(|_| out.flush());
        }
    }

    fn requires_unlock(&self) -> bool {
        false
    }
}

/// Drops every cue until unlocked by a user gesture.
pub struct SoundGate {
    port: Box<dyn SoundPort>,
    unlocked: bool,
}

impl SoundGate {
    pub fn new(port: Box<dyn SoundPort>) -> Self {
        let unlocked = !port.requires_unlock();
        Self { port, unlocked }
    }

    pub fn unlock(&mut self) {
        self.unlocked = true;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn play(&mut self, cue: SoundCue) {
        if self.unlocked {
            self.port.play(cue);
        }
    }
}

impl Default for SoundGate {
    fn default() -> Self {
        Self::new(Box::new(NullSound))
    }
}
