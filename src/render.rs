use serde::Serialize;

use crate::countdown::CountdownTick;
use crate::error::RenderError;
use crate::metrics::WpmSample;
use crate::session::Snapshot;
use crate::timer::LiveHud;

/// Final figures of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResults {
    /// From correct characters only.
    pub net_wpm: u32,
    /// From every judged keystroke.
    pub gross_wpm: u32,
    pub accuracy_percent: u32,
    pub elapsed_seconds: f64,
    pub typed_count: usize,
    pub correct_count: usize,
    pub mistake_count: usize,
    pub consistency: f64,
    pub wpm_samples: Vec<WpmSample>,
}

/// Paints session state. Every call may fail; the core logs and carries on.
pub trait Renderer {
    fn session_reset(&mut self, passage: &[char]) -> Result<(), RenderError>;

    fn draw(&mut self, snapshot: Snapshot<'_>) -> Result<(), RenderError>;

    fn countdown_tick(&mut self, tick: CountdownTick) -> Result<(), RenderError>;

    fn session_ended(&mut self, results: &SessionResults) -> Result<(), RenderError>;

    fn hud(&mut self, _hud: LiveHud) -> Result<(), RenderError> {
        Ok(())
    }

    /// Transient notice, e.g. that a fallback passage is in use.
    fn advisory(&mut self, _message: &str) -> Result<(), RenderError> {
        Ok(())
    }

    fn error_pulse(&mut self, _active: bool) -> Result<(), RenderError> {
        Ok(())
    }

    /// Whether keystrokes from the person at the keyboard are accepted.
    fn human_input(&mut self, _enabled: bool) -> Result<(), RenderError> {
        Ok(())
    }
}
