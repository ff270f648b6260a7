use std::cell::RefCell;
use std::rc::Rc;

use crate::countdown::CountdownTick;
use crate::error::RenderError;
use crate::render::{Renderer, SessionResults};
use crate::session::{CharOutcome, Snapshot};
use crate::timer::LiveHud;

/// Everything the terminal front-end paints, fed by [`ViewRenderer`].
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub passage: Vec<char>,
    pub outcomes: Vec<CharOutcome>,
    pub cursor: usize,
    pub progress_percent: u8,
    pub hud: LiveHud,
    pub countdown: Option<CountdownTick>,
    pub advisory: Option<String>,
    pub error_pulse: bool,
    pub human_input: bool,
    pub results: Option<SessionResults>,
    // status shown in the help line, set by the app loop
    pub allow_backspace: bool,
    pub bot_running: bool,
}

/// Renderer that records into a shared [`ViewModel`].
#[derive(Debug, Clone, Default)]
pub struct ViewRenderer {
    model: Rc<RefCell<ViewModel>>,
}

impl ViewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Rc<RefCell<ViewModel>> {
        Rc::clone(&self.model)
    }

    fn with_model(&self, f: impl FnOnce(&mut ViewModel)) -> Result<(), RenderError> {
        let mut model = self
            .model
            .try_borrow_mut()
            .map_err(|_| RenderError::Unavailable)?;
        f(&mut model);
        Ok(())
    }
}

impl Renderer for ViewRenderer {
    fn session_reset(&mut self, passage: &[char]) -> Result<(), RenderError> {
        self.with_model(|m| {
            m.passage = passage.to_vec();
            m.outcomes = vec![CharOutcome::Untouched; passage.len()];
            m.cursor = 0;
            m.progress_percent = 0;
            m.hud = LiveHud::default();
            m.countdown = None;
            m.advisory = None;
            m.error_pulse = false;
            m.results = None;
        })
    }

    fn draw(&mut self, snapshot: Snapshot<'_>) -> Result<(), RenderError> {
        self.with_model(|m| {
            m.outcomes.clear();
            m.outcomes.extend_from_slice(snapshot.outcomes);
            m.cursor = snapshot.cursor;
            m.progress_percent = snapshot.progress_percent;
            if m.countdown == Some(CountdownTick::Go) && snapshot.cursor > 0 {
                m.countdown = None;
            }
        })
    }

    fn countdown_tick(&mut self, tick: CountdownTick) -> Result<(), RenderError> {
        self.with_model(|m| m.countdown = Some(tick))
    }

    fn session_ended(&mut self, results: &SessionResults) -> Result<(), RenderError> {
        self.with_model(|m| {
            m.results = Some(results.clone());
            m.countdown = None;
            m.error_pulse = false;
        })
    }

    fn hud(&mut self, hud: LiveHud) -> Result<(), RenderError> {
        self.with_model(|m| m.hud = hud)
    }

    fn advisory(&mut self, message: &str) -> Result<(), RenderError> {
        self.with_model(|m| m.advisory = Some(message.to_string()))
    }

    fn error_pulse(&mut self, active: bool) -> Result<(), RenderError> {
        self.with_model(|m| m.error_pulse = active)
    }

    fn human_input(&mut self, enabled: bool) -> Result<(), RenderError> {
        self.with_model(|m| m.human_input = enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_reset_clears_previous_session() {
        let mut renderer = ViewRenderer::new();
        renderer.advisory("fallback").unwrap();
        renderer.countdown_tick(CountdownTick::Count(2)).unwrap();

        renderer.session_reset(&['h', 'i']).unwrap();

        let model = renderer.model();
        let model = model.borrow();
        assert_eq!(model.passage, vec!['h', 'i']);
        assert_eq!(model.outcomes, vec![CharOutcome::Untouched; 2]);
        assert_eq!(model.advisory, None);
        assert_eq!(model.countdown, None);
    }

    #[test]
    fn test_draw_copies_snapshot_and_clears_go() {
        let mut renderer = ViewRenderer::new();
        renderer.session_reset(&['a', 'b']).unwrap();
        renderer.countdown_tick(CountdownTick::Go).unwrap();

        let outcomes = [CharOutcome::Correct, CharOutcome::Untouched];
        renderer
            .draw(Snapshot {
                cursor: 1,
                outcomes: &outcomes,
                progress_percent: 50,
            })
            .unwrap();

        let model = renderer.model();
        let model = model.borrow();
        assert_eq!(model.cursor, 1);
        assert_eq!(model.progress_percent, 50);
        assert_eq!(model.outcomes[0], CharOutcome::Correct);
        assert_eq!(model.countdown, None);
    }

    #[test]
    fn test_busy_model_reports_unavailable() {
        let mut renderer = ViewRenderer::new();
        let model = renderer.model();
        let _held = model.borrow();

        assert_matches!(renderer.error_pulse(true), Err(RenderError::Unavailable));
    }
}
