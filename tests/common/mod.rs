// Shared doubles for driving the orchestrator headlessly.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use typestorm::clock::ManualClock;
use typestorm::countdown::CountdownTick;
use typestorm::error::{PassageError, RenderError};
use typestorm::orchestrator::{Orchestrator, SessionConfig};
use typestorm::passage::{PassageSource, StaticPassageSource};
use typestorm::render::{Renderer, SessionResults};
use typestorm::session::Snapshot;
use typestorm::settings::{MemorySettingsStore, Settings};
use typestorm::sound::{SoundCue, SoundPort};
use typestorm::timer::LiveHud;
use typestorm::{Keystroke, Transition};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Reset(String),
    Draw { cursor: usize, progress: u8 },
    Countdown(CountdownTick),
    Ended(SessionResults),
    Hud(LiveHud),
    Advisory(String),
    Pulse(bool),
    HumanInput(bool),
}

#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub events: Rc<RefCell<Vec<Event>>>,
}

impl RecordingRenderer {
    fn push(&self, event: Event) -> Result<(), RenderError> {
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

impl Renderer for RecordingRenderer {
    fn session_reset(&mut self, passage: &[char]) -> Result<(), RenderError> {
        self.push(Event::Reset(passage.iter().collect()))
    }

    fn draw(&mut self, snapshot: Snapshot<'_>) -> Result<(), RenderError> {
        self.push(Event::Draw {
            cursor: snapshot.cursor,
            progress: snapshot.progress_percent,
        })
    }

    fn countdown_tick(&mut self, tick: CountdownTick) -> Result<(), RenderError> {
        self.push(Event::Countdown(tick))
    }

    fn session_ended(&mut self, results: &SessionResults) -> Result<(), RenderError> {
        self.push(Event::Ended(results.clone()))
    }

    fn hud(&mut self, hud: LiveHud) -> Result<(), RenderError> {
        self.push(Event::Hud(hud))
    }

    fn advisory(&mut self, message: &str) -> Result<(), RenderError> {
        self.push(Event::Advisory(message.to_string()))
    }

    fn error_pulse(&mut self, active: bool) -> Result<(), RenderError> {
        self.push(Event::Pulse(active))
    }

    fn human_input(&mut self, enabled: bool) -> Result<(), RenderError> {
        self.push(Event::HumanInput(enabled))
    }
}

/// A renderer whose target is gone: every call fails.
pub struct UnavailableRenderer;

impl Renderer for UnavailableRenderer {
    fn session_reset(&mut self, _passage: &[char]) -> Result<(), RenderError> {
        Err(RenderError::Unavailable)
    }

    fn draw(&mut self, _snapshot: Snapshot<'_>) -> Result<(), RenderError> {
        Err(RenderError::Unavailable)
    }

    fn countdown_tick(&mut self, _tick: CountdownTick) -> Result<(), RenderError> {
        Err(RenderError::Unavailable)
    }

    fn session_ended(&mut self, _results: &SessionResults) -> Result<(), RenderError> {
        Err(RenderError::Unavailable)
    }

    fn hud(&mut self, _hud: LiveHud) -> Result<(), RenderError> {
        Err(RenderError::Unavailable)
    }
}

#[derive(Clone, Default)]
pub struct RecordingSound {
    pub played: Rc<RefCell<Vec<SoundCue>>>,
}

impl SoundPort for RecordingSound {
    fn play(&mut self, cue: SoundCue) {
        self.played.borrow_mut().push(cue);
    }
}

pub struct FailingPassageSource;

#[async_trait]
impl PassageSource for FailingPassageSource {
    async fn get_passage(&self) -> Result<String, PassageError> {
        Err(PassageError::NoPassages)
    }
}

pub struct Harness {
    pub orch: Orchestrator,
    pub clock: ManualClock,
    pub events: Rc<RefCell<Vec<Event>>>,
    pub sounds: Rc<RefCell<Vec<SoundCue>>>,
    pub store: MemorySettingsStore,
}

pub fn harness(passage: &str) -> Harness {
    harness_with(
        StaticPassageSource::new(passage),
        Settings::default(),
        SessionConfig::default(),
    )
}

pub fn harness_with(
    source: impl PassageSource + 'static,
    settings: Settings,
    config: SessionConfig,
) -> Harness {
    let clock = ManualClock::new();
    let renderer = RecordingRenderer::default();
    let sound = RecordingSound::default();
    let store = MemorySettingsStore::with(settings);

    let orch = Orchestrator::builder()
        .config(config)
        .passages(source)
        .renderer(renderer.clone())
        .settings_store(store.clone())
        .sound(sound.clone())
        .clock(clock.clone())
        .build()
        .expect("all collaborators supplied");

    Harness {
        orch,
        clock,
        events: renderer.events,
        sounds: sound.played,
        store,
    }
}

impl Harness {
    pub fn type_str(&mut self, text: &str) -> Vec<Transition> {
        text.chars()
            .map(|c| self.orch.handle_key(Keystroke::Char(c)))
            .collect()
    }

    pub fn backspace(&mut self) -> Transition {
        self.orch.handle_key(Keystroke::Backspace)
    }

    /// Moves the clock forward and runs whatever became due.
    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        self.orch.poll();
    }

    pub fn ended(&self) -> Vec<SessionResults> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Ended(results) => Some(results.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn countdown_ticks(&self) -> Vec<CountdownTick> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Countdown(tick) => Some(*tick),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }
}
