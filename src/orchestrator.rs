use std::io;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bot::{BotDriver, DeactivateReason, DEFAULT_BOT_INTERVAL};
use crate::clock::{Clock, SystemClock};
use crate::countdown::{Countdown, CountdownTick, DEFAULT_COUNTDOWN_SECS};
use crate::engine::{Keystroke, Transition, TypingEngine};
use crate::error::{BotRejected, ConfigError, RenderError};
use crate::metrics::{accuracy_percent, consistency, words_per_minute};
use crate::passage::{PassageSource, DEFAULT_PASSAGE};
use crate::render::{Renderer, SessionResults};
use crate::scheduler::{DueTask, Scheduler, TaskId, TaskKind};
use crate::session::{InputSource, Mode, SessionState};
use crate::settings::{Settings, SettingsStore};
use crate::sound::{NullSound, SoundCue, SoundGate, SoundPort};
use crate::timer::{LiveHud, TimerDriver, SAMPLE_INTERVAL};

pub const ERROR_PULSE: Duration = Duration::from_millis(300);
const FALLBACK_ADVISORY: &str = "Could not load a passage, using the built-in default.";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub countdown_secs: u32,
    pub bot_interval: Duration,
    pub sample_interval: Duration,
    pub error_pulse: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            bot_interval: DEFAULT_BOT_INTERVAL,
            sample_interval: SAMPLE_INTERVAL,
            error_pulse: ERROR_PULSE,
        }
    }
}

/// Collects collaborators; `build` fails if a required one is missing.
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: SessionConfig,
    passages: Option<Box<dyn PassageSource>>,
    renderer: Option<Box<dyn Renderer>>,
    settings_store: Option<Box<dyn SettingsStore>>,
    sound: Option<Box<dyn SoundPort>>,
    clock: Option<Box<dyn Clock>>,
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn passages(mut self, source: impl PassageSource + 'static) -> Self {
        self.passages = Some(Box::new(source));
        self
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn settings_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings_store = Some(Box::new(store));
        self
    }

    /// Optional; defaults to silence.
    pub fn sound(mut self, port: impl SoundPort + 'static) -> Self {
        self.sound = Some(Box::new(port));
        self
    }

    /// Optional; defaults to the system clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> Result<Orchestrator, ConfigError> {
        let passages = self.passages.ok_or(ConfigError::MissingPassageSource)?;
        let renderer = self.renderer.ok_or(ConfigError::MissingRenderer)?;
        let settings_store = self
            .settings_store
            .ok_or(ConfigError::MissingSettingsStore)?;

        let settings = settings_store.load();
        let config = self.config;

        Ok(Orchestrator {
            session: SessionState::new(""),
            engine: TypingEngine::new(settings.allow_backspace),
            scheduler: Scheduler::new(),
            timer: TimerDriver::new(config.sample_interval),
            countdown: Countdown::new(config.countdown_secs),
            bot: BotDriver::new(config.bot_interval),
            pulse: None,
            results: None,
            settings,
            passages,
            renderer,
            settings_store,
            sound: SoundGate::new(self.sound.unwrap_or_else(|| Box::new(NullSound))),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            config,
        })
    }
}

/// Owns the session and arbitrates between countdown, bot, and human input.
///
/// Everything runs on one logical thread: keystrokes arrive through
/// [`Orchestrator::handle_key`], deferred work through [`Orchestrator::poll`].
pub struct Orchestrator {
    config: SessionConfig,
    session: SessionState,
    engine: TypingEngine,
    scheduler: Scheduler,
    timer: TimerDriver,
    countdown: Countdown,
    bot: BotDriver,
    pulse: Option<TaskId>,
    results: Option<SessionResults>,
    settings: Settings,
    passages: Box<dyn PassageSource>,
    renderer: Box<dyn Renderer>,
    settings_store: Box<dyn SettingsStore>,
    sound: SoundGate,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

fn rendered(event: &'static str, result: Result<(), RenderError>) {
    if let Err(err) = result {
        warn!(event, %err, "renderer failed, continuing");
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    pub fn hud(&self) -> LiveHud {
        self.timer.hud()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_bot_running(&self) -> bool {
        self.bot.is_running()
    }

    pub fn is_countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// When the next deferred task is due, for event loops that sleep.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// How long until the next deferred task, measured on the session clock.
    pub fn time_until_next_task(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline().map(|due| due.saturating_sub(now))
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Marks a user gesture; sound may play from here on.
    pub fn unlock_sound(&mut self) {
        self.sound.unlock();
    }

    /// Cancels every driver, loads a new passage and starts a fresh session.
    pub async fn reset(&mut self, with_countdown: bool) {
        self.cancel_drivers(DeactivateReason::Reset);

        let (passage, advisory) = self.load_passage().await;

        // nothing may have been scheduled while loading, but be certain
        self.scheduler.cancel_all();
        self.session = SessionState::new(&passage);
        self.results = None;
        self.timer.clear();
        info!(chars = self.session.len(), with_countdown, "session reset");

        rendered(
            "session_reset",
            self.renderer.session_reset(self.session.passage()),
        );
        if let Some(message) = advisory {
            rendered("advisory", self.renderer.advisory(message));
        }
        rendered("draw", self.renderer.draw(self.session.snapshot()));
        rendered("hud", self.renderer.hud(self.timer.hud()));

        if with_countdown {
            self.begin_countdown();
        } else {
            rendered("human_input", self.renderer.human_input(true));
        }
    }

    async fn load_passage(&mut self) -> (String, Option<&'static str>) {
        match self.passages.get_passage().await {
            Ok(text) if !text.trim().is_empty() => (text, None),
            Ok(_) => {
                warn!("passage source returned empty text, using default passage");
                (DEFAULT_PASSAGE.to_string(), Some(FALLBACK_ADVISORY))
            }
            Err(err) => {
                warn!(%err, "failed to load passage, using default passage");
                (DEFAULT_PASSAGE.to_string(), Some(FALLBACK_ADVISORY))
            }
        }
    }

    fn begin_countdown(&mut self) {
        let now = self.clock.now();
        self.session.mode = Mode::Countdown;
        rendered("human_input", self.renderer.human_input(false));

        if let Some(tick) = self.countdown.start(&mut self.scheduler, now) {
            debug!(length = self.countdown.length(), "countdown started");
            self.show_tick(tick);
        }
    }

    fn show_tick(&mut self, tick: CountdownTick) {
        rendered("countdown_tick", self.renderer.countdown_tick(tick));
        self.sound.play(SoundCue::CountdownTick);

        if tick == CountdownTick::Go {
            // eligible for play; the first keystroke activates
            if self.session.mode == Mode::Countdown {
                self.session.mode = Mode::Idle;
            }
            rendered("human_input", self.renderer.human_input(true));
            info!("countdown finished");
        }
    }

    fn cancel_drivers(&mut self, reason: DeactivateReason) {
        self.bot.deactivate(&mut self.scheduler, reason);
        if self.countdown.cancel(&mut self.scheduler) {
            debug!("countdown aborted");
        }
        self.timer.stop(&mut self.scheduler);
        if let Some(id) = self.pulse.take() {
            self.scheduler.cancel(id);
        }
        self.scheduler.cancel_all();
    }

    /// Keystroke from the person at the keyboard. Refused while the bot
    /// owns the session.
    pub fn handle_key(&mut self, key: Keystroke) -> Transition {
        self.sound.unlock();
        if self.bot.is_running() || self.session.input_source() == InputSource::Bot {
            return Transition::Rejected;
        }
        let now = self.clock.now();
        self.dispatch(key, now)
    }

    fn dispatch(&mut self, key: Keystroke, now: Duration) -> Transition {
        if self.session.mode == Mode::Idle && matches!(key, Keystroke::Char(_)) {
            self.activate(now);
        }

        let step = self.engine.step(&mut self.session, key);
        if step.transition == Transition::Rejected {
            return Transition::Rejected;
        }

        self.sound.play(SoundCue::KeyPress);
        if step.mismatch {
            self.start_pulse(now);
        }
        rendered("draw", self.renderer.draw(self.session.snapshot()));
        let hud = self.timer.track_accuracy(&self.session);
        rendered("hud", self.renderer.hud(hud));

        if step.transition == Transition::Completed {
            self.finish(now);
        }
        step.transition
    }

    /// Idle to Active, once per session, on the first accepted keystroke.
    fn activate(&mut self, now: Duration) {
        if self.session.mode != Mode::Idle || self.session.is_empty() {
            return;
        }
        self.session.mode = Mode::Active;
        self.session.started_at = Some(now);
        self.timer.start(&mut self.scheduler, now);
        debug!(source = %self.session.input_source(), "session active");
    }

    fn start_pulse(&mut self, now: Duration) {
        if self.pulse.is_some() {
            return;
        }
        self.pulse = Some(
            self.scheduler
                .schedule_once(TaskKind::ErrorPulseEnd, now + self.config.error_pulse),
        );
        rendered("error_pulse", self.renderer.error_pulse(true));
    }

    /// Finishes the session. Safe to call any number of times; only the
    /// first call on an active session does anything.
    pub fn end(&mut self) -> bool {
        let now = self.clock.now();
        self.finish(now)
    }

    fn finish(&mut self, now: Duration) -> bool {
        let completing = match self.session.mode {
            Mode::Active => true,
            Mode::Ended => self.results.is_none(),
            Mode::Idle | Mode::Countdown => false,
        };
        if !completing {
            return false;
        }

        self.timer.stop(&mut self.scheduler);
        if let Some(id) = self.pulse.take() {
            self.scheduler.cancel(id);
            rendered("error_pulse", self.renderer.error_pulse(false));
        }
        let bot_was_running = self
            .bot
            .deactivate(&mut self.scheduler, DeactivateReason::SessionEnded);
        self.session.mode = Mode::Ended;

        let results = self.compute_results(now);
        info!(
            net_wpm = results.net_wpm,
            accuracy = results.accuracy_percent,
            elapsed = results.elapsed_seconds,
            bot = bot_was_running,
            "session ended"
        );

        rendered("human_input", self.renderer.human_input(false));
        rendered("session_ended", self.renderer.session_ended(&results));
        self.results = Some(results);
        true
    }

    fn compute_results(&self, now: Duration) -> SessionResults {
        let elapsed = self.session.elapsed_secs(now);
        let samples = self.timer.samples().to_vec();

        SessionResults {
            net_wpm: words_per_minute(self.session.correct_count(), elapsed),
            gross_wpm: words_per_minute(self.session.typed_count(), elapsed),
            accuracy_percent: accuracy_percent(
                self.session.correct_count(),
                self.session.typed_count(),
            ),
            elapsed_seconds: elapsed,
            typed_count: self.session.typed_count(),
            correct_count: self.session.correct_count(),
            mistake_count: self.session.mistake_count(),
            consistency: consistency(&samples),
            wpm_samples: samples,
        }
    }

    /// Resets without countdown and lets the bot type the new passage.
    pub async fn activate_bot(&mut self) -> Result<(), BotRejected> {
        self.sound.unlock();
        if let Err(rejected) = self
            .bot
            .check_activation(&self.session, self.countdown.is_running())
        {
            info!(%rejected, "bot activation rejected");
            return Err(rejected);
        }

        self.reset(false).await;

        let now = self.clock.now();
        self.session.input_source = InputSource::Bot;
        rendered("human_input", self.renderer.human_input(false));
        self.activate(now);
        self.bot.start(&mut self.scheduler, now);
        info!(interval_ms = self.bot.interval().as_millis() as u64, "bot activated");
        Ok(())
    }

    /// Stops the bot. A user stop hands the session back to the keyboard.
    pub fn deactivate_bot(&mut self, reason: DeactivateReason) -> bool {
        if !self.bot.deactivate(&mut self.scheduler, reason) {
            return false;
        }
        if reason.restores_human_input() {
            self.session.input_source = InputSource::Human;
            if self.session.mode != Mode::Ended {
                rendered("human_input", self.renderer.human_input(true));
            }
        }
        true
    }

    fn bot_step(&mut self, now: Duration) {
        if self.session.mode != Mode::Active || self.session.input_source != InputSource::Bot {
            self.bot
                .deactivate(&mut self.scheduler, DeactivateReason::SessionEnded);
            return;
        }
        match BotDriver::next_keystroke(&self.session) {
            Some(key) => {
                self.dispatch(key, now);
            }
            None => {
                self.finish(now);
            }
        }
    }

    /// Runs every task that is due by the clock's current time.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        self.advance_to(now);
    }

    /// Runs due tasks in order, each at its own due time.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(task) = self.scheduler.pop_due(now) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: DueTask) {
        match task.kind {
            TaskKind::TimerSample => {
                if !self.timer.owns(task.id) {
                    return;
                }
                if self.session.mode != Mode::Active {
                    self.timer.stop(&mut self.scheduler);
                    return;
                }
                let hud = self.timer.sample(&self.session, task.due);
                rendered("hud", self.renderer.hud(hud));
            }
            TaskKind::CountdownTick => {
                if let Some(tick) = self.countdown.on_tick(&mut self.scheduler, task.id) {
                    self.show_tick(tick);
                }
            }
            TaskKind::BotStep => {
                if self.bot.owns(task.id) {
                    self.bot_step(task.due);
                }
            }
            TaskKind::ErrorPulseEnd => {
                if self.pulse == Some(task.id) {
                    self.pulse = None;
                    rendered("error_pulse", self.renderer.error_pulse(false));
                }
            }
        }
    }

    /// Changes and persists the backspace preference.
    pub fn set_allow_backspace(&mut self, allow: bool) -> io::Result<()> {
        self.settings.allow_backspace = allow;
        self.engine.set_allow_backspace(allow);
        self.settings_store.save(&self.settings).inspect_err(|err| {
            warn!(%err, "failed to save settings");
        })
    }
}
