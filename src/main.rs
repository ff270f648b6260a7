use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use typestorm::{
    app_dirs::AppDirs,
    bot::DeactivateReason,
    logging,
    orchestrator::{Orchestrator, SessionConfig},
    passage::{BuiltinPassageSource, JsonFilePassageSource, StaticPassageSource},
    runtime::{AppEvent, CrosstermEventSource, Runner},
    settings::FileSettingsStore,
    sound::{NullSound, TerminalBell},
    ui::ViewRenderer,
    Keystroke,
};

const POLL_INTERVAL_MS: u64 = 100;

/// typing speed trainer with a countdown start, live wpm, and a demo bot
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing speed trainer: type the passage as fast and accurately as you can, watch live WPM, or let the bot demonstrate a perfect run."
)]
pub struct Cli {
    /// custom passage to type
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// JSON file of passages, either [{"text": ...}] or ["..."]
    #[clap(long)]
    passages: Option<PathBuf>,

    /// seconds to count down before typing is accepted
    #[clap(short = 'c', long, default_value_t = 3)]
    countdown: u32,

    /// start every test without a countdown
    #[clap(long)]
    no_countdown: bool,

    /// milliseconds between bot keystrokes
    #[clap(long, default_value_t = 50)]
    bot_interval_ms: u64,

    /// keep the terminal bell quiet
    #[clap(long)]
    no_sound: bool,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            countdown_secs: self.countdown,
            bot_interval: Duration::from_millis(self.bot_interval_ms),
            ..SessionConfig::default()
        }
    }

    fn with_countdown(&self) -> bool {
        !self.no_countdown && self.countdown > 0
    }

    fn build_orchestrator(&self, renderer: ViewRenderer) -> Result<Orchestrator, Box<dyn Error>> {
        let builder = Orchestrator::builder()
            .config(self.session_config())
            .renderer(renderer)
            .settings_store(FileSettingsStore::new());

        let builder = if self.no_sound {
            builder.sound(NullSound)
        } else {
            builder.sound(TerminalBell)
        };

        let builder = match (&self.prompt, &self.passages) {
            (Some(prompt), _) => builder.passages(StaticPassageSource::new(prompt.clone())),
            (None, Some(path)) => builder.passages(JsonFilePassageSource::new(path)),
            (None, None) => builder.passages(BuiltinPassageSource),
        };

        Ok(builder.build()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    NewTest,
    ToggleBot,
    ToggleBackspace,
    Type(Keystroke),
    Ignore,
}

fn key_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('b') if ctrl => Action::ToggleBackspace,
        KeyCode::Char(_) if ctrl => Action::Ignore,
        KeyCode::Enter => Action::NewTest,
        KeyCode::Tab => Action::ToggleBot,
        KeyCode::Backspace => Action::Type(Keystroke::Backspace),
        KeyCode::Char(c) => Action::Type(Keystroke::Char(c)),
        _ => Action::Ignore,
    }
}

pub struct App {
    orchestrator: Orchestrator,
    renderer: ViewRenderer,
    with_countdown: bool,
}

impl App {
    fn new(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let renderer = ViewRenderer::new();
        Ok(Self {
            orchestrator: cli.build_orchestrator(renderer.clone())?,
            renderer,
            with_countdown: cli.with_countdown(),
        })
    }

    fn sync_status(&self) {
        let model = self.renderer.model();
        let mut model = model.borrow_mut();
        model.allow_backspace = self.orchestrator.settings().allow_backspace;
        model.bot_running = self.orchestrator.is_bot_running();
    }

    fn advise(&self, message: String) {
        self.renderer.model().borrow_mut().advisory = Some(message);
    }

    /// Returns `false` when the user asked to quit.
    async fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::NewTest => {
                self.orchestrator.unlock_sound();
                self.orchestrator.reset(self.with_countdown).await;
            }
            Action::ToggleBot => {
                if self.orchestrator.is_bot_running() {
                    self.orchestrator.deactivate_bot(DeactivateReason::Stopped);
                } else if let Err(rejected) = self.orchestrator.activate_bot().await {
                    self.advise(format!("bot unavailable: {rejected}"));
                }
            }
            Action::ToggleBackspace => {
                let allow = !self.orchestrator.settings().allow_backspace;
                if let Err(err) = self.orchestrator.set_allow_backspace(allow) {
                    self.advise(format!("could not save settings: {err}"));
                }
            }
            Action::Type(key) => {
                self.orchestrator.handle_key(key);
            }
            Action::Ignore => {}
        }
        true
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(err) = logging::init_file_logging(&AppDirs::log_path()) {
        eprintln!("logging disabled: {err}");
    }
    info!(?cli, "starting");

    let mut app = App::new(&cli)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref err) = result {
        warn!(%err, "exited with error");
    }
    result
}

async fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(POLL_INTERVAL_MS),
    );

    app.orchestrator.reset(app.with_countdown).await;

    loop {
        app.sync_status();
        let model = app.renderer.model();
        terminal.draw(|f| f.render_widget(&*model.borrow(), f.area()))?;

        match runner.step(app.orchestrator.time_until_next_task()) {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Closed => {
                warn!("terminal input closed, exiting");
                break;
            }
            AppEvent::Key(key) => {
                if !app.handle(key_action(key)).await {
                    break;
                }
            }
        }

        app.orchestrator.poll();
    }

    Ok(())
}
