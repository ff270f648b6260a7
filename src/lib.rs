// Library surface for the binary, headless drivers, and integration tests.
pub mod app_dirs;
pub mod bot;
pub mod clock;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod passage;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sound;
pub mod timer;
pub mod ui;

pub use engine::{Keystroke, Transition};
pub use orchestrator::{Orchestrator, SessionConfig};
