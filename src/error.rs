use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PassageError {
    #[error("failed to read passages: {0}")]
    Io(#[from] io::Error),
    #[error("malformed passage data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("passage list is empty")]
    NoPassages,
    #[error("passage text is empty")]
    EmptyText,
    #[error("built-in passage file {0} is missing")]
    MissingBuiltin(&'static str),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render target unavailable")]
    Unavailable,
}

/// A collaborator was not supplied when building the orchestrator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no passage source configured")]
    MissingPassageSource,
    #[error("no renderer configured")]
    MissingRenderer,
    #[error("no settings store configured")]
    MissingSettingsStore,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BotRejected {
    #[error("a session is already active")]
    SessionActive,
    #[error("the bot is already running")]
    AlreadyRunning,
    #[error("a countdown is in progress")]
    CountdownInProgress,
}
