use std::path::{Path, PathBuf};

use async_trait::async_trait;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::PassageError;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");
const BUILTIN_FILE: &str = "texts.json";

/// Used whenever a passage source fails or yields nothing typeable.
pub const DEFAULT_PASSAGE: &str =
    "The quick brown fox jumps over the lazy dog. Practice makes progress, one key at a time.";

/// Supplies the text for the next session.
#[async_trait]
pub trait PassageSource: Send + Sync {
    async fn get_passage(&self) -> Result<String, PassageError>;
}

/// Either `[{ "text": ... }]` or `["..."]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PassageEntry {
    Object { text: String },
    Plain(String),
}

impl PassageEntry {
    fn into_text(self) -> String {
        match self {
            PassageEntry::Object { text } | PassageEntry::Plain(text) => text,
        }
    }
}

/// Collapses whitespace runs into single spaces and trims the ends.
pub fn normalize_passage(text: &str) -> Option<String> {
    let normalized = text.split_whitespace().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Parses a passage file, keeping only entries with typeable text.
pub fn parse_passages(json: &str) -> Result<Vec<String>, PassageError> {
    let entries: Vec<PassageEntry> = serde_json::from_str(json)?;
    let passages: Vec<String> = entries
        .into_iter()
        .filter_map(|e| normalize_passage(&e.into_text()))
        .collect();

    if passages.is_empty() {
        return Err(PassageError::NoPassages);
    }
    Ok(passages)
}

fn pick_random(passages: &[String]) -> Result<String, PassageError> {
    passages
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or(PassageError::NoPassages)
}

/// Random passage from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFilePassageSource {
    path: PathBuf,
}

impl JsonFilePassageSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PassageSource for JsonFilePassageSource {
    async fn get_passage(&self) -> Result<String, PassageError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let passages = parse_passages(&json)?;
        pick_random(&passages)
    }
}

/// Random passage from the set compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPassageSource;

impl BuiltinPassageSource {
    pub fn passages() -> Result<Vec<String>, PassageError> {
        let json = PASSAGE_DIR
            .get_file(BUILTIN_FILE)
            .and_then(|f| f.contents_utf8())
            .ok_or(PassageError::MissingBuiltin(BUILTIN_FILE))?;
        parse_passages(json)
    }
}

#[async_trait]
impl PassageSource for BuiltinPassageSource {
    async fn get_passage(&self) -> Result<String, PassageError> {
        pick_random(&Self::passages()?)
    }
}

/// Always the same text, e.g. a prompt given on the command line. The text
/// is served exactly as given; only blank text is refused.
#[derive(Debug, Clone)]
pub struct StaticPassageSource {
    text: String,
}

impl StaticPassageSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl PassageSource for StaticPassageSource {
    async fn get_passage(&self) -> Result<String, PassageError> {
        if self.text.trim().is_empty() {
            return Err(PassageError::EmptyText);
        }
        Ok(self.text.clone())
    }
}
