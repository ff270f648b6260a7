use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app_dirs::AppDirs;

/// User preferences that survive between runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub allow_backspace: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_backspace: true,
        }
    }
}

pub trait SettingsStore {
    /// Never fails: a missing or corrupt store yields the defaults.
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), %err, "corrupt settings, using defaults");
            Settings::default()
        })
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}

/// Keeps settings in memory; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    slot: Rc<RefCell<Option<Settings>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(settings))),
        }
    }

    pub fn stored(&self) -> Option<Settings> {
        *self.slot.borrow()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.stored().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        *self.slot.borrow_mut() = Some(*settings);
        Ok(())
    }
}
