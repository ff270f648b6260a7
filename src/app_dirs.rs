use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typestorm";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn settings_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("typestorm_settings.json"))
    }

    /// Log file location; prefers `~/.local/state` the way XDG tools do.
    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
                .join("typestorm.log");
        }
        Self::project()
            .map(|pd| pd.data_local_dir().join("typestorm.log"))
            .unwrap_or_else(|| PathBuf::from("typestorm.log"))
    }
}
