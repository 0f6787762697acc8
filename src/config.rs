use std::{env, fs, path::PathBuf};

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotasError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Directory where rendered print documents are spooled
    pub spool_dir: PathBuf,

    /// Width of content previews in listings, in characters
    pub preview_width: usize,

    /// Default editor command
    pub editor_command: Option<String>,

    /// Command a spooled document is handed to, e.g. `lp`
    pub print_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
            preview_width: 80,
            editor_command: None,
            print_command: None,
        }
    }
}

fn default_spool_dir() -> PathBuf {
    match ProjectDirs::from("", "", "notas") {
        Some(dirs) => dirs.data_dir().join("prints"),
        None => env::temp_dir().join("notas-prints"),
    }
}

impl Config {
    /// Loads the configuration from the given path, or from the platform
    /// config directory when no path is supplied. A missing file yields
    /// the defaults; an unreadable or malformed file is an error.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path.or_else(Self::default_path) {
            Some(path) => path,
            None => {
                warn!("No config directory available, using built-in defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        debug!("Loading config from {}", path.display());
        let raw = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| NotasError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "notas").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Resolves the editor to launch: the configured command, then
    /// `$EDITOR`, then a platform default.
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            // Prefer whichever common editor is actually installed
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
