use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotedeckError, Result};
use crate::store::DEFAULT_STORAGE_KEY;

pub const CONFIG_FILE: &str = "config.yaml";
const DATA_DIR_NAME: &str = ".notedeck";

pub const ENV_BACKEND: &str = "NOTEDECK_BACKEND";
pub const ENV_LOG: &str = "NOTEDECK_LOG";

/// Where the notes collection is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `<data-dir>/<key>.json`
    #[default]
    File,
    /// `<data-dir>/notes.db`
    Sqlite,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::File => write!(f, "file"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(Backend::File),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(format!("Invalid backend: {}", s)),
        }
    }
}

/// Settings read from `<data-dir>/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub storage_key: String,
    /// `tracing` filter directive, e.g. "warn" or "notedeck=debug".
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load the config file from `data_dir` (defaults when absent) and apply
    /// environment overrides.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(data_dir)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn load_file(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            NotedeckError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if config.storage_key.trim().is_empty() {
            return Err(NotedeckError::Config(format!(
                "storage_key in {} cannot be empty",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Apply `NOTEDECK_BACKEND` / `NOTEDECK_LOG` using `lookup` to read them.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.trim().is_empty()) {
            self.backend = backend.parse().map_err(NotedeckError::Config)?;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        Ok(())
    }

}

/// `~/.notedeck` in the user's home directory.
pub fn default_data_dir() -> Result<PathBuf> {
    data_dir_in(dirs::home_dir())
}

fn data_dir_in(home: Option<PathBuf>) -> Result<PathBuf> {
    home.filter(|home| !home.as_os_str().is_empty())
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or_else(|| {
            NotedeckError::Config(
                "no home directory found; pass --data-dir or set NOTEDECK_DIR".to_string(),
            )
        })
}
