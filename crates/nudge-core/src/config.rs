use crate::error::{NudgeError, Result};
use crate::history::DEFAULT_RECENT_LIMIT;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project settings stored in `.nudge/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// History database, relative to the project root unless absolute.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Number of events shown by `nudge history` when no limit is given.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Columns whose names start with this prefix may be renamed.
    #[serde(default = "default_rename_prefix")]
    pub rename_prefix: String,
    /// Skip the banner row that precedes the header row in input files.
    #[serde(default = "default_skip_banner")]
    pub skip_banner: bool,
}

fn default_database() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATABASE)
}

fn default_history_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_rename_prefix() -> String {
    "b".to_string()
}

fn default_skip_banner() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            history_limit: default_history_limit(),
            rename_prefix: default_rename_prefix(),
            skip_banner: default_skip_banner(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(NudgeError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but an uninitialized root yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(NudgeError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    /// Write the default config unless one exists. Returns true if written.
    pub fn init(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.database)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.rename_prefix.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "rename_prefix is empty: every feature column becomes renamable"
                    .to_string(),
            });
        }

        if self.history_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "history_limit is 0: `nudge history` will show nothing by default"
                    .to_string(),
            });
        }

        if self.database.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "database path is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
