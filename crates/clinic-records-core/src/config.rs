//! Store configuration, read from a TOML file.
//!
//! ```toml
//! schema = "combined"
//! local_path = "records.csv"
//! journal_path = "records.sync.db"
//! clinic_name = "Global Eye Center"
//! prune_after_update = false
//!
//! [remote]
//! spreadsheet_id = "1keLx7iBH92_..."
//! worksheet = "Sheet1"
//! strategy = "append"
//! token_env = "CLINIC_SHEETS_TOKEN"
//!
//! [session]
//! password = "change-me"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SchemaKind;
use crate::remote::{SheetsTarget, DEFAULT_SHEETS_BASE_URL};
use crate::sync::SyncStrategy;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing credentials: environment variable {0} is not set")]
    MissingToken(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub schema: SchemaKind,
    pub local_path: PathBuf,
    /// Defaults to the local path with a `.sync.db` extension
    pub journal_path: Option<PathBuf>,
    pub clinic_name: String,
    /// Drop a record from the local file once its doctor update reached the remote
    pub prune_after_update: bool,
    pub remote: Option<RemoteConfig>,
    pub session: SessionConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            schema: SchemaKind::default(),
            local_path: PathBuf::from("records.csv"),
            journal_path: None,
            clinic_name: "Clinic".to_string(),
            prune_after_update: false,
            remote: None,
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub strategy: SyncStrategy,
    pub base_url: String,
    /// Name of the environment variable holding the bearer token
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: "Sheet1".to_string(),
            strategy: SyncStrategy::default(),
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            token_env: "CLINIC_SHEETS_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Resolve the token from the environment.
    pub fn target(&self) -> ConfigResult<SheetsTarget> {
        let token = std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingToken(self.token_env.clone()))?;

        Ok(SheetsTarget {
            base_url: self.base_url.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
            worksheet: self.worksheet.clone(),
            token,
            timeout_secs: self.timeout_secs,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Literal passphrase; `None` disables the gate
    pub password: Option<String>,
}

impl StoreConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let mut config = Self::from_toml_str(&text)?;
                config.resolve_relative_to(path.parent().unwrap_or(Path::new("")));
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Relative file paths in a config file are relative to that file.
    fn resolve_relative_to(&mut self, base: &Path) {
        if self.local_path.is_relative() {
            self.local_path = base.join(&self.local_path);
        }
        if let Some(journal) = self.journal_path.as_mut() {
            if journal.is_relative() {
                *journal = base.join(&*journal);
            }
        }
    }

    pub fn journal_path(&self) -> PathBuf {
        self.journal_path
            .clone()
            .unwrap_or_else(|| self.local_path.with_extension("sync.db"))
    }

    /// Remote section, if it names a spreadsheet.
    pub fn active_remote(&self) -> Option<&RemoteConfig> {
        self.remote
            .as_ref()
            .filter(|r| !r.spreadsheet_id.trim().is_empty())
    }
}
