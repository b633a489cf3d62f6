//! Global synckit configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use synckit_core::date_range::DEFAULT_SYNC_DAYS;

static DEFAULT_LOCAL_PATH: &str = "~/.local/share/synckit/local.json";
static DEFAULT_EXTERNAL_PATH: &str = "~/.local/share/synckit/external.json";

fn default_local_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOCAL_PATH)
}

fn default_external_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXTERNAL_PATH)
}

fn default_sync_days() -> i64 {
    DEFAULT_SYNC_DAYS
}

/// Configuration at ~/.config/synckit/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// JSON file holding the application's own calendars and events
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// JSON snapshot of the external calendar store
    #[serde(default = "default_external_path")]
    pub external_path: PathBuf,

    /// Days fetched on each side of today when no range is given
    #[serde(default = "default_sync_days")]
    pub sync_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            local_path: default_local_path(),
            external_path: default_external_path(),
            sync_days: default_sync_days(),
        }
    }
}

impl SyncConfig {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("synckit");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or the default location. A missing default file is
    /// created with every option commented out.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::default_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                }
                p
            }
        };

        tracing::debug!(path = %config_path.display(), "loading config");

        let config: SyncConfig = Config::builder()
            .add_source(File::from(config_path.clone()).required(path.is_some()))
            .build()
            .with_context(|| format!("Failed to read config at {}", config_path.display()))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse config at {}", config_path.display()))?;

        if config.sync_days <= 0 {
            anyhow::bail!("sync_days must be positive, got {}", config.sync_days);
        }

        Ok(config)
    }

    pub fn local_path(&self) -> PathBuf {
        expand(&self.local_path)
    }

    pub fn external_path(&self) -> PathBuf {
        expand(&self.external_path)
    }

    fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# synckit configuration

# Where the application's calendars and events are stored:
# local_path = \"{}\"

# Snapshot of the external calendar store:
# external_path = \"{}\"

# Days to sync on each side of today:
# sync_days = {}
",
            DEFAULT_LOCAL_PATH, DEFAULT_EXTERNAL_PATH, DEFAULT_SYNC_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Could not create config directory {}", parent.display())
            })?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Could not write config file {}", path.display()))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
