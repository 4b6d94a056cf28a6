use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window_secs: u64,
    pub sample_period_secs: u64,
    pub tick_ms: u64,
    pub zero_ticks_to_pause: u32,
    pub silence_secs_to_pause: u64,
    pub user_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_secs: 10,
            sample_period_secs: 10,
            tick_ms: 1000,
            zero_ticks_to_pause: 3,
            silence_secs_to_pause: 5,
            user_id: "defaultUser".to_string(),
        }
    }
}

impl Config {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_secs(self.sample_period_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn silence_to_pause(&self) -> Duration {
        Duration::from_secs(self.silence_secs_to_pause)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.window_secs == 0 {
            return Err(Error::Config("window_secs must be positive".into()));
        }
        if self.sample_period_secs == 0 {
            return Err(Error::Config("sample_period_secs must be positive".into()));
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be positive".into()));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::Config("user_id must not be empty".into()));
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "wpmtrack") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wpmtrack_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("cannot read config {}: {e}", self.path.display()),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
