//! CLI Configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file holding the store
    pub snapshot: Option<String>,
    /// Institution used when a command does not name one
    pub institution_id: Option<String>,
    pub default_format: Option<String>,
    /// JSON engine settings file
    pub settings: Option<String>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self, String> {
        let path = Self::config_path(profile)?;
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            toml::from_str(&content).map_err(|e| e.to_string())
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf, String> {
        let path = Self::config_path(profile)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, content).map_err(|e| e.to_string())?;
        Ok(path)
    }

    /// Snapshot path, defaulting to `~/.nomos/store.json`
    pub fn snapshot_path(&self) -> Result<PathBuf, String> {
        match &self.snapshot {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(Self::home()?.join("store.json")),
        }
    }

    fn home() -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Cannot find home directory")?;
        Ok(home.join(".nomos"))
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf, String> {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(Self::home()?.join(filename))
    }
}
