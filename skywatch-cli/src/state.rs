use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Last successfully searched place, used to pre-fill the next `show`
/// invocation. Presentation state only; the core never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastSearch {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl LastSearch {
    /// Load the stored search, or `None` when nothing was saved yet.
    pub fn load() -> Result<Option<Self>> {
        let path = Self::file_path()?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read last-search file: {}", path.display()))?;

        let last: LastSearch = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse last-search file: {}", path.display()))?;

        Ok(Some(last))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize last search")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write last-search file: {}", path.display()))?;

        Ok(())
    }

    fn file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skywatch", "skywatch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("last_search.toml"))
    }
}
