use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix of the PNG files handed to the desktop wallpaper facility.
const CACHED_WALLPAPER_PREFIX: &str = "wallpaper-";

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub preferences_file: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "dyncolor", "dyncolor")
            .context("Failed to get project directories")?;

        Self::with_dirs(proj_dirs.config_dir(), proj_dirs.cache_dir())
    }

    /// Builds a config rooted at explicit directories, creating them if needed.
    pub fn with_dirs(config_dir: &Path, cache_dir: &Path) -> Result<Self> {
        let config_dir = config_dir.to_path_buf();
        let cache_dir = cache_dir.to_path_buf();
        let preferences_file = config_dir.join("preferences.json");

        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

        Ok(Config {
            config_dir,
            cache_dir,
            preferences_file,
        })
    }

    pub fn cached_wallpaper_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.cache_dir.join(format!(
            "{}{}.png",
            CACHED_WALLPAPER_PREFIX,
            now.format("%Y%m%d%H%M%S%3f")
        ))
    }

    /// Removes every cached wallpaper except `keep`. Returns how many were removed.
    pub fn prune_cached_wallpapers(&self, keep: &Path) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            let is_cached_wallpaper = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(CACHED_WALLPAPER_PREFIX) && name.ends_with(".png"))
                .unwrap_or(false);

            if is_cached_wallpaper && path != keep {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    /// Whether this mode asks for the dark palette. `system_prefers_dark` is
    /// only consulted for [`ThemeMode::System`].
    pub fn is_dark(self, system_prefers_dark: impl FnOnce() -> bool) -> bool {
        match self {
            ThemeMode::System => system_prefers_dark(),
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThemeMode::System => "system",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        f.write_str(name)
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme `{other}` (expected system, light or dark)")),
        }
    }
}

/// User preferences kept between runs. Gallery selection is deliberately not
/// part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: ThemeMode,
    pub dynamic_color: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            dynamic_color: true,
        }
    }
}

/// Reads preferences, falling back to defaults when the file is missing or unreadable.
pub fn load_preferences(config: &Config) -> Preferences {
    let content = match fs::read_to_string(&config.preferences_file) {
        Ok(content) => content,
        Err(e) => {
            debug!("No preferences at {}: {}", config.preferences_file.display(), e);
            return Preferences::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(preferences) => preferences,
        Err(e) => {
            warn!(
                "Ignoring malformed preferences file {}: {}",
                config.preferences_file.display(),
                e
            );
            Preferences::default()
        }
    }
}

pub fn save_preferences(config: &Config, preferences: &Preferences) -> Result<()> {
    let content = serde_json::to_string_pretty(preferences)?;
    fs::write(&config.preferences_file, content)
        .with_context(|| format!("Failed to write {}", config.preferences_file.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_mode_parses_case_insensitively() {
        assert_eq!("Dark".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
        assert_eq!(" light ".parse::<ThemeMode>(), Ok(ThemeMode::Light));
        assert_eq!("system".parse::<ThemeMode>(), Ok(ThemeMode::System));
        assert!("sepia".parse::<ThemeMode>().is_err());
    }

    #[test]
    fn only_system_mode_asks_the_desktop() {
        assert!(ThemeMode::System.is_dark(|| true));
        assert!(!ThemeMode::System.is_dark(|| false));
        assert!(ThemeMode::Dark.is_dark(|| panic!("must not be consulted")));
        assert!(!ThemeMode::Light.is_dark(|| panic!("must not be consulted")));
    }

    #[test]
    fn partial_preferences_fill_in_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(prefs.theme, ThemeMode::Dark);
        assert!(prefs.dynamic_color);
    }
}
