use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const API_KEY_PREFIX: &str = "sk-";
const API_KEY_MIN_LEN: usize = 21;

/// User settings kept between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        non_blank(self.api_key.as_deref()).is_some()
    }

    /// Key shown with all but the last four characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        let key = non_blank(self.api_key.as_deref())?;
        let chars: Vec<char> = key.chars().collect();
        let visible = chars.len().min(4);
        let tail: String = chars[chars.len() - visible..].iter().collect();
        Some(format!("{}{}", "*".repeat(chars.len() - visible), tail))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// OpenAI-style key: `sk-` prefix and longer than 20 characters
pub fn is_valid_api_key(key: &str) -> bool {
    key.starts_with(API_KEY_PREFIX) && key.chars().count() >= API_KEY_MIN_LEN
}

/// Pick the API key: explicit flag, then environment, then stored settings.
pub fn resolve_api_key(
    explicit: Option<&str>,
    env: Option<&str>,
    settings: &Settings,
) -> Option<String> {
    non_blank(explicit)
        .or_else(|| non_blank(env))
        .or_else(|| non_blank(settings.api_key.as_deref()))
        .map(String::from)
}

pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

pub struct FileSettingsStore {
    base_dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Settings> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings: {:?}", path))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {:?}", path))?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create settings directory: {:?}", self.base_dir))?;
        let path = self.settings_path();
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&path, json).with_context(|| format!("Failed to write settings: {:?}", path))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.settings_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove settings: {:?}", path))?;
        }
        Ok(())
    }
}
