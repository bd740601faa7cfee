// Configuration module
// Holds the extension settings and describes which keys changed

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Setting that selects a custom GIF
pub const CUSTOM_GIF_PATH: &str = "vibecat.customGifPath";

/// Flat, editor style settings (`"section.key": value`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Custom GIF to show instead of the bundled one
    #[serde(rename = "vibecat.customGifPath", default)]
    custom_gif_path: Option<String>,

    /// Settings owned by other extensions, kept so they can be changed too
    #[serde(flatten)]
    other: BTreeMap<String, Value>,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// The custom GIF path, if set to something other than whitespace
    pub fn custom_gif_path(&self) -> Option<&str> {
        self.custom_gif_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
    }

    /// Set or clear one key and report it as changed
    pub fn set(&mut self, key: &str, value: Option<String>) -> ConfigurationChange {
        if key == CUSTOM_GIF_PATH {
            self.custom_gif_path = value;
        } else {
            match value {
                Some(value) => {
                    self.other.insert(key.to_string(), Value::String(value));
                }
                None => {
                    self.other.remove(key);
                }
            }
        }
        ConfigurationChange::new([key])
    }
}

/// A set of settings keys that changed together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationChange {
    keys: Vec<String>,
}

impl ConfigurationChange {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `section` or anything nested under it changed.
    ///
    /// A change to a parent section (`vibecat`) also affects its children
    /// (`vibecat.customGifPath`).
    pub fn affects_configuration(&self, section: &str) -> bool {
        self.keys
            .iter()
            .any(|key| key == section || is_nested(key, section) || is_nested(section, key))
    }
}

/// `child` lies strictly below `parent` in the dotted key hierarchy
fn is_nested(child: &str, parent: &str) -> bool {
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_flat_settings_and_ignores_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "vibecat.customGifPath": "cats/dance.gif", "editor.fontSize": 14 }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.custom_gif_path(), Some("cats/dance.gif"));
    }

    #[test]
    fn missing_key_means_unset() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.custom_gif_path(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn set_reports_the_changed_key() {
        let mut settings = Settings::default();
        let change = settings.set(CUSTOM_GIF_PATH, Some("a.gif".to_string()));
        assert!(change.affects_configuration(CUSTOM_GIF_PATH));
        assert_eq!(settings.custom_gif_path(), Some("a.gif"));

        let change = settings.set("editor.fontSize", Some("16".to_string()));
        assert!(!change.affects_configuration(CUSTOM_GIF_PATH));
        assert_eq!(settings.custom_gif_path(), Some("a.gif"));
    }

    #[test]
    fn section_changes_affect_children() {
        let change = ConfigurationChange::new(["vibecat"]);
        assert!(change.affects_configuration(CUSTOM_GIF_PATH));

        let change = ConfigurationChange::new(["vibecat.customGifPathOld"]);
        assert!(!change.affects_configuration(CUSTOM_GIF_PATH));
    }
}
