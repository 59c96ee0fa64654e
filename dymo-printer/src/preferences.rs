//! Preferences store - JSON file with the label type vocabulary

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PrintError, PrintResult};

/// Label types offered on first start
pub const DEFAULT_LABEL_TYPES: [&str; 3] = ["CPU", "MOBO", "SCREEN"];

/// Preferences file name inside the home directory
pub const PREFERENCES_FILE_NAME: &str = ".dymo_label_printer.json";

fn default_label_types() -> Vec<String> {
    DEFAULT_LABEL_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Persisted operator preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Known label types: upper case, unique, in insertion order
    #[serde(default = "default_label_types")]
    label_types: Vec<String>,

    #[serde(default)]
    pub always_on_top: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            label_types: default_label_types(),
            always_on_top: false,
        }
    }
}

impl Preferences {
    pub fn label_types(&self) -> &[String] {
        &self.label_types
    }

    /// Whether `label_type` is in the vocabulary (case-insensitive)
    pub fn contains(&self, label_type: &str) -> bool {
        let wanted = normalize(label_type);
        self.label_types.iter().any(|t| *t == wanted)
    }

    /// Add a label type; returns the stored (normalized) form
    pub fn add_label_type(&mut self, label_type: &str) -> PrintResult<String> {
        let label_type = normalize(label_type);

        if label_type.is_empty() {
            return Err(PrintError::invalid_request("Please enter a label type"));
        }
        if self.label_types.contains(&label_type) {
            return Err(PrintError::invalid_request("Label type already exists"));
        }

        self.label_types.push(label_type.clone());
        Ok(label_type)
    }

    /// Normalize a hand-edited vocabulary: drop blanks, upper-case, keep first of duplicates
    fn normalize_label_types(&mut self) {
        let mut seen = Vec::with_capacity(self.label_types.len());
        for label_type in self.label_types.drain(..) {
            let label_type = normalize(&label_type);
            if !label_type.is_empty() && !seen.contains(&label_type) {
                seen.push(label_type);
            }
        }
        self.label_types = seen;
    }
}

fn normalize(label_type: &str) -> String {
    label_type.trim().to_uppercase()
}

/// JSON file backing [`Preferences`]
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.dymo_label_printer.json`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(PREFERENCES_FILE_NAME))
    }

    /// Load preferences, falling back to defaults if the file is missing or unreadable
    pub fn load(&self) -> Preferences {
        if !self.path.exists() {
            return Preferences::default();
        }

        let loaded = fs::read_to_string(&self.path)
            .map_err(PrintError::from)
            .and_then(|json| serde_json::from_str::<Preferences>(&json).map_err(PrintError::from));

        match loaded {
            Ok(mut preferences) => {
                preferences.normalize_label_types();
                preferences
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable preferences");
                Preferences::default()
            }
        }
    }

    pub fn save(&self, preferences: &Preferences) -> PrintResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), "Preferences saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.label_types(), ["CPU", "MOBO", "SCREEN"]);
        assert!(!prefs.always_on_top);
    }

    #[test]
    fn test_add_label_type() {
        let mut prefs = Preferences::default();

        assert_eq!(prefs.add_label_type("  ram ").unwrap(), "RAM");
        assert_eq!(prefs.label_types().last().map(String::as_str), Some("RAM"));
        assert!(prefs.contains("Ram"));

        let err = prefs.add_label_type("cpu").unwrap_err();
        assert_eq!(err.to_string(), "Label type already exists");

        let err = prefs.add_label_type("   ").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a label type");

        assert_eq!(prefs.label_types().len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("prefs").join("labels.json"));

        let mut prefs = Preferences::default();
        prefs.add_label_type("PSU").unwrap();
        prefs.always_on_top = true;
        store.save(&prefs).unwrap();

        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("none.json"));
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(PreferencesStore::new(&path).load(), Preferences::default());
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"always_on_top": true}"#).unwrap();

        let prefs = PreferencesStore::new(&path).load();
        assert!(prefs.always_on_top);
        assert_eq!(prefs.label_types(), ["CPU", "MOBO", "SCREEN"]);
    }

    #[test]
    fn test_hand_edited_label_types_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(
            &path,
            r#"{"label_types": ["cpu", " CPU ", "", "  ", "gpu", "Mobo", "GPU"]}"#,
        )
        .unwrap();

        let mut prefs = PreferencesStore::new(&path).load();
        assert_eq!(prefs.label_types(), ["CPU", "GPU", "MOBO"]);
        assert!(prefs.contains("gpu"));

        let err = prefs.add_label_type("cpu").unwrap_err();
        assert_eq!(err.to_string(), "Label type already exists");
    }
}
