use std::{collections::BTreeMap, fs, io, path::{Path, PathBuf}};

use log::warn;

use crate::error::PrefsError;
use crate::host::PreferenceStore;

/// String preferences kept in a small TOML file, rewritten on every change.
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: &Path) -> Self {
        let values = match Self::read(path) {
            Ok(values) => values,
            Err(err) => {
                warn!("{}; starting with empty preferences", err);
                BTreeMap::new()
            }
        };

        FilePreferences { path: path.to_path_buf(), values }
    }

    fn read(path: &Path) -> Result<BTreeMap<String, String>, PrefsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(PrefsError::Read { path: path.to_path_buf(), source }),
        };

        toml::from_str(&text).map_err(|source| PrefsError::Parse { path: path.to_path_buf(), source })
    }

    fn save(&self) -> Result<(), PrefsError> {
        let text = toml::to_string(&self.values)?;
        fs::write(&self.path, text).map_err(|source| PrefsError::Write { path: self.path.clone(), source })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());

        if let Err(err) = self.save() {
            warn!("{}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PREF_HIGH_SCORE, PREF_SNAKE_COLOR};
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");

        let mut prefs = FilePreferences::open(&path);
        assert_eq!(prefs.get(PREF_HIGH_SCORE), None);
        prefs.set(PREF_HIGH_SCORE, "120");
        prefs.set(PREF_SNAKE_COLOR, "#ff00ff");

        let reopened = FilePreferences::open(&path);
        assert_eq!(reopened.get(PREF_HIGH_SCORE).as_deref(), Some("120"));
        assert_eq!(reopened.get(PREF_SNAKE_COLOR).as_deref(), Some("#ff00ff"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let mut prefs = FilePreferences::open(&path);
        assert_eq!(prefs.get(PREF_HIGH_SCORE), None);

        prefs.set(PREF_HIGH_SCORE, "10");
        assert_eq!(FilePreferences::open(&path).get(PREF_HIGH_SCORE).as_deref(), Some("10"));
    }

    #[test]
    fn unwritable_path_keeps_values_in_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("prefs.toml");

        let mut prefs = FilePreferences::open(&path);
        prefs.set(PREF_SNAKE_COLOR, "#123456");
        assert_eq!(prefs.get(PREF_SNAKE_COLOR).as_deref(), Some("#123456"));
    }
}
