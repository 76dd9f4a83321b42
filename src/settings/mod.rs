pub mod schema;

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use log::{debug, warn};

use schema::Settings;

const SAVE_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    pending_write: bool,
    last_change_at: Option<Instant>,
    debounce: Duration,
}

impl SettingsStore {
    pub fn load() -> Self {
        Self::with_path(settings_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_settings_from(path.as_path());
        Self {
            path,
            settings,
            pending_write: false,
            last_change_at: None,
            debounce: Duration::from_millis(SAVE_DEBOUNCE_MS),
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write
    }

    pub fn update<F>(&mut self, mutator: F)
    where
        F: FnOnce(&mut Settings),
    {
        mutator(&mut self.settings);
        self.pending_write = true;
        self.last_change_at = Some(Instant::now());
    }

    pub fn flush_if_due(&mut self) -> Result<bool> {
        let Some(last_change) = self.last_change_at else {
            return Ok(false);
        };
        if !self.pending_write || last_change.elapsed() < self.debounce {
            return Ok(false);
        }

        save_settings_to(self.path.as_path(), &self.settings)?;
        self.pending_write = false;
        self.last_change_at = None;
        Ok(true)
    }

    pub fn force_flush(&mut self) -> Result<()> {
        if self.pending_write {
            save_settings_to(self.path.as_path(), &self.settings)?;
            self.pending_write = false;
            self.last_change_at = None;
        }
        Ok(())
    }
}

pub fn settings_path() -> PathBuf {
    if let Some(root) = portable_root() {
        return root.join("settings.json");
    }

    if let Some(base) = dirs::config_dir() {
        base.join("Omnis").join("settings.json")
    } else {
        PathBuf::from("settings.json")
    }
}

pub fn data_dir() -> PathBuf {
    if let Some(root) = portable_root() {
        return root;
    }

    dirs::data_local_dir()
        .map(|base| base.join("Omnis"))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn portable_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.to_path_buf();
    let marker = dir.join("omnis.ini");
    if marker.exists() { Some(dir) } else { None }
}

pub fn load_settings_from(path: &Path) -> Settings {
    let Ok(data) = fs::read_to_string(path) else {
        debug!("no settings at {}, using defaults", path.display());
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => settings.migrate(),
        Err(err) => {
            warn!("ignoring malformed settings at {}: {err}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let data = serde_json::to_string_pretty(&settings.clone().migrate())?;
    fs::write(path, data).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// Lexical, not semver: "0.10.0" is not newer than "0.9.0".
pub fn is_newer_version(candidate: &str, current: &str) -> bool {
    let candidate = candidate.trim().trim_start_matches('v');
    let current = current.trim().trim_start_matches('v');
    candidate > current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schema::ThemePreference;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::with_path(dir.path().join("settings.json"));
        assert_eq!(store.settings(), &Settings::default());
        assert!(!store.has_pending_write());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("seed");
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn writes_are_debounced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let mut store = SettingsStore::with_path(&path).with_debounce(Duration::from_secs(3600));

        store.update(|s| s.appearance.theme = ThemePreference::Light);
        assert!(!store.flush_if_due().expect("flush"));
        assert!(!path.exists());

        store.force_flush().expect("force flush");
        assert!(!store.has_pending_write());

        let reloaded = SettingsStore::with_path(&path);
        assert_eq!(reloaded.settings().appearance.theme, ThemePreference::Light);
    }

    #[test]
    fn flush_happens_once_debounce_elapses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::with_path(&path).with_debounce(Duration::ZERO);

        assert!(!store.flush_if_due().expect("nothing pending"));
        store.update(|s| s.viewer.text_page_size = 100);
        assert!(store.flush_if_due().expect("flushes"));
        assert!(!store.flush_if_due().expect("already flushed"));
        assert_eq!(load_settings_from(&path).viewer.text_page_size, 100);
    }

    #[test]
    fn version_comparison_is_lexical() {
        assert!(is_newer_version("0.2.0", "0.1.0"));
        assert!(is_newer_version("v1.1.0", "1.0.9"));
        assert!(!is_newer_version("0.1.0", "0.1.0"));
        // Known limitation of the lexical policy.
        assert!(!is_newer_version("0.10.0", "0.9.0"));
    }
}
