//! Persisted user preferences: volume and last play intent.
//!
//! Simple key-value JSON with per-field defaults, so a missing, partial, or
//! corrupt file degrades to defaults instead of erroring; losing persisted
//! state is never fatal. Saved whole on every change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Master volume in [0,1].
    #[serde(default = "Preferences::default_volume")]
    pub volume: f32,
    /// Whether playback was on when the last session ended.
    #[serde(default)]
    pub was_playing: bool,
}

impl Preferences {
    fn default_volume() -> f32 {
        0.65
    }

    /// Clamp loaded values back into their domains.
    fn sanitized(mut self) -> Self {
        if !self.volume.is_finite() {
            self.volume = Self::default_volume();
        }
        self.volume = self.volume.clamp(0.0, 1.0);
        self
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self { volume: Self::default_volume(), was_playing: false }
    }
}

/// File-backed preference store.
pub struct PrefStore {
    path: PathBuf,
}

impl PrefStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read preferences; any failure falls back to defaults (warn-logged).
    pub fn load(&self) -> Preferences {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Preferences::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "preference read failed");
                return Preferences::default();
            }
        };
        match serde_json::from_str::<Preferences>(&raw) {
            Ok(p) => p.sanitized(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "preference parse failed");
                Preferences::default()
            }
        }
    }

    /// Write preferences; failures are warn-logged and swallowed.
    pub fn save(&self, prefs: &Preferences) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!(path = %self.path.display(), error = %e, "preference dir create failed");
                    return;
                }
            }
        }
        let json = match serde_json::to_string_pretty(prefs) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "preference serialize failed");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "preference write failed");
        }
    }
}

// ------------------------------------ Tests --------------------------------------
