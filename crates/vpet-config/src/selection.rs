use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The durable record of which two creatures are on screen.
///
/// Stored as pretty JSON:
///
/// ```json
/// { "selected_digimon": ["Agumon_dmc", "Gabumon_dmc"], "timestamp": 1760000000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub selected_digimon: Vec<String>,
    /// Unix seconds at which the pair was confirmed.
    #[serde(default)]
    pub timestamp: i64,
}

impl SelectionRecord {
    pub fn new(pair: [String; 2]) -> Self {
        Self {
            selected_digimon: pair.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    /// The ordered pair, if the record names exactly two distinct creatures
    /// that all pass `is_known`. Anything else invalidates the whole record.
    pub fn valid_pair(&self, is_known: impl Fn(&str) -> bool) -> Option<[String; 2]> {
        let [a, b] = self.selected_digimon.as_slice() else {
            return None;
        };
        if a == b || !is_known(a) || !is_known(b) {
            return None;
        }
        Some([a.clone(), b.clone()])
    }
}

/// Reads and writes the [`SelectionRecord`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. Absent or malformed files yield `None`.
    pub fn load(&self) -> Option<SelectionRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "no selection record");
                return None;
            }
        };
        match serde_json::from_str::<SelectionRecord>(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring malformed selection record"
                );
                None
            }
        }
    }

    /// Persist `pair` atomically (write a temp file, then rename over).
    pub fn save(&self, pair: &[String; 2]) -> Result<SelectionRecord> {
        let record = SelectionRecord::new(pair.clone());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(&record).context("failed to encode selection")?;
        fs::write(&tmp, data).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(record)
    }
}
