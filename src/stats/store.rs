//! Append-only response log persisted as one JSON document
//!
//! `{"version": "1.0", "metadata": {...}, "logs": [...]}`. A missing file is
//! an empty log. Appending reads the whole document, pushes one event and
//! writes it back; there is no locking, so only one writer may run at a time.
//!
//! Entries are kept as raw JSON so hand-edited entries survive an append.
//! Entries that do not parse as events are skipped when reading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::event::ResponseEvent;
use crate::error::LevelError;

pub const STORE_VERSION: &str = "1.0";

fn default_version() -> String {
    STORE_VERSION.to_string()
}

/// On-disk document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub logs: Vec<Value>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            version: default_version(),
            metadata: Map::new(),
            logs: Vec::new(),
        }
    }
}

impl EventLog {
    /// Entries that parse as events, in file order
    pub fn events(&self) -> Vec<ResponseEvent> {
        self.logs
            .iter()
            .enumerate()
            .filter_map(|(idx, raw)| match serde_json::from_value(raw.clone()) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping malformed log entry #{}: {}", idx + 1, e);
                    None
                }
            })
            .collect()
    }

    fn check_version(&self) -> Result<(), LevelError> {
        let major = |v: &str| v.split('.').next().map(str::to_string);
        if major(&self.version) == major(STORE_VERSION) {
            Ok(())
        } else {
            Err(LevelError::UnsupportedStoreVersion {
                version: self.version.clone(),
                supported: STORE_VERSION.to_string(),
            })
        }
    }
}

/// File-backed event store
#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document, or an empty log if the file does not exist
    pub fn load(&self) -> Result<EventLog> {
        if !self.path.exists() {
            debug!("No event log at {:?}, starting empty", self.path);
            return Ok(EventLog::default());
        }

        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read event log: {:?}", self.path))?;
        let log: EventLog = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse event log: {:?}", self.path))?;
        log.check_version()?;

        Ok(log)
    }

    /// All readable events in append order
    pub fn load_all(&self) -> Result<Vec<ResponseEvent>> {
        Ok(self.load()?.events())
    }

    /// Append one event and return the new number of entries
    pub fn append(&self, event: ResponseEvent) -> Result<usize> {
        let mut log = self.load()?;
        log.logs.push(serde_json::to_value(&event)?);
        self.save(&log)?;
        Ok(log.logs.len())
    }

    fn save(&self, log: &EventLog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let mut json = serde_json::to_string_pretty(log)?;
        json.push('\n');

        // Replace via a sibling temp file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write event log: {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace event log: {:?}", self.path))?;

        Ok(())
    }
}
