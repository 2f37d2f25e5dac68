//! Status summary and the file sink a separate monitoring process reads.

use crate::state::ScanState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status file I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("status JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Small liveness record; overwritten on every publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub total_signals: usize,
    pub last_signal_time: Option<DateTime<Utc>>,
    pub errors_count: usize,
    pub worker_heartbeat: DateTime<Utc>,
}

impl StatusSummary {
    pub fn from_state(state: &ScanState, heartbeat: DateTime<Utc>) -> Self {
        Self {
            running: state.running,
            last_run: state.last_run,
            total_signals: state.total_signals(),
            last_signal_time: state.last_signal.as_ref().map(|s| s.time),
            errors_count: state.errors.len(),
            worker_heartbeat: heartbeat,
        }
    }
}

/// Destination for status summaries.
pub trait StatusSink: Send + Sync {
    fn publish(&self, summary: &StatusSummary) -> Result<(), StatusError>;
}

/// Pretty JSON file, replaced atomically via a sibling temp file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "status.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StatusSink for JsonFileSink {
    fn publish(&self, summary: &StatusSummary) -> Result<(), StatusError> {
        let json = serde_json::to_string_pretty(summary)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|source| StatusError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StatusError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Read the last published summary.
pub fn read_status(path: &Path) -> Result<StatusSummary, StatusError> {
    let content = std::fs::read_to_string(path).map_err(|source| StatusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
