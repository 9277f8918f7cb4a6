use chrono::Utc;
use hohstartup_core::{ErrorKind, Paths, Result, RunState};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Done,
    Failed,
}

/// One line of the run history. Holds no secrets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub outcome: RunOutcome,
    pub timestamp_ms: i64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<RunState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub follow_up: bool,
}

impl RunRecord {
    pub fn done(duration_ms: u64, follow_up: bool) -> Self {
        Self {
            outcome: RunOutcome::Done,
            timestamp_ms: Utc::now().timestamp_millis(),
            duration_ms,
            failed_stage: None,
            error_kind: None,
            error: None,
            follow_up,
        }
    }

    pub fn failed(duration_ms: u64, stage: RunState, kind: ErrorKind, message: &str) -> Self {
        Self {
            outcome: RunOutcome::Failed,
            timestamp_ms: Utc::now().timestamp_millis(),
            duration_ms,
            failed_stage: Some(stage),
            error_kind: Some(kind),
            error: Some(message.to_string()),
            follow_up: false,
        }
    }
}

/// Append-only JSONL log, one file per UTC day.
pub struct HistoryLog {
    paths: Paths,
}

impl HistoryLog {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn append(&self, record: &RunRecord) -> Result<()> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let log_file = self.paths.history_file(&today);

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;

        let json = serde_json::to_string(record)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read run records from a specific date (`YYYY-MM-DD`)
    pub fn read_date(&self, date: &str) -> Result<Vec<RunRecord>> {
        let log_file = self.paths.history_file(date);

        if !log_file.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&log_file)?;
        let mut records = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RunRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!(error = %e, line = %line, "Failed to parse history record");
                }
            }
        }

        Ok(records)
    }

    pub fn read_today(&self) -> Result<Vec<RunRecord>> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.read_date(&today)
    }
}
