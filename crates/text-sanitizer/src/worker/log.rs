use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_number: usize,
    pub original_length: usize,
    pub cleaned_length: usize,
    pub cleaned: bool,
}

/// Finished, immutable per-document log as written to `<doc>_log.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingLog {
    pub file_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Seconds
    pub processing_time: f64,
    pub status: ProcessingStatus,
    pub total_chunks: usize,
    pub cleaned_chunks: usize,
    pub chunks_info: Vec<ChunkRecord>,
    pub errors: Vec<String>,
}

impl ProcessingLog {
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        info!("Wrote processing log to {:?}", path);
        Ok(())
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Accumulates log entries while a document is in flight. Consumed by
/// `finish`, so a finished log can no longer change.
#[derive(Debug)]
pub struct LogBuilder {
    file_name: String,
    start_time: DateTime<Utc>,
    total_chunks: usize,
    chunks_info: Vec<ChunkRecord>,
    errors: Vec<String>,
}

impl LogBuilder {
    pub fn start(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            start_time: Utc::now(),
            total_chunks: 0,
            chunks_info: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn set_total_chunks(&mut self, total: usize) {
        self.total_chunks = total;
    }

    pub fn record_chunk(&mut self, record: ChunkRecord) {
        self.chunks_info.push(record);
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn cleaned_chunks(&self) -> usize {
        self.chunks_info.iter().filter(|c| c.cleaned).count()
    }

    pub fn finish(self, status: ProcessingStatus, elapsed: Duration) -> ProcessingLog {
        let cleaned_chunks = self.cleaned_chunks();
        ProcessingLog {
            file_name: self.file_name,
            start_time: self.start_time,
            end_time: Utc::now(),
            processing_time: elapsed.as_secs_f64(),
            status,
            total_chunks: self.total_chunks,
            cleaned_chunks,
            chunks_info: self.chunks_info,
            errors: self.errors,
        }
    }
}
