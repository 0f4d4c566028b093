//! Append-only log storage for tool side effects
//!
//! Three destinations live under one directory: `leads.csv`, `leads.jsonl`
//! and `feedback.jsonl`. Every append is flushed and fsynced before it is
//! reported as written, and a single lock serializes all writes so concurrent
//! turns never interleave partial lines.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub const LEADS_CSV: &str = "leads.csv";
pub const LEADS_JSONL: &str = "leads.jsonl";
pub const FEEDBACK_JSONL: &str = "feedback.jsonl";

const CSV_HEADER: [&str; 4] = ["timestamp", "email", "name", "message"];
const CSV_LINE_END: &str = "\r\n";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{} line {line}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{destination:?} does not accept {record} records")]
    UnsupportedRecord {
        destination: Destination,
        record: &'static str,
    },
    #[error("{primary} | fallback error: {fallback}")]
    FallbackFailed {
        primary: Box<StoreError>,
        fallback: Box<StoreError>,
    },
}

impl StoreError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// UTC wall-clock instant in ISO-8601, captured when a record is built
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// A recorded expression of customer interest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub timestamp: String,
    pub email: String,
    pub name: String,
    pub message: String,
}

/// A question the business knowledge could not answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: String,
    pub question: String,
}

#[derive(Debug, Clone)]
pub enum LogRecord {
    Lead(Lead),
    Feedback(FeedbackEntry),
}

impl LogRecord {
    fn kind(&self) -> &'static str {
        match self {
            LogRecord::Lead(_) => "lead",
            LogRecord::Feedback(_) => "feedback",
        }
    }
}

/// Logical log destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    LeadsCsv,
    LeadsJsonl,
    FeedbackJsonl,
}

impl Destination {
    pub fn file_name(self) -> &'static str {
        match self {
            Destination::LeadsCsv => LEADS_CSV,
            Destination::LeadsJsonl => LEADS_JSONL,
            Destination::FeedbackJsonl => FEEDBACK_JSONL,
        }
    }
}

/// Where a feedback entry ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackWrite {
    Primary(PathBuf),
    Fallback(PathBuf),
}

/// Thread-safe handle on the log directory
#[derive(Debug)]
pub struct LogStore {
    dir: PathBuf,
    fallback_dir: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl LogStore {
    /// Store rooted at `dir`. Feedback falls back to `./logs` under the
    /// current working directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let fallback_dir = std::env::current_dir().ok().map(|cwd| cwd.join("logs"));
        Self {
            dir: dir.into(),
            fallback_dir,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    /// Create the log directory up front
    pub fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(StoreError::io(&self.dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, destination: Destination) -> PathBuf {
        self.dir.join(destination.file_name())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a panicked writer leaves nothing to repair
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one record to one destination
    pub fn append(&self, destination: Destination, record: &LogRecord) -> StoreResult<PathBuf> {
        let path = self.path_for(destination);
        let _guard = self.lock();
        write_record(&path, destination, record)?;
        Ok(path)
    }

    /// Append a lead to both the tabular and the line-delimited store.
    /// Both writes happen under one lock hold.
    pub fn record_lead(&self, lead: &Lead) -> StoreResult<()> {
        let record = LogRecord::Lead(lead.clone());
        {
            let _guard = self.lock();
            write_record(&self.path_for(Destination::LeadsCsv), Destination::LeadsCsv, &record)?;
            write_record(
                &self.path_for(Destination::LeadsJsonl),
                Destination::LeadsJsonl,
                &record,
            )?;
        }

        tracing::info!(
            timestamp = %lead.timestamp,
            email = %lead.email,
            "[LEAD] {} | {} | {} | {}",
            lead.timestamp,
            lead.email,
            lead.name,
            lead.message
        );
        Ok(())
    }

    /// Append a feedback entry, trying the fallback directory once if the
    /// primary write fails.
    pub fn record_feedback(&self, entry: &FeedbackEntry) -> StoreResult<FeedbackWrite> {
        let record = LogRecord::Feedback(entry.clone());
        let primary = self.path_for(Destination::FeedbackJsonl);

        let _guard = self.lock();
        let primary_err = match write_record(&primary, Destination::FeedbackJsonl, &record) {
            Ok(()) => {
                tracing::info!(
                    path = %primary.display(),
                    "[FEEDBACK] {} | {}",
                    entry.timestamp,
                    entry.question
                );
                return Ok(FeedbackWrite::Primary(primary));
            }
            Err(e) => e,
        };

        tracing::warn!(
            path = %primary.display(),
            error = %primary_err,
            "Feedback write failed, trying fallback"
        );

        let Some(fallback_dir) = &self.fallback_dir else {
            return Err(primary_err);
        };
        let fallback = fallback_dir.join(FEEDBACK_JSONL);

        match write_record(&fallback, Destination::FeedbackJsonl, &record) {
            Ok(()) => {
                tracing::info!(
                    path = %fallback.display(),
                    "[FEEDBACK] {} | {} (fallback)",
                    entry.timestamp,
                    entry.question
                );
                Ok(FeedbackWrite::Fallback(fallback))
            }
            Err(fallback_err) => Err(StoreError::FallbackFailed {
                primary: Box::new(primary_err),
                fallback: Box::new(fallback_err),
            }),
        }
    }

    /// Read back every lead from the line-delimited store
    pub fn leads(&self) -> StoreResult<Vec<Lead>> {
        read_jsonl(&self.path_for(Destination::LeadsJsonl))
    }

    /// Read back every feedback entry from the line-delimited store
    pub fn feedback(&self) -> StoreResult<Vec<FeedbackEntry>> {
        read_jsonl(&self.path_for(Destination::FeedbackJsonl))
    }
}

fn write_record(path: &Path, destination: Destination, record: &LogRecord) -> StoreResult<()> {
    match (destination, record) {
        (Destination::LeadsCsv, LogRecord::Lead(lead)) => {
            if !path.exists() {
                append_durably(path, &csv_row(&CSV_HEADER))?;
            }
            append_durably(
                path,
                &csv_row(&[
                    lead.timestamp.as_str(),
                    lead.email.as_str(),
                    lead.name.as_str(),
                    lead.message.as_str(),
                ]),
            )
        }
        (Destination::LeadsJsonl, LogRecord::Lead(lead)) => {
            append_durably(path, &jsonl_line(lead)?)
        }
        (Destination::FeedbackJsonl, LogRecord::Feedback(entry)) => {
            append_durably(path, &jsonl_line(entry)?)
        }
        (destination, record) => Err(StoreError::UnsupportedRecord {
            destination,
            record: record.kind(),
        }),
    }
}

fn jsonl_line<T: Serialize>(value: &T) -> StoreResult<String> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

fn csv_row(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push_str(CSV_LINE_END);
    row
}

/// Minimal quoting: only fields holding a delimiter, quote or line break
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Append `data` and force it to stable storage before returning
fn append_durably(path: &Path, data: &str) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }

    let created = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(StoreError::io(path))?;

    file.write_all(data.as_bytes()).map_err(StoreError::io(path))?;
    file.flush().map_err(StoreError::io(path))?;
    file.sync_all().map_err(StoreError::io(path))?;

    if created {
        sync_parent_dir(path);
    }
    Ok(())
}

/// Persist the directory entry of a newly created file
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            tracing::debug!(path = %parent.display(), error = %e, "Directory sync failed");
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> StoreResult<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path)(e)),
    };

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(StoreError::io(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
