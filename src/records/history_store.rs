use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

use super::{History, HistoryStore, ProfileHistory};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw contents of the history file. Entries that do not fit the typed view are kept verbatim.
pub type HistoryDocument = Map<String, Value>;

/// History persisted as one pretty-printed JSON object: `{"user": {"YYYY-MM-DD": count}}`.
///
/// Writes within the process are serialized and land via temp file + rename, so a reader never
/// observes a half-written file. Writes go through the raw document, so a sample that cannot be
/// read back as a count survives unrelated updates.
pub struct JsonHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted object exactly as stored. Empty when the file is missing or not a JSON object.
    pub fn read_document(&self) -> HistoryDocument {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return HistoryDocument::new(),
            Err(err) => {
                log::warn!(
                    "failed to read history file {}, starting empty: {err}",
                    self.path.display()
                );
                return HistoryDocument::new();
            }
        };

        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Object(document)) => document,
            Ok(other) => {
                log::warn!(
                    "history file {} holds a JSON {} instead of an object, starting empty",
                    self.path.display(),
                    json_kind(&other)
                );
                HistoryDocument::new()
            }
            Err(err) => {
                log::warn!(
                    "history file {} is not valid, starting empty: {err}",
                    self.path.display()
                );
                HistoryDocument::new()
            }
        }
    }

    fn persist(&self, document: &HistoryDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                io_error(err, format!("failed to create history directory {}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(document)?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, json.as_bytes()).map_err(|err| {
            io_error(err, format!("failed to write history file {}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|err| {
            io_error(
                err,
                format!(
                    "failed to move {} into place at {}",
                    tmp_path.display(),
                    self.path.display()
                ),
            )
        })
    }
}

impl HistoryStore for JsonHistoryStore {
    fn read_history(&self) -> History {
        typed_history(&self.read_document())
    }

    fn record_sample(&self, profile: &str, date: NaiveDate, count: u64) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut document = self.read_document();
        let days = document
            .entry(profile.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !days.is_object() {
            log::warn!(
                "history entry for {profile} is a JSON {}, replacing it with a date map",
                json_kind(days)
            );
            *days = Value::Object(Map::new());
        }
        if let Value::Object(days) = days {
            days.insert(date.format(DATE_FORMAT).to_string(), Value::from(count));
        }
        self.persist(&document)?;

        log::debug!("recorded {count} followers for {profile} on {date}");
        Ok(())
    }
}

/// Typed view of the document. Dates that do not parse and values that are not whole,
/// non-negative numbers are left out of the view but stay in the file.
pub fn typed_history(document: &HistoryDocument) -> History {
    document
        .iter()
        .filter_map(|(profile, days)| {
            let Value::Object(days) = days else {
                log::debug!("skipping history entry {profile}: not a date map");
                return None;
            };
            let samples: ProfileHistory = days
                .iter()
                .filter_map(|(date, count)| {
                    let sample = NaiveDate::parse_from_str(date, DATE_FORMAT)
                        .ok()
                        .zip(sample_count(count));
                    if sample.is_none() {
                        log::debug!("skipping history sample {profile}/{date}: {count}");
                    }
                    sample
                })
                .collect();
            Some((profile.clone(), samples))
        })
        .collect()
}

fn sample_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn io_error(err: io::Error, action: String) -> AppError {
    AppError::Io(io::Error::new(err.kind(), format!("{action}: {err}")))
}
