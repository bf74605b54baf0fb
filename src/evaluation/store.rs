//! Persistent JSON map from series id to its AUC table.
//!
//! Every merge is a full read-modify-write of the file. The new content is
//! written to a temporary file in the target directory and renamed over the
//! target, so a failed merge never leaves a truncated store behind.

use super::results::AucTable;
use crate::error::{EvalError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// JSON result store at a fixed path.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current content; empty when the file does not exist yet.
    ///
    /// Entries are kept as raw JSON so that keys written by other runs
    /// survive a merge untouched.
    pub fn load(&self) -> Result<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| EvalError::Parse(format!("{}: {e}", self.path.display())))?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(EvalError::Parse(format!(
                "result store {} must hold a JSON object, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    /// Raw entry of one series.
    pub fn get(&self, series_id: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(series_id))
    }

    /// Sets `series_id` to `table`, replacing any previous entry.
    pub fn merge(&self, series_id: &str, table: &AucTable) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(series_id.to_string(), table.to_json()?);
        self.write_atomic(&entries)?;
        debug!(
            series = series_id,
            entries = entries.len(),
            path = %self.path.display(),
            "result store updated"
        );
        Ok(())
    }

    fn write_atomic(&self, entries: &Map<String, Value>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| {
            EvalError::Io(format!("replacing {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
