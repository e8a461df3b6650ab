use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::input::parse_number;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write field store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode field store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Named form fields persisted between sessions as one JSON object on disk.
///
/// Reads never fail: a missing or unreadable file starts an empty store, and
/// a missing or malformed value yields the caller's default.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    path: Option<PathBuf>,
    fields: BTreeMap<String, Value>,
}

impl FieldStore {
    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let fields = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, Value>>(&text) {
                Ok(fields) => fields,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring malformed field store");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not read field store");
                BTreeMap::new()
            }
        };
        tracing::debug!(path = %path.display(), count = fields.len(), "field store loaded");
        Self {
            path: Some(path),
            fields,
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Numeric field; strings go through the lenient number parser.
    pub fn number(&self, key: &str, default: f64) -> f64 {
        match self.fields.get(key) {
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(default),
            Some(Value::String(s)) => parse_number(s, default),
            _ => default,
        }
    }

    /// Decodes a field into a serde type such as an option enum.
    pub fn decode<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.fields
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn merge(&mut self, fields: impl IntoIterator<Item = (String, Value)>) {
        self.fields.extend(fields);
    }

    /// Writes the store to its file, going through a temporary file so a
    /// crash never leaves a half-written store behind.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(&self.fields)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source: io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        tracing::debug!(path = %path.display(), count = self.fields.len(), "field store saved");
        Ok(())
    }
}
