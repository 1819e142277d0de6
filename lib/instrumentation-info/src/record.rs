use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{library_version, LIBRARY_NAME_PREFIX, MAX_DIAGNOSTIC_VALUE_LEN};

const NAME_FIELD: &str = "name";
const VERSION_FIELD: &str = "version";

/// Truncates `value` to at most `max_len` characters.
///
/// Values longer than `max_len` characters keep their first `max_len` characters, followed by a trailing `*` to mark
/// that they were truncated. Shorter values are returned unchanged.
///
/// Length is measured in characters, not bytes, so a truncated value never splits a code point.
pub fn truncate_value(value: &str, max_len: usize) -> String {
    match value.char_indices().nth(max_len) {
        Some((cutoff, _)) => {
            let mut truncated = String::with_capacity(cutoff + 1);
            truncated.push_str(&value[..cutoff]);
            truncated.push('*');
            truncated
        }
        None => value.to_string(),
    }
}

/// A single library that contributed to producing a log entry.
///
/// Both the name and version are capped at [`MAX_DIAGNOSTIC_VALUE_LEN`] characters (plus a truncation marker) when the
/// record is built through [`new`][Self::new] or parsed through [`from_value`][Self::from_value].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InstrumentationRecord {
    name: String,
    version: String,
}

impl InstrumentationRecord {
    /// Creates a new `InstrumentationRecord`, truncating the name and version as necessary.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: truncate_value(name, MAX_DIAGNOSTIC_VALUE_LEN),
            version: truncate_value(version, MAX_DIAGNOSTIC_VALUE_LEN),
        }
    }

    /// Creates the record describing this library.
    ///
    /// When `name` is not given, [`LIBRARY_NAME_PREFIX`] is used. When `version` is not given, the library version
    /// detected at build time is used, which falls back to [`DEFAULT_LIBRARY_VERSION`][crate::DEFAULT_LIBRARY_VERSION].
    /// Given values are truncated.
    pub fn for_library(name: Option<&str>, version: Option<&str>) -> Self {
        Self::new(
            name.unwrap_or(LIBRARY_NAME_PREFIX),
            version.unwrap_or_else(|| library_version()),
        )
    }

    /// Parses a record from a loosely-typed JSON value.
    ///
    /// Returns `None` unless the value is an object with string `name` and `version` fields. Other fields are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let name = object.get(NAME_FIELD)?.as_str()?;
        let version = object.get(VERSION_FIELD)?.as_str()?;
        Some(Self::new(name, version))
    }

    /// Renders this record as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(2);
        object.insert(NAME_FIELD.to_string(), Value::String(self.name.clone()));
        object.insert(VERSION_FIELD.to_string(), Value::String(self.version.clone()));
        Value::Object(object)
    }

    /// Returns the library name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the library version.
    pub fn version(&self) -> &str {
        &self.version
    }
}
