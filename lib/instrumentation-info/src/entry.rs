//! Log entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{InstrumentationSource, DIAGNOSTIC_INFO_KEY, INSTRUMENTATION_SOURCE_KEY};

/// Log entry severity.
///
/// Annotation never looks at the severity; it's carried so that entries can be handed back to the logging client
/// intact.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// No assigned severity level.
    #[default]
    Default,

    /// Debug or trace information.
    Debug,

    /// Routine information, such as ongoing status or performance.
    Info,

    /// Normal but significant events, such as start up, shut down, or a configuration change.
    Notice,

    /// Events that might cause problems.
    Warning,

    /// Events that are likely to cause problems.
    Error,

    /// Events that cause more severe problems or outages.
    Critical,

    /// A person must take an action immediately.
    Alert,

    /// One or more systems are unusable.
    Emergency,
}

impl Severity {
    /// Returns the numeric code of this severity, as understood by the logging backend.
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::Default => 0,
            Self::Debug => 100,
            Self::Info => 200,
            Self::Notice => 300,
            Self::Warning => 400,
            Self::Error => 500,
            Self::Critical => 600,
            Self::Alert => 700,
            Self::Emergency => 800,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "DEFAULT",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Alert => "ALERT",
            Self::Emergency => "EMERGENCY",
        };
        f.write_str(name)
    }
}

/// A log entry.
///
/// The payload is loosely typed: it may be absent, a plain value (such as a text message), or a structured mapping.
/// Only the structured form can carry instrumentation information.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LogEntry {
    severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl LogEntry {
    /// Creates a `LogEntry` with the given severity and no payload.
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            log_name: None,
            payload: None,
        }
    }

    /// Sets the log name.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_log_name(mut self, log_name: impl Into<Option<String>>) -> Self {
        self.log_name = log_name.into();
        self
    }

    /// Sets the payload.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_payload(mut self, payload: impl Into<Option<Value>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Returns the severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the log name, if any.
    pub fn log_name(&self) -> Option<&str> {
        self.log_name.as_deref()
    }

    /// Returns the payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Returns a mutable reference to the payload.
    pub fn payload_mut(&mut self) -> &mut Option<Value> {
        &mut self.payload
    }

    /// Returns the raw instrumentation source array, if the payload carries one.
    pub fn instrumentation_values(&self) -> Option<&Vec<Value>> {
        self.payload
            .as_ref()?
            .get(DIAGNOSTIC_INFO_KEY)?
            .get(INSTRUMENTATION_SOURCE_KEY)?
            .as_array()
    }

    /// Returns `true` if the payload carries an instrumentation source array.
    pub fn has_instrumentation_source(&self) -> bool {
        self.instrumentation_values().is_some()
    }

    /// Returns the instrumentation source carried by the payload, if any.
    ///
    /// Malformed records are skipped.
    pub fn instrumentation_source(&self) -> Option<InstrumentationSource> {
        self.instrumentation_values()
            .map(|values| InstrumentationSource::from_values(values).0)
    }

    /// Returns the instrumentation source array, creating any missing level of the payload along the way.
    ///
    /// A payload that isn't a mapping is replaced with an empty mapping, and the same goes for a diagnostic value
    /// that isn't a mapping. An instrumentation source value that isn't an array is replaced with an empty array.
    pub(crate) fn instrumentation_values_mut(&mut self) -> &mut Vec<Value> {
        let payload = normalize_object(&mut self.payload, "payload");
        let diagnostic = normalize_object_entry(payload, DIAGNOSTIC_INFO_KEY);

        let source = diagnostic
            .entry(INSTRUMENTATION_SOURCE_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !source.is_array() {
            debug!(key = INSTRUMENTATION_SOURCE_KEY, "Replacing non-array instrumentation source.");
            *source = Value::Array(Vec::new());
        }

        match source {
            Value::Array(values) => values,
            _ => unreachable!("instrumentation source was just normalized to an array"),
        }
    }
}

fn normalize_object<'a>(value: &'a mut Option<Value>, what: &'static str) -> &'a mut Map<String, Value> {
    if !matches!(value, Some(Value::Object(_))) {
        if value.is_some() {
            debug!(what, "Replacing non-mapping value with an empty mapping.");
        }
        *value = Some(Value::Object(Map::new()));
    }

    match value {
        Some(Value::Object(map)) => map,
        _ => unreachable!("value was just normalized to a mapping"),
    }
}

fn normalize_object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let value = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !value.is_object() {
        debug!(key, "Replacing non-mapping value with an empty mapping.");
        *value = Value::Object(Map::new());
    }

    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just normalized to a mapping"),
    }
}
