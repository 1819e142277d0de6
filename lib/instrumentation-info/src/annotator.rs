use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    entry::{LogEntry, Severity},
    InstrumentationRecord, InstrumentationSource, InstrumentationStatus, DIAGNOSTIC_INFO_KEY,
    INSTRUMENTATION_LOG_NAME, INSTRUMENTATION_SOURCE_KEY, LIBRARY_NAME_PREFIX,
};

/// Annotates log entries with the libraries that produced them.
///
/// Annotation writes an ordered list of `{name, version}` records into the entry payload, under
/// [`DIAGNOSTIC_INFO_KEY`] and then [`INSTRUMENTATION_SOURCE_KEY`]. Records already present are kept, in order, and
/// this library's own record (the "self record") is appended after them unless it's already there. The list never
/// holds more than [`MAX_INSTRUMENTATION_COUNT`][crate::MAX_INSTRUMENTATION_COUNT] records, and the self record always
/// makes the cut.
///
/// Whether annotation runs at all is decided by the [`InstrumentationStatus`] the annotator was created with.
#[derive(Clone, Debug)]
pub struct InstrumentationAnnotator {
    status: Arc<InstrumentationStatus>,
    self_record: InstrumentationRecord,
}

impl InstrumentationAnnotator {
    /// Creates a new `InstrumentationAnnotator` that reads the given status, using the default self record.
    pub fn new(status: Arc<InstrumentationStatus>) -> Self {
        Self::with_self_record(status, InstrumentationRecord::for_library(None, None))
    }

    /// Creates a new `InstrumentationAnnotator` that reads the given status, with a caller-provided self record.
    ///
    /// This is meant for libraries layered on top of this one that register themselves under their own name and
    /// version.
    pub fn with_self_record(status: Arc<InstrumentationStatus>, self_record: InstrumentationRecord) -> Self {
        Self { status, self_record }
    }

    /// Creates a new `InstrumentationAnnotator` that reads the process-wide status.
    pub fn from_global_status() -> Self {
        Self::new(InstrumentationStatus::global())
    }

    /// Returns the status this annotator reads.
    pub fn status(&self) -> &Arc<InstrumentationStatus> {
        &self.status
    }

    /// Returns the self record.
    pub fn self_record(&self) -> &InstrumentationRecord {
        &self.self_record
    }

    /// Annotates the given entry in place.
    ///
    /// If annotation is disabled, or the skip signal is set, the entry is left untouched and `false` is returned.
    ///
    /// Otherwise, the payload is normalized (missing or non-mapping levels are replaced with empty ones, malformed
    /// records are dropped, and the remaining records are truncated) and the self record is appended unless a record
    /// with exactly the same name is present. Returns `true`, even if nothing had to be appended.
    pub fn annotate(&self, entry: &mut LogEntry) -> bool {
        if !self.status.should_annotate() {
            trace!(
                enabled = self.status.is_enabled(),
                skip_check = self.status.should_skip_check(),
                "Skipping instrumentation annotation."
            );
            return false;
        }

        let values = entry.instrumentation_values_mut();
        let (mut source, invalid) = InstrumentationSource::from_values(values.iter());
        if invalid > 0 {
            debug!(invalid, "Dropped malformed instrumentation records.");
        }

        if source.ensure_self_record(self.self_record.clone()) {
            trace!(
                name = self.self_record.name(),
                version = self.self_record.version(),
                records = source.len(),
                "Appended self record to instrumentation source."
            );
        }

        *values = source.records().iter().map(InstrumentationRecord::to_value).collect();
        true
    }

    /// Annotates a batch of entries.
    ///
    /// If annotation is disabled, or the skip signal is set, the batch is left untouched and `false` is returned.
    ///
    /// Otherwise, the first entry that already carries an instrumentation source is annotated in place. When no entry
    /// carries one, a diagnostic entry (see [`create_diagnostic_entry`]) is appended to the batch instead. Returns
    /// `true`.
    ///
    /// Instrumentation info is only written once per status: once a batch has been populated, later calls leave their
    /// batch untouched and return `false` until the status is [reset][InstrumentationStatus::reset].
    pub fn populate(&self, entries: &mut Vec<LogEntry>) -> bool {
        if !self.status.should_annotate() {
            return false;
        }

        if !self.status.mark_written() {
            trace!("Instrumentation info already written. Skipping batch.");
            return false;
        }

        match entries.iter_mut().find(|entry| entry.has_instrumentation_source()) {
            Some(entry) => self.annotate(entry),
            None => {
                debug!("No entry carries instrumentation information. Adding diagnostic entry.");
                entries.push(create_diagnostic_entry(
                    Some(self.self_record.name()),
                    Some(self.self_record.version()),
                ));
                true
            }
        }
    }
}

/// Creates a standalone diagnostic entry describing this library.
///
/// The entry has [`Severity::Info`], is logged to [`INSTRUMENTATION_LOG_NAME`], and its payload holds exactly one
/// record built by [`InstrumentationRecord::for_library`]. A `name` that does not start with [`LIBRARY_NAME_PREFIX`] is
/// replaced with the prefix.
pub fn create_diagnostic_entry(name: Option<&str>, version: Option<&str>) -> LogEntry {
    let name = name.filter(|name| name.starts_with(LIBRARY_NAME_PREFIX));
    let record = InstrumentationRecord::for_library(name, version);

    let mut diagnostic = Map::new();
    diagnostic.insert(
        INSTRUMENTATION_SOURCE_KEY.to_string(),
        Value::Array(vec![record.to_value()]),
    );
    let mut payload = Map::new();
    payload.insert(DIAGNOSTIC_INFO_KEY.to_string(), Value::Object(diagnostic));

    LogEntry::new(Severity::Info)
        .with_log_name(INSTRUMENTATION_LOG_NAME.to_string())
        .with_payload(Value::Object(payload))
}
