use serde_json::Value;

use crate::{InstrumentationRecord, MAX_INSTRUMENTATION_COUNT};

/// An ordered, capacity-limited list of instrumentation records.
///
/// Holds at most [`MAX_INSTRUMENTATION_COUNT`] records. Insertion order is preserved, and pushing into a full list is a
/// no-op.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstrumentationSource {
    records: Vec<InstrumentationRecord>,
}

impl InstrumentationSource {
    /// Creates an empty `InstrumentationSource`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an `InstrumentationSource` from loosely-typed JSON values.
    ///
    /// Values that don't parse as a record (see [`InstrumentationRecord::from_value`]) are skipped, and only the first
    /// [`MAX_INSTRUMENTATION_COUNT`] valid records are kept. Returns the source along with the number of values that
    /// were skipped as invalid.
    pub fn from_values<'a, I>(values: I) -> (Self, usize)
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut source = Self::new();
        let mut invalid = 0;
        for value in values {
            match InstrumentationRecord::from_value(value) {
                Some(record) => {
                    source.push(record);
                }
                None => invalid += 1,
            }
        }
        (source, invalid)
    }

    /// Appends a record to the end of the list.
    ///
    /// Returns `false`, dropping the record, if the list is already at capacity.
    pub fn push(&mut self, record: InstrumentationRecord) -> bool {
        if self.is_full() {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Ensures the library's own record is present in the list.
    ///
    /// If a record named exactly like `self_record` is already present, the list is left as-is. A record for the bare
    /// library name doesn't stand in for a self record registered under a longer name. Otherwise, `self_record` is
    /// appended after all existing records, dropping trailing records as necessary to make room for it.
    ///
    /// Returns `true` if `self_record` was appended.
    pub fn ensure_self_record(&mut self, self_record: InstrumentationRecord) -> bool {
        let already_present = self
            .records
            .iter()
            .any(|record| record.name() == self_record.name());
        if already_present {
            return false;
        }

        self.records.truncate(MAX_INSTRUMENTATION_COUNT - 1);
        self.records.push(self_record);
        true
    }

    /// Returns `true` if a record with the given name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.records.iter().any(|record| record.name() == name)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if no more records can be pushed.
    pub fn is_full(&self) -> bool {
        self.records.len() >= MAX_INSTRUMENTATION_COUNT
    }

    /// Returns the records, in order.
    pub fn records(&self) -> &[InstrumentationRecord] {
        &self.records
    }

    /// Renders the records as a JSON array.
    pub fn to_value(&self) -> Value {
        Value::Array(self.records.iter().map(InstrumentationRecord::to_value).collect())
    }
}
