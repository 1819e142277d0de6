//! Instrumentation source annotation for structured log entries.
//!
//! Log entries can be annotated with the list of client libraries, and their versions, that took part in producing
//! them. The list lives in the entry's structured payload:
//!
//! ```json
//! {
//!   "logging.googleapis.com/diagnostic": {
//!     "instrumentation_source": [
//!       { "name": "nodejs-test", "version": "1.0.0" },
//!       { "name": "nodejs", "version": "unknown" }
//!     ]
//!   }
//! }
//! ```
//!
//! The key names, the library name, and the default version are read by the log processing backend, so their values
//! are fixed.
#![deny(warnings)]
#![deny(missing_docs)]

mod annotator;
pub use self::annotator::{create_diagnostic_entry, InstrumentationAnnotator};

pub mod entry;

mod record;
pub use self::record::{truncate_value, InstrumentationRecord};

mod source;
pub use self::source::InstrumentationSource;

mod status;
pub use self::status::{
    set_instrumentation_status, set_skip_instrumentation_check, InstrumentationConfiguration, InstrumentationStatus,
};

pub use instrumentation_metadata::DEFAULT_LIBRARY_VERSION;

/// Name under which this library records itself.
pub const LIBRARY_NAME_PREFIX: &str = "nodejs";

/// Payload key holding diagnostic information.
pub const DIAGNOSTIC_INFO_KEY: &str = "logging.googleapis.com/diagnostic";

/// Key, within the diagnostic information, holding the instrumentation source list.
pub const INSTRUMENTATION_SOURCE_KEY: &str = "instrumentation_source";

/// Log name used for standalone diagnostic entries.
pub const INSTRUMENTATION_LOG_NAME: &str = "diagnostic-log";

/// Maximum number of records in an instrumentation source list.
pub const MAX_INSTRUMENTATION_COUNT: usize = 3;

/// Maximum length, in characters, of a record name or version before it gets truncated.
pub const MAX_DIAGNOSTIC_VALUE_LEN: usize = 14;

/// Returns the version this library reports for itself.
///
/// This is the version provided at build time, or [`DEFAULT_LIBRARY_VERSION`] if none was provided.
pub fn library_version() -> &'static str {
    instrumentation_metadata::get_library_details().version()
}
