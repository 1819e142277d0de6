//! Build-time metadata about the instrumentation library.
#![deny(warnings)]
#![deny(missing_docs)]

#[allow(dead_code)]
mod details {
    include!(concat!(env!("OUT_DIR"), "/details.rs"));
}

/// Version reported when no library version was provided at build time.
///
/// This value is part of the contract with the log processing backend, and must not change. The build script carries
/// its own copy of it.
pub const DEFAULT_LIBRARY_VERSION: &str = "unknown";

static LIBRARY_DETAILS: LibraryDetails = LibraryDetails {
    version: details::DETECTED_LIBRARY_VERSION,
    version_detected: details::DETECTED_LIBRARY_VERSION_PRESENT,
};

/// Gets the detected details for this library.
pub fn get_library_details() -> &'static LibraryDetails {
    &LIBRARY_DETAILS
}

/// Library details.
///
/// # Configuration
///
/// This struct is generated at build time from the following environment variables:
///
/// - `INSTRUMENTATION_LIBRARY_VERSION`: Version of the library, as reported in instrumentation records. If this is not
///   set, or is empty, the default value is [`DEFAULT_LIBRARY_VERSION`].
///
/// Surrounding whitespace in the version is ignored.
pub struct LibraryDetails {
    version: &'static str,
    version_detected: bool,
}

impl LibraryDetails {
    /// Returns the library version.
    ///
    /// If the version could not be detected, this will return [`DEFAULT_LIBRARY_VERSION`].
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Returns `true` if a library version was provided at build time.
    pub fn is_version_detected(&self) -> bool {
        self.version_detected
    }
}
