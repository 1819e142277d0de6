use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};

use instrumentation_config::{deser::PermissiveBool, ConfigurationError, ConfigurationLoader, GenericConfiguration};
use serde::Deserialize;
use serde_with::serde_as;
use tracing::debug;

static GLOBAL_STATUS: OnceLock<Arc<InstrumentationStatus>> = OnceLock::new();

const fn default_true() -> bool {
    true
}

const fn default_false() -> bool {
    false
}

/// Instrumentation configuration.
///
/// Both settings can be loaded from any source supported by `ConfigurationLoader`. When loaded from the environment
/// with a prefix of `LOGGING`, for example, they map to `LOGGING_INSTRUMENTATION_ENABLED` and
/// `LOGGING_SKIP_INSTRUMENTATION_CHECK`.
#[serde_as]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub struct InstrumentationConfiguration {
    /// Whether log entries are annotated at all.
    ///
    /// Defaults to `true`.
    #[serde_as(as = "PermissiveBool")]
    #[serde(default = "default_true")]
    pub instrumentation_enabled: bool,

    /// Whether annotation should be skipped because an enclosing library already takes care of it.
    ///
    /// Defaults to `false`.
    #[serde_as(as = "PermissiveBool")]
    #[serde(default = "default_false")]
    pub skip_instrumentation_check: bool,
}

impl InstrumentationConfiguration {
    /// Creates a new `InstrumentationConfiguration` from the given configuration.
    ///
    /// # Errors
    ///
    /// If either setting is present but can't be read as a boolean, an error is returned.
    pub fn from_configuration(config: &GenericConfiguration) -> Result<Self, ConfigurationError> {
        config.as_typed()
    }

    /// Creates a new `InstrumentationConfiguration` from environment variables with the given prefix.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, or either setting is present but can't be read as a boolean, an error is returned.
    pub fn from_environment(prefix: &str) -> Result<Self, ConfigurationError> {
        let config = ConfigurationLoader::default().from_environment(prefix)?.into_generic();
        Self::from_configuration(&config)
    }
}

impl Default for InstrumentationConfiguration {
    fn default() -> Self {
        Self {
            instrumentation_enabled: default_true(),
            skip_instrumentation_check: default_false(),
        }
    }
}

/// Switches that control whether annotation runs.
///
/// There are two independent switches: the enable flag, which is set during setup, and the skip signal, which an
/// enclosing library sets to keep nested logging clients from annotating entries a second time. Annotation only runs
/// when the flag is enabled and the skip signal is clear.
///
/// Both switches are plain last-write-wins booleans. A process-wide instance is available through
/// [`global`][Self::global], and is what [`set_instrumentation_status`] and [`set_skip_instrumentation_check`] act on.
///
/// The status also remembers whether instrumentation info has been written for a batch, so that it is only written
/// once per status.
#[derive(Debug)]
pub struct InstrumentationStatus {
    enabled: AtomicBool,
    skip_check: AtomicBool,
    written: AtomicBool,
}

impl InstrumentationStatus {
    /// Creates a new `InstrumentationStatus` with annotation enabled and the skip signal clear.
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            skip_check: AtomicBool::new(false),
            written: AtomicBool::new(false),
        }
    }

    /// Creates a new `InstrumentationStatus` from the given configuration.
    pub fn from_configuration(config: &InstrumentationConfiguration) -> Self {
        let status = Self::new();
        status.apply_configuration(config);
        status
    }

    /// Returns the process-wide status.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_STATUS.get_or_init(|| Arc::new(Self::new())))
    }

    /// Overwrites both switches with the values from the given configuration.
    pub fn apply_configuration(&self, config: &InstrumentationConfiguration) {
        debug!(
            enabled = config.instrumentation_enabled,
            skip_check = config.skip_instrumentation_check,
            "Applying instrumentation configuration."
        );
        self.set_enabled(config.instrumentation_enabled);
        self.set_skip_check(config.skip_instrumentation_check);
    }

    /// Sets whether annotation is enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Returns `true` if annotation is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Sets the skip signal.
    pub fn set_skip_check(&self, skip: bool) {
        self.skip_check.store(skip, Ordering::Relaxed);
    }

    /// Returns `true` if the skip signal is set.
    pub fn should_skip_check(&self) -> bool {
        self.skip_check.load(Ordering::Relaxed)
    }

    /// Returns `true` if annotation should run: enabled, and not told to skip.
    pub fn should_annotate(&self) -> bool {
        self.is_enabled() && !self.should_skip_check()
    }

    /// Returns `true` if instrumentation info has already been written.
    pub fn is_written(&self) -> bool {
        self.written.load(Ordering::Relaxed)
    }

    /// Marks instrumentation info as written.
    ///
    /// Returns `true` if this call set the mark, or `false` if it was already set.
    pub fn mark_written(&self) -> bool {
        !self.written.swap(true, Ordering::Relaxed)
    }

    /// Restores both switches to their defaults (enabled, skip signal clear) and clears the written mark.
    ///
    /// Mostly useful for tests that flip the switches on the global status.
    pub fn reset(&self) {
        self.set_enabled(true);
        self.set_skip_check(false);
        self.written.store(false, Ordering::Relaxed);
    }
}

impl Default for InstrumentationStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets whether annotation is enabled, process-wide.
pub fn set_instrumentation_status(enabled: bool) {
    InstrumentationStatus::global().set_enabled(enabled);
}

/// Sets the skip signal, process-wide.
pub fn set_skip_instrumentation_check(skip: bool) {
    InstrumentationStatus::global().set_skip_check(skip);
}
