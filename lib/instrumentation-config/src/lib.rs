//! Primitives for loading configuration for the instrumentation library.
#![deny(warnings)]
#![deny(missing_docs)]

use std::{borrow::Cow, sync::Arc};

use figment::{
    error::Kind,
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use tracing::debug;

pub mod deser;

/// A configuration error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigurationError {
    /// Environment variable prefix was empty.
    #[snafu(display("Environment variable prefix must not be empty."))]
    EmptyPrefix,

    /// A required setting was not present in any source.
    #[snafu(display("Missing field '{}' in configuration. {}", field, help_text))]
    MissingField {
        /// Where the setting can be provided.
        ///
        /// Lists the matching environment variable for every prefix the configuration was loaded with.
        help_text: String,

        /// Name of the missing setting.
        field: Cow<'static, str>,
    },

    /// A setting was present but had the wrong type.
    #[snafu(display(
        "Expected value for field '{}' to be '{}', got '{}' instead.",
        field,
        expected_ty,
        actual_ty
    ))]
    InvalidFieldType {
        /// Period-separated path to the setting.
        field: String,

        /// Expected data type.
        expected_ty: String,

        /// Actual data type.
        actual_ty: String,
    },

    /// Any other error raised while extracting configuration.
    #[snafu(display("Failed to load configuration: {}", source))]
    Generic {
        /// Error source.
        source: figment::Error,
    },
}

/// Builds configuration out of prefixed environment variables and in-memory values.
///
/// Sources are merged in the order they're added, and a setting found in a later source replaces the same setting
/// from an earlier one.
#[derive(Default)]
pub struct ConfigurationLoader {
    figment: Figment,
    env_prefixes: Vec<String>,
}

impl ConfigurationLoader {
    /// Adds the environment variables that start with `prefix` as a source.
    ///
    /// The prefix is matched case-insensitively, and is separated from the setting name by an underscore, which is
    /// added if `prefix` doesn't already end with one. With a prefix of `logging`, the `instrumentation_enabled`
    /// setting is read from `LOGGING_INSTRUMENTATION_ENABLED`.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, an error will be returned.
    pub fn from_environment(mut self, prefix: &str) -> Result<Self, ConfigurationError> {
        if prefix.is_empty() {
            return Err(ConfigurationError::EmptyPrefix);
        }

        let mut prefix = prefix.to_uppercase();
        if !prefix.ends_with('_') {
            prefix.push('_');
        }

        debug!(%prefix, "Loading configuration from environment variables.");
        self.figment = self.figment.admerge(Env::prefixed(&prefix));
        self.env_prefixes.push(prefix);
        Ok(self)
    }

    /// Adds in-memory values as a source.
    ///
    /// `values` must serialize to a map, such as a struct, a `HashMap`, or a `serde_json` object.
    pub fn add_values<T>(mut self, values: T) -> Self
    where
        T: Serialize,
    {
        self.figment = self.figment.admerge(Serialized::defaults(values));
        self
    }

    /// Consumes the loader, returning the merged configuration.
    pub fn into_generic(self) -> GenericConfiguration {
        GenericConfiguration {
            inner: Arc::new(Merged {
                figment: self.figment,
                env_prefixes: self.env_prefixes,
            }),
        }
    }
}

#[derive(Debug)]
struct Merged {
    figment: Figment,
    env_prefixes: Vec<String>,
}

/// Merged configuration, as built by [`ConfigurationLoader`].
///
/// Cheap to clone.
#[derive(Clone, Debug)]
pub struct GenericConfiguration {
    inner: Arc<Merged>,
}

impl GenericConfiguration {
    /// Deserializes the whole configuration as `T`.
    ///
    /// ## Errors
    ///
    /// If a required setting is missing, or a setting can't be deserialized into the expected type, an error will be
    /// returned.
    pub fn as_typed<'a, T>(&self) -> Result<T, ConfigurationError>
    where
        T: Deserialize<'a>,
    {
        self.inner.figment.extract().map_err(|e| self.map_error(e))
    }

    fn map_error(&self, e: figment::Error) -> ConfigurationError {
        match e.kind {
            Kind::MissingField(field) => {
                let env_vars = self
                    .inner
                    .env_prefixes
                    .iter()
                    .map(|prefix| format!("{}{}", prefix, field.replace('.', "_").to_uppercase()));
                let candidates = std::iter::once(field.to_string()).chain(env_vars).collect::<Vec<_>>();
                let help_text = format!("Try setting `{}`.", candidates.join("` or `"));

                ConfigurationError::MissingField { help_text, field }
            }
            Kind::InvalidType(actual_ty, expected_ty) => ConfigurationError::InvalidFieldType {
                field: e.path.join("."),
                expected_ty,
                actual_ty: actual_ty.to_string(),
            },
            _ => ConfigurationError::Generic { source: e },
        }
    }
}
