//! Deserialization helpers, meant to be used with `serde_with`.

use serde::{
    de::{Error as _, Unexpected},
    Deserialize, Deserializer,
};
use serde_with::DeserializeAs;

/// Any value a switch might reasonably be written as.
#[derive(Deserialize)]
#[serde(untagged)]
enum Switch {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Permissively deserializes a boolean.
///
/// Environment variables only carry strings, and hand-written configuration tends to mix styles, so besides native
/// booleans this accepts the integers `0`/`1` and the strings `"true"`, `"false"`, `"1"` and `"0"`. Strings are
/// compared case-insensitively, ignoring surrounding whitespace.
pub struct PermissiveBool;

impl<'de> DeserializeAs<'de, bool> for PermissiveBool {
    fn deserialize_as<D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Switch::deserialize(deserializer)? {
            Switch::Bool(value) => Ok(value),
            Switch::Int(0) => Ok(false),
            Switch::Int(1) => Ok(true),
            Switch::Int(other) => Err(D::Error::invalid_value(Unexpected::Signed(other), &"0 or 1")),
            Switch::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(D::Error::invalid_value(
                    Unexpected::Str(&text),
                    &"\"true\", \"false\", \"1\" or \"0\"",
                )),
            },
        }
    }
}
