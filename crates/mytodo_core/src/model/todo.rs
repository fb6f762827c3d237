//! To-do item model and entry validation.
//!
//! # Invariants
//! - New items start with `is_done = false`.
//! - Entry text must not be empty; whitespace is accepted as entered.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One to-do entry.
///
/// Serialized with the document field names used by the remote collection:
/// `{ "text": ..., "isDone": ... }`. Both fields default when absent or null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Todo {
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    #[serde(rename = "isDone", default, deserialize_with = "null_as_default")]
    pub is_done: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Todo {
    /// Creates an open (not done) item.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_done(text, false)
    }

    /// Creates an item with an explicit completion flag.
    ///
    /// Used by snapshot decoding where the flag comes from the document.
    pub fn with_done(text: impl Into<String>, is_done: bool) -> Self {
        Self {
            text: text.into(),
            is_done,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Flips the completion flag in place.
    pub fn toggle(&mut self) {
        self.is_done = !self.is_done;
    }
}

/// Entry validation failures raised before an item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    EmptyText,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "todo text must not be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// Checks user-entered text before it becomes an item.
///
/// The text is kept as entered; only the empty string is rejected.
pub fn validate_entry_text(text: &str) -> Result<(), TodoValidationError> {
    if text.is_empty() {
        return Err(TodoValidationError::EmptyText);
    }
    Ok(())
}
