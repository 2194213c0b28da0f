//! Core domain types for petvet.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
mod records;
mod row;

pub use ids::VetId;
pub use records::{PetRecord, VetRecord};
pub use row::{PetVetRow, RowError};

use std::fmt;

use thiserror::Error;

/// A string that is non-empty after trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("string must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    /// Trims, then rejects what is left if it is empty.
    pub fn trimmed(value: &str) -> Result<Self, EmptyStringError> {
        let value = value.trim();
        if value.is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
