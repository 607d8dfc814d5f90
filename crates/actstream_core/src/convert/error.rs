//! Conversion error type.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for conversion APIs.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Error returned when a tree cannot be converted at all.
///
/// Unknown vocabulary and odd field shapes never produce errors; they are
/// dropped during trimming instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// A non-empty value of a JSON kind the converter cannot accept.
    InvalidInputType {
        /// Field path being converted, `$` for the root value.
        field: String,
        /// Accepted JSON kinds.
        expected: &'static str,
        /// JSON kind actually received.
        found: &'static str,
    },
}

impl ConvertError {
    pub(crate) fn invalid_input(
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::InvalidInputType {
            field: field.into(),
            expected,
            found,
        }
    }
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInputType {
                field,
                expected,
                found,
            } => write!(f, "invalid input at `{field}`: expected {expected}, got {found}"),
        }
    }
}

impl Error for ConvertError {}
