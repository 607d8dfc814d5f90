//! Caller-facing conversion options.
//!
//! Both structs deserialize with field defaults so host applications can embed
//! them in their own configuration files.

use crate::model::CONTEXT;
use serde::{Deserialize, Serialize};

/// Options for AS1 -> AS2 conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FromAs1Options {
    /// AS2 type used when neither `verb` nor `objectType` resolves.
    pub default_type: Option<String>,
    /// Value stamped as `@context` on the top-level object; `None` omits it.
    pub context: Option<String>,
}

impl FromAs1Options {
    /// Options for nested values: no context, optional default type.
    pub(crate) fn nested(default_type: Option<&str>) -> Self {
        Self {
            default_type: default_type.map(str::to_string),
            context: None,
        }
    }

    /// Sets the fallback AS2 type.
    pub fn with_default_type(mut self, default_type: impl Into<String>) -> Self {
        self.default_type = Some(default_type.into());
        self
    }

    /// Drops the `@context` stamp.
    pub fn without_context(mut self) -> Self {
        self.context = None;
        self
    }
}

impl Default for FromAs1Options {
    fn default() -> Self {
        Self {
            default_type: None,
            context: Some(CONTEXT.to_string()),
        }
    }
}

/// Options for AS2 -> AS1 conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToAs1Options {
    /// Whether `objectType` and `verb` are derived from `type`.
    pub populate_vocabulary: bool,
}

impl ToAs1Options {
    /// Options that never derive `objectType`/`verb`, used for images.
    pub fn untyped() -> Self {
        Self {
            populate_vocabulary: false,
        }
    }
}

impl Default for ToAs1Options {
    fn default() -> Self {
        Self {
            populate_vocabulary: true,
        }
    }
}
