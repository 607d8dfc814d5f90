//! Small JSON and formatting primitives used by the converters.

pub mod duration;
pub mod json;
