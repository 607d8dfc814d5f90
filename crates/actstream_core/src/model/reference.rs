//! Link-or-object values.
//!
//! AS2 allows `inReplyTo`, `location` and similar fields to hold either a bare
//! link or a full object. `Reference` makes that choice explicit before any
//! conversion runs.

use crate::convert::error::{ConvertError, ConvertResult};
use crate::util::json::{is_falsy, kind_name, Object};
use serde_json::Value;

/// A field value that is either a bare link or an embedded object.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Bare URL or id string.
    Link(String),
    /// Full embedded object.
    Object(Object),
}

impl Reference {
    /// Decodes one JSON value.
    ///
    /// Returns `Ok(None)` for falsy values and an error for any JSON kind
    /// other than string or object.
    pub fn from_value(field: &str, value: &Value) -> ConvertResult<Option<Self>> {
        if is_falsy(value) {
            return Ok(None);
        }
        match value {
            Value::String(link) => Ok(Some(Self::Link(link.clone()))),
            Value::Object(map) => Ok(Some(Self::Object(map.clone()))),
            other => Err(ConvertError::invalid_input(
                field,
                "string or object",
                kind_name(other),
            )),
        }
    }

    /// Decodes every element of a list-normalized field, skipping falsy ones.
    pub fn from_list(field: &str, values: &[&Value]) -> ConvertResult<Vec<Self>> {
        let mut out = Vec::with_capacity(values.len());
        for value in values {
            if let Some(reference) = Self::from_value(field, value)? {
                out.push(reference);
            }
        }
        Ok(out)
    }

    /// Returns the link target: the bare link, or the object's `url` string.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link(link) => Some(link.as_str()),
            Self::Object(map) => map.get("url").and_then(Value::as_str),
        }
    }

    /// Returns the id: the bare link, or the object's `id` falling back to `url`.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Link(link) => Some(link.as_str()),
            Self::Object(map) => map
                .get("id")
                .and_then(Value::as_str)
                .or_else(|| self.url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Reference;
    use crate::convert::error::ConvertError;
    use serde_json::json;

    #[test]
    fn decodes_links_and_objects() {
        let link = Reference::from_value("inReplyTo", &json!("http://a"))
            .expect("string decodes")
            .expect("string is not empty");
        assert_eq!(link, Reference::Link("http://a".to_string()));
        assert_eq!(link.url(), Some("http://a"));

        let object = Reference::from_value("inReplyTo", &json!({"id": "tag:x", "url": "http://b"}))
            .expect("object decodes")
            .expect("object is not empty");
        assert_eq!(object.url(), Some("http://b"));
        assert_eq!(object.id(), Some("tag:x"));
    }

    #[test]
    fn skips_falsy_values() {
        let decoded = Reference::from_value("location", &json!("")).expect("empty decodes");
        assert!(decoded.is_none());
    }

    #[test]
    fn rejects_other_kinds() {
        let err = Reference::from_value("location", &json!(12)).expect_err("number must fail");
        assert_eq!(
            err,
            ConvertError::InvalidInputType {
                field: "location".to_string(),
                expected: "string or object",
                found: "number",
            }
        );
    }
}
