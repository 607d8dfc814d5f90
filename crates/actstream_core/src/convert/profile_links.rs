//! Mastodon profile links (`PropertyValue` attachments on actors).
//!
//! AS1 actors list their web links in `url`/`urls`, optionally named through
//! `displayName`. Mastodon shows them as `PropertyValue` attachments whose
//! `value` is an anchor. The anchor text must spell out the full url for
//! Mastodon's link verification.

use crate::util::json::{get_list, Object};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;
use url::Url;

const PROPERTY_VALUE: &str = "PropertyValue";
const UNNAMED_LINK: &str = "Link";

static ANCHOR_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*"([^"]+)""#).expect("valid anchor href regex")
});

/// Builds one `PropertyValue` attachment per distinct web link of an AS1 actor.
pub(crate) fn property_values(actor: &Object) -> Vec<Value> {
    let mut links: Vec<(String, Value)> = Vec::new();
    for link in get_list(actor, "url").into_iter().chain(get_list(actor, "urls")) {
        let (target, name) = match link {
            Value::String(target) => (target.as_str(), None),
            Value::Object(map) => {
                let target = ["value", "id", "url"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str));
                match target {
                    Some(target) => (target, map.get("displayName").and_then(Value::as_str)),
                    None => continue,
                }
            }
            _ => continue,
        };
        let Some((target, property)) = property_value(target, name) else {
            continue;
        };
        // a later link with the same target replaces the earlier one in place
        match links.iter_mut().find(|(seen, _)| *seen == target) {
            Some(entry) => entry.1 = property,
            None => links.push((target, property)),
        }
    }
    links.into_iter().map(|(_, property)| property).collect()
}

fn property_value(target: &str, name: Option<&str>) -> Option<(String, Value)> {
    let parsed = Url::parse(target).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let target = if parsed.path() == "/" {
        target.strip_suffix('/').unwrap_or(target)
    } else {
        target
    };
    let scheme = format!("{}://", parsed.scheme());
    let visible = target.strip_prefix(scheme.as_str()).unwrap_or(target);
    let name = name.filter(|name| !name.is_empty()).unwrap_or(UNNAMED_LINK);
    let anchor = format!(
        "<a rel=\"me\" href=\"{target}\"><span class=\"invisible\">{scheme}</span>{visible}</a>"
    );
    Some((
        target.to_string(),
        json!({"type": PROPERTY_VALUE, "name": name, "value": anchor}),
    ))
}

/// Whether an AS2 value is a `PropertyValue` profile field.
pub(crate) fn is_property_value(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some(PROPERTY_VALUE)
}

/// Link names recovered from an AS2 actor's `PropertyValue` attachments,
/// keyed by the anchor's `href`.
pub(crate) fn link_names(actor: &Object) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for attachment in get_list(actor, "attachment") {
        if !is_property_value(attachment) {
            continue;
        }
        let name = attachment.get("name").and_then(Value::as_str);
        let html = attachment.get("value").and_then(Value::as_str);
        let (Some(name), Some(html)) = (name, html) else {
            continue;
        };
        if name.is_empty() || name == UNNAMED_LINK {
            continue;
        }
        if let Some(href) = ANCHOR_HREF_RE.captures(html).map(|captures| captures[1].to_string()) {
            names.insert(href, name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::{is_property_value, link_names, property_values};
    use serde_json::json;

    #[test]
    fn web_links_become_property_values() {
        let actor = json!({
            "url": "https://alice.example/",
            "urls": [
                {"value": "https://code.example/alice", "displayName": "Code"},
                {"value": "mailto:alice@example.com"}
            ]
        });
        let actor = actor.as_object().expect("fixture is an object");
        assert_eq!(
            property_values(actor),
            vec![
                json!({
                    "type": "PropertyValue",
                    "name": "Link",
                    "value": concat!(
                        "<a rel=\"me\" href=\"https://alice.example\">",
                        "<span class=\"invisible\">https://</span>alice.example</a>"
                    )
                }),
                json!({
                    "type": "PropertyValue",
                    "name": "Code",
                    "value": concat!(
                        "<a rel=\"me\" href=\"https://code.example/alice\">",
                        "<span class=\"invisible\">https://</span>code.example/alice</a>"
                    )
                }),
            ]
        );
    }

    #[test]
    fn repeated_links_keep_the_last_name() {
        let actor = json!({
            "url": "https://alice.example/blog",
            "urls": [{"value": "https://alice.example/blog", "displayName": "Blog"}]
        });
        let actor = actor.as_object().expect("fixture is an object");
        let properties = property_values(actor);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0]["name"], json!("Blog"));
    }

    #[test]
    fn names_come_back_from_anchor_hrefs() {
        let actor = json!({
            "attachment": [
                {
                    "type": "PropertyValue",
                    "name": "Blog",
                    "value": "<a rel=\"me\" href=\"https://b.example\">b</a>"
                },
                {
                    "type": "PropertyValue",
                    "name": "Link",
                    "value": "<a href=\"https://unnamed.example\">u</a>"
                },
                {"type": "PropertyValue", "name": "Pronouns", "value": "they/them"},
                {"type": "Image", "url": "https://img.example/a.png"}
            ]
        });
        let actor = actor.as_object().expect("fixture is an object");
        let names = link_names(actor);
        assert_eq!(names.len(), 1);
        assert_eq!(names.get("https://b.example").map(String::as_str), Some("Blog"));
        assert!(is_property_value(&json!({"type": "PropertyValue"})));
        assert!(!is_property_value(&json!("https://b.example")));
    }
}
