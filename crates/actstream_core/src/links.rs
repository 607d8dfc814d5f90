//! Link extraction and content tag linking for AS2 objects.
//!
//! # Responsibility
//! - Read link targets out of `url`-style fields holding strings or Link objects.
//! - Turn indexed tags into HTML anchors inside `content`.
//!
//! # Invariants
//! - Tag indices count Unicode scalar values, not bytes.
//! - Overlapping tags are skipped, never merged.

use crate::util::json::{dedupe, get_list, is_falsy, pop_list, Object};
use log::warn;
use serde_json::Value;

/// Returns the target of one link value: the string itself, or an object's
/// `href` falling back to its `url`.
pub fn link_target(value: &Value) -> Option<&str> {
    match value {
        Value::String(link) => Some(link.as_str()),
        Value::Object(map) => map
            .get("href")
            .and_then(Value::as_str)
            .or_else(|| map.get("url").and_then(Value::as_str)),
        _ => None,
    }
}

/// Returns the deduplicated link targets of every value in `obj[key]`.
pub fn get_urls(obj: &Object, key: &str) -> Vec<String> {
    dedupe(
        get_list(obj, key)
            .into_iter()
            .filter_map(link_target)
            .map(str::to_string),
    )
}

/// Returns the first link target in `obj[key]`.
pub fn get_url(obj: &Object, key: &str) -> Option<String> {
    get_urls(obj, key).into_iter().next()
}

/// Wraps indexed tag spans of `content` in HTML links, in place.
///
/// Only tags carrying `startIndex`, `length` and `href` or `url` take part.
/// Linked tags lose their index fields and `content_is_html` is set once at
/// least one link was added. Content already marked as HTML is left alone.
pub fn link_tags(obj: &mut Object) {
    let content = match obj.get("content").and_then(Value::as_str) {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => return,
    };
    if obj.get("content_is_html").is_some_and(|flag| !is_falsy(flag)) {
        return;
    }

    let had_tags = obj.contains_key("tag");
    let mut tags = pop_list(obj, "tag");

    let mut indexed: Vec<(usize, usize, usize, String)> = tags
        .iter()
        .enumerate()
        .filter_map(|(position, tag)| {
            let map = tag.as_object()?;
            let start = map.get("startIndex")?.as_u64()?;
            let length = map.get("length")?.as_u64()?;
            let url = link_target(tag)?.to_string();
            Some((position, start as usize, length as usize, url))
        })
        .collect();
    indexed.sort_by_key(|(_, start, _, _)| *start);

    let chars: Vec<char> = content.chars().collect();
    let mut linked = String::with_capacity(content.len());
    let mut last_end = 0;
    let mut added = false;

    for (position, start, length, url) in indexed {
        if start < last_end {
            warn!(
                "event=tag_overlap module=links status=skipped url={} start={} last_end={}",
                url, start, last_end
            );
            continue;
        }
        let start = start.min(chars.len());
        let end = start.saturating_add(length).min(chars.len());
        linked.extend(&chars[last_end..start]);
        linked.push_str(&format!("<a href=\"{url}\">"));
        linked.extend(&chars[start..end]);
        linked.push_str("</a>");
        last_end = end;
        added = true;

        if let Some(Value::Object(tag)) = tags.get_mut(position) {
            tag.remove("startIndex");
            tag.remove("length");
        }
    }
    linked.extend(&chars[last_end..]);

    if had_tags {
        obj.insert("tag".to_string(), Value::Array(tags));
    }
    if added {
        obj.insert("content_is_html".to_string(), Value::Bool(true));
    }
    obj.insert("content".to_string(), Value::String(linked));
}

#[cfg(test)]
mod tests {
    use super::{get_url, get_urls, link_tags};
    use crate::util::json::Object;
    use serde_json::{json, Value};

    fn object(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn get_urls_reads_strings_and_link_objects() {
        let obj = object(json!({
            "url": ["http://a", {"type": "Link", "href": "http://b"}, "http://a"]
        }));
        assert_eq!(get_urls(&obj, "url"), vec!["http://a", "http://b"]);
        assert_eq!(get_url(&obj, "url").as_deref(), Some("http://a"));
        assert!(get_urls(&obj, "missing").is_empty());
    }

    #[test]
    fn link_tags_wraps_indexed_spans_in_order() {
        let mut obj = object(json!({
            "content": "hi @bob and @alice",
            "tag": [
                {"href": "http://alice", "startIndex": 12, "length": 6},
                {"href": "http://bob", "startIndex": 3, "length": 4},
                {"name": "unindexed"}
            ]
        }));
        link_tags(&mut obj);

        assert_eq!(
            obj["content"],
            json!("hi <a href=\"http://bob\">@bob</a> and <a href=\"http://alice\">@alice</a>")
        );
        assert_eq!(obj["content_is_html"], json!(true));
        assert_eq!(obj["tag"][0], json!({"href": "http://alice"}));
        assert_eq!(obj["tag"][2], json!({"name": "unindexed"}));
    }

    #[test]
    fn link_tags_counts_characters_not_bytes() {
        let mut obj = object(json!({
            "content": "é @x",
            "tag": [{"url": "http://x", "startIndex": 2, "length": 2}]
        }));
        link_tags(&mut obj);
        assert_eq!(obj["content"], json!("é <a href=\"http://x\">@x</a>"));
    }

    #[test]
    fn link_tags_skips_overlapping_tags() {
        let mut obj = object(json!({
            "content": "abcdef",
            "tag": [
                {"href": "http://1", "startIndex": 0, "length": 4},
                {"href": "http://2", "startIndex": 2, "length": 2}
            ]
        }));
        link_tags(&mut obj);
        assert_eq!(obj["content"], json!("<a href=\"http://1\">abcd</a>ef"));
        assert_eq!(obj["tag"][1]["startIndex"], json!(2));
    }

    #[test]
    fn link_tags_leaves_html_content_alone() {
        let mut obj = object(json!({
            "content": "<p>x</p>",
            "content_is_html": true,
            "tag": [{"href": "http://1", "startIndex": 0, "length": 1}]
        }));
        let before = obj.clone();
        link_tags(&mut obj);
        assert_eq!(obj, before);
    }
}
