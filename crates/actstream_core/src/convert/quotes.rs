//! Quote posts (FEP-e232 object links).
//!
//! # Responsibility
//! - AS1 carries a quoted post as a `note` attachment.
//! - AS2 carries it as a `Link` tag with an ActivityStreams media type, plus
//!   the `_misskey_quote`/`quoteUrl` shortcuts and a trailing `RE: <url>` line
//!   in `content`.
//!
//! # Invariants
//! - The `RE:` line is appended at most once and only stripped when it links
//!   the quoted url.

use crate::model::{CONTENT_TYPE, CONTENT_TYPE_LD_PROFILE, MISSKEY_QUOTE_IRI, MISSKEY_QUOTE_TERM};
use crate::util::json::Object;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Top-level AS2 fields naming the first quoted post.
pub(crate) const QUOTE_URL_FIELDS: &[&str] = &[MISSKEY_QUOTE_TERM, "quoteUrl"];

static QUOTE_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+RE: <?[^\s]+>?\s?$").expect("valid quote suffix regex"));
static HTML_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(br|/p|/div)[^>]*>").expect("valid html break regex"));
static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid html tag regex"));

/// Link target of an AS1 attachment that quotes another post.
pub(crate) fn quoted_href(attachment: &Value) -> Option<&str> {
    let attachment = attachment.as_object()?;
    if attachment.get("objectType").and_then(Value::as_str) != Some("note") {
        return None;
    }
    ["id", "url"].iter().find_map(|key| {
        attachment
            .get(*key)
            .and_then(Value::as_str)
            .filter(|href| !href.is_empty())
    })
}

/// Rewrites a converted AS2 note into the `Link` tag that quotes it.
pub(crate) fn quote_tag(mut quote: Object, href: &str) -> Object {
    quote.remove("id");
    quote.remove("url");
    quote.insert("type".to_string(), Value::String("Link".to_string()));
    quote.insert(
        "mediaType".to_string(),
        Value::String(CONTENT_TYPE_LD_PROFILE.to_string()),
    );
    quote.insert("href".to_string(), Value::String(href.to_string()));
    quote
}

/// `@context` of a top-level object that quotes a post.
pub(crate) fn quote_context(context: &str) -> Value {
    let mut term = Object::new();
    term.insert(
        MISSKEY_QUOTE_TERM.to_string(),
        Value::String(MISSKEY_QUOTE_IRI.to_string()),
    );
    Value::Array(vec![Value::String(context.to_string()), Value::Object(term)])
}

/// `content` with an `RE: <url>` line appended, or `None` when the text
/// already ends in one.
pub(crate) fn with_quote_suffix(content: Option<&Value>, url: &str) -> Option<String> {
    let content = content.and_then(Value::as_str).unwrap_or_default();
    if QUOTE_SUFFIX_RE.is_match(&html_to_text(content)) {
        return None;
    }
    let separator = if content.is_empty() { "" } else { "<br><br>" };
    Some(format!("{content}{separator}RE: <a href=\"{url}\">{url}</a>"))
}

/// Whether an AS2 tag links a quoted post, returning its `href`.
pub(crate) fn quoted_link(tag: &Value) -> Option<&str> {
    let tag = tag.as_object()?;
    if tag.get("type").and_then(Value::as_str) != Some("Link") {
        return None;
    }
    let media_type = tag.get("mediaType").and_then(Value::as_str)?;
    if media_type != CONTENT_TYPE_LD_PROFILE && media_type != CONTENT_TYPE {
        return None;
    }
    tag.get("href")
        .and_then(Value::as_str)
        .filter(|href| !href.is_empty())
}

/// Removes a trailing `RE: <url>` line that links `url`.
pub(crate) fn strip_quote_suffix(content: &str, url: &str) -> String {
    let url = regex::escape(url);
    let pattern =
        format!(r#"(\s|(<br>)+)?RE: (</span>)?(<a href="{url}">)?<?{url}>?(</a>)?\s?$"#);
    match Regex::new(&pattern) {
        Ok(suffix) => suffix.replace(content, "").into_owned(),
        Err(err) => {
            warn!(
                "event=quote_suffix_kept module=quotes status=warn reason=invalid_pattern error={}",
                err
            );
            content.to_string()
        }
    }
}

fn html_to_text(html: &str) -> String {
    let with_breaks = HTML_BREAK_RE.replace_all(html, "\n");
    HTML_TAG_RE.replace_all(&with_breaks, "").into_owned()
}
