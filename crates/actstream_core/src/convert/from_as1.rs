//! ActivityStreams 1 -> 2 conversion.

use super::error::{ConvertError, ConvertResult};
use super::options::FromAs1Options;
use super::quotes::{self, QUOTE_URL_FIELDS};
use super::{child_path, element_path, passthrough, profile_links, put};
use crate::model::reference::Reference;
use crate::model::PUBLIC_AUDIENCE;
use crate::util::duration::to_iso8601_duration;
use crate::util::json::{dedupe, get_first, get_list, is_falsy, kind_name, trim_object, Object};
use crate::vocab;
use log::warn;
use serde_json::Value;
use std::path::Path;
use url::Url;

/// AS1 keys rewritten by this converter. Everything else passes through.
const RECOGNIZED_FIELDS: &[&str] = &[
    "@context",
    "actor",
    "attachments",
    "author",
    "cc",
    "displayName",
    "image",
    "inReplyTo",
    "location",
    "mimeType",
    "object",
    "objectType",
    "options",
    "replies",
    "stream",
    "tags",
    "title",
    "to",
    "url",
    "urls",
    "username",
    "verb",
];

const ICON_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const ICON_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Converts an AS1 activity or object to AS2.
///
/// Returns an empty mapping for falsy input and passes bare strings through.
/// An object left with nothing but a single `url` string collapses to it.
///
/// # Errors
/// - `ConvertError::InvalidInputType` when the root, or any nested value the
///   converter recurses into, is neither an object nor a string.
pub fn from_as1(obj: &Value, options: &FromAs1Options) -> ConvertResult<Value> {
    convert(obj, options, "$", true)
}

/// `top_level` holds for the root and the objects of top-level activities.
/// Profile links are only built there.
fn convert(
    value: &Value,
    options: &FromAs1Options,
    path: &str,
    top_level: bool,
) -> ConvertResult<Value> {
    if is_falsy(value) {
        return Ok(Value::Object(Object::new()));
    }
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Object(obj) => convert_object(obj, options, path, top_level),
        other => Err(ConvertError::invalid_input(
            path,
            "object or string",
            kind_name(other),
        )),
    }
}

fn convert_object(
    obj: &Object,
    options: &FromAs1Options,
    path: &str,
    top_level: bool,
) -> ConvertResult<Value> {
    let verb = obj.get("verb").and_then(Value::as_str);
    let object_type = obj.get("objectType").and_then(Value::as_str);

    // verb wins over objectType when both are present
    let mut as2_type = verb
        .or(object_type)
        .and_then(vocab::resolve_type)
        .map(str::to_string)
        .or_else(|| options.default_type.clone());

    let mut out = passthrough(obj, RECOGNIZED_FIELDS);
    if let Some(context) = &options.context {
        out.insert("@context".to_string(), Value::String(context.clone()));
    }

    let name = [obj.get("displayName"), obj.get("title")]
        .into_iter()
        .flatten()
        .find(|value| !is_falsy(value));
    if let Some(name) = name {
        put(&mut out, "name", name.clone());
    }

    if let Some(actor) = obj.get("actor") {
        let actor_path = child_path(path, "actor");
        let actor = convert(actor, &FromAs1Options::nested(None), &actor_path, false)?;
        put(&mut out, "actor", actor);
    }

    let is_actor = object_type.is_some_and(vocab::is_actor_object_type);

    // note attachments with a link are quoted posts, carried as tags
    let mut attachments = Vec::new();
    let mut quoted = Vec::new();
    for (index, attachment) in get_list(obj, "attachments").into_iter().enumerate() {
        let attachment_path = element_path(path, "attachments", index);
        let converted = convert(
            attachment,
            &FromAs1Options::nested(None),
            &attachment_path,
            false,
        )?;
        match (quotes::quoted_href(attachment), converted) {
            (Some(href), Value::Object(quote)) => quoted.push((href, attachment, quote)),
            (_, converted) => attachments.push(converted),
        }
    }
    if top_level && is_actor {
        attachments.extend(profile_links::property_values(obj));
    }
    put(&mut out, "attachment", Value::Array(attachments));

    let authors = convert_all(obj, "author", Some("Person"), path, false)?;
    put(&mut out, "attributedTo", Value::Array(authors));

    // featured banners lead the image list; the icon prefers the others
    let mut images: Vec<(usize, &Value)> = get_list(obj, "image").into_iter().enumerate().collect();
    if is_actor {
        if let Some((index, icon)) = pick_icon(&images) {
            let icon = convert(
                icon,
                &FromAs1Options::nested(Some("Image")),
                &element_path(path, "image", index),
                false,
            )?;
            put(&mut out, "icon", icon);
        }
    }
    images.sort_by_key(|(_, image)| !is_featured(image));
    let images = images
        .into_iter()
        .map(|(index, image)| {
            convert(
                image,
                &FromAs1Options::nested(Some("Image")),
                &element_path(path, "image", index),
                false,
            )
        })
        .collect::<ConvertResult<Vec<_>>>()?;
    put(&mut out, "image", Value::Array(images));

    let replied_to = get_list(obj, "inReplyTo");
    let replied_to = Reference::from_list(&child_path(path, "inReplyTo"), &replied_to)?
        .iter()
        .filter_map(Reference::url)
        .map(|url| Value::String(url.to_string()))
        .collect();
    put(&mut out, "inReplyTo", Value::Array(replied_to));

    match obj.get("object") {
        Some(Value::Array(_)) => {
            let inner = convert_all(obj, "object", None, path, top_level)?;
            put(&mut out, "object", Value::Array(inner));
        }
        Some(inner) => {
            let inner_path = child_path(path, "object");
            let inner = convert(inner, &FromAs1Options::nested(None), &inner_path, top_level)?;
            put(&mut out, "object", inner);
        }
        None => {}
    }

    let mut tags = convert_all(obj, "tags", None, path, false)?;
    for (position, (href, attachment, quote)) in quoted.into_iter().enumerate() {
        let mut quote = quotes::quote_tag(quote, href);
        if position == 0 {
            if let Some(context) = &options.context {
                out.insert("@context".to_string(), quotes::quote_context(context));
            }
            for field in QUOTE_URL_FIELDS {
                out.insert(field.to_string(), Value::String(href.to_string()));
            }
            let shown_url = attachment
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .unwrap_or(href);
            if let Some(content) = quotes::with_quote_suffix(out.get("content"), shown_url) {
                out.insert("content".to_string(), Value::String(content));
                quote.insert("name".to_string(), Value::String(format!("RE: {shown_url}")));
            }
        }
        tags.push(Value::Object(quote));
    }
    put(&mut out, "tag", Value::Array(tags));

    if let Some(location) = obj.get("location") {
        let location = convert(
            location,
            &FromAs1Options::nested(Some("Place")),
            &child_path(path, "location"),
            false,
        )?;
        put(&mut out, "location", location);
    }

    if let Some(username) = obj.get("username") {
        put(&mut out, "preferredUsername", username.clone());
    }
    if let Some(mime_type) = obj.get("mimeType") {
        put(&mut out, "mediaType", mime_type.clone());
    }

    if let Some(replies) = obj.get("replies") {
        let replies_path = child_path(path, "replies");
        let replies = convert(replies, &FromAs1Options::nested(None), &replies_path, false)?;
        put(&mut out, "replies", replies);
    }

    let (to, cc) = audience(obj);
    put(&mut out, "to", to);
    put(&mut out, "cc", cc);

    let choices = get_list(obj, "options");
    if !choices.is_empty() {
        let voters = obj.get("votersCount").and_then(Value::as_f64);
        let field = if voters == Some(vote_total(&choices)) {
            "oneOf"
        } else {
            "anyOf"
        };
        let choices = convert_all(obj, "options", None, path, false)?;
        put(&mut out, field, Value::Array(choices));
    }

    let urls = object_urls(obj);
    match object_type {
        Some("mention") => {
            if let Some(first) = urls.first() {
                put(&mut out, "href", Value::String(first.clone()));
            }
        }
        _ => put(&mut out, "url", collapse_urls(urls)),
    }

    match object_type {
        Some("audio") | Some("video") => apply_stream(obj, &mut out),
        _ => {
            if let Some(stream) = obj.get("stream") {
                put(&mut out, "stream", stream.clone());
            }
        }
    }

    if verb == Some("stop-following") {
        as2_type = Some("Undo".to_string());
        let mut follow = Object::new();
        follow.insert("type".to_string(), Value::String("Follow".to_string()));
        for key in ["actor", "object"] {
            if let Some(id) = obj.get(key).and_then(id_of) {
                follow.insert(key.to_string(), Value::String(id));
            }
        }
        put(&mut out, "object", Value::Object(follow));
    }

    if let Some(as2_type) = as2_type {
        put(&mut out, "type", Value::String(as2_type));
    }

    let out = trim_object(out);
    if out.len() == 1 {
        if let Some(Value::String(url)) = out.get("url") {
            return Ok(Value::String(url.clone()));
        }
    }
    Ok(Value::Object(out))
}

fn convert_all(
    obj: &Object,
    field: &str,
    default_type: Option<&str>,
    path: &str,
    top_level: bool,
) -> ConvertResult<Vec<Value>> {
    let options = FromAs1Options::nested(default_type);
    get_list(obj, field)
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            convert(value, &options, &element_path(path, field, index), top_level)
        })
        .collect()
}

/// AS1 `url` and `urls` entries, as strings or `{value}` objects, deduplicated.
fn object_urls(obj: &Object) -> Vec<String> {
    let links = get_list(obj, "url").into_iter().chain(get_list(obj, "urls"));
    dedupe(links.filter_map(|link| match link {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => ["value", "url", "href"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }))
}

fn collapse_urls(mut urls: Vec<String>) -> Value {
    match urls.len() {
        0 => Value::Null,
        1 => Value::String(urls.remove(0)),
        _ => Value::Array(urls.into_iter().map(Value::String).collect()),
    }
}

/// Sorted AS2 `to`/`cc` id lists, with `@public`/`@unlisted` aliases mapped
/// onto the public collection.
fn audience(obj: &Object) -> (Value, Value) {
    let mut to = audience_ids(obj, "to");
    let mut cc = audience_ids(obj, "cc");

    let aliases: Vec<&str> = get_list(obj, "to")
        .into_iter()
        .filter_map(|value| value.get("alias").and_then(Value::as_str))
        .collect();
    let public = PUBLIC_AUDIENCE.to_string();
    if aliases.contains(&"@public") {
        if !to.contains(&public) {
            to.push(public);
        }
    } else if aliases.contains(&"@unlisted") && !cc.contains(&public) {
        cc.push(public);
    }

    let as_values = |ids: Vec<String>| Value::Array(ids.into_iter().map(Value::String).collect());
    (as_values(to), as_values(cc))
}

fn audience_ids(obj: &Object, key: &str) -> Vec<String> {
    let mut ids: Vec<String> = get_list(obj, key)
        .into_iter()
        .filter_map(id_of)
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn vote_total(choices: &[&Value]) -> f64 {
    choices
        .iter()
        .filter_map(|choice| choice.pointer("/replies/totalItems"))
        .filter_map(Value::as_f64)
        .sum()
}

/// First non-featured image Mastodon accepts as an avatar, else the first
/// non-featured image, else the first featured one.
fn pick_icon<'a>(images: &[(usize, &'a Value)]) -> Option<(usize, &'a Value)> {
    let mut plain = images.iter().copied().filter(|(_, image)| !is_featured(image));
    let first_plain = plain.clone().next();
    plain
        .find(|(_, image)| is_icon_candidate(image))
        .or(first_plain)
        .or_else(|| images.first().copied())
}

/// Banner/header images are tagged with the nonstandard `featured` objectType.
fn is_featured(image: &Value) -> bool {
    image.get("objectType").and_then(Value::as_str) == Some("featured")
}

fn is_icon_candidate(image: &Value) -> bool {
    let mime_ok = image
        .get("mimeType")
        .and_then(Value::as_str)
        .is_some_and(|mime| ICON_MIME_TYPES.contains(&mime));
    let url = match image {
        Value::String(url) => Some(url.as_str()),
        Value::Object(map) => map.get("url").and_then(Value::as_str),
        _ => None,
    };
    let extension_ok = url
        .and_then(|url| Url::parse(url).ok())
        .and_then(|parsed| {
            Path::new(parsed.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
        })
        .is_some_and(|ext| ICON_EXTENSIONS.contains(&ext.as_str()));
    mime_ok || extension_ok
}

/// Moves the first AS1 `stream` of audio/video objects onto AS2 fields.
fn apply_stream(obj: &Object, out: &mut Object) {
    let stream = match get_first(obj, "stream").and_then(Value::as_object) {
        Some(stream) => stream,
        None => return,
    };

    if let Some(url) = stream.get("url") {
        put(out, "url", url.clone());
    }
    if let Some(size) = stream.get("size") {
        put(out, "size", size.clone());
    }
    match stream.get("duration") {
        None | Some(Value::Null) => {}
        Some(Value::Number(seconds)) => match seconds.as_f64() {
            Some(seconds) if seconds >= 0.0 => {
                put(out, "duration", Value::String(to_iso8601_duration(seconds as u64)));
            }
            _ => warn_duration(seconds),
        },
        Some(other) => warn_duration(other),
    }
}

fn warn_duration(duration: impl std::fmt::Display) {
    warn!(
        "event=duration_dropped module=from_as1 status=warn reason=expected_seconds value={}",
        duration
    );
}
