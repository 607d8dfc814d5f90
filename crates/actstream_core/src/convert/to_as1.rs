//! ActivityStreams 2 -> 1 conversion.

use super::error::{ConvertError, ConvertResult};
use super::options::ToAs1Options;
use super::quotes::{self, QUOTE_URL_FIELDS};
use super::{child_path, element_path, passthrough, profile_links, put};
use crate::audience::object_address;
use crate::links::get_urls;
use crate::model::is_public_audience;
use crate::model::reference::Reference;
use crate::util::duration::parse_iso8601_duration;
use crate::util::json::{get_first, get_list, is_falsy, kind_name, trim_object, Object};
use crate::vocab;
use log::warn;
use serde_json::{json, Number, Value};

/// AS2 keys rewritten by this converter. Everything else passes through.
const RECOGNIZED_FIELDS: &[&str] = &[
    "@context",
    "_misskey_quote",
    "actor",
    "anyOf",
    "attachment",
    "attributedTo",
    "cc",
    "icon",
    "image",
    "inReplyTo",
    "latitude",
    "location",
    "longitude",
    "mediaType",
    "name",
    "object",
    "objectType",
    "oneOf",
    "preferredUsername",
    "quoteUrl",
    "replies",
    "tag",
    "to",
    "type",
    "url",
    "verb",
];

const MEDIA_PREFIXES: &[&str] = &["audio", "image", "video"];

/// Converts an AS2 activity or object to AS1.
///
/// Falsy input yields an empty mapping and a bare string yields `{url}`.
/// Nested values are converted with default options, except images, which
/// never carry `objectType`/`verb`. Bare `actor` and `attributedTo` strings
/// are ids and become `{id}`; an actor left with only its id collapses back
/// to the string.
///
/// # Errors
/// - `ConvertError::InvalidInputType` when the root, or any nested value the
///   converter recurses into, is neither an object nor a string.
pub fn to_as1(obj: &Value, options: &ToAs1Options) -> ConvertResult<Object> {
    convert(obj, options, "$")
}

fn convert(value: &Value, options: &ToAs1Options, path: &str) -> ConvertResult<Object> {
    if is_falsy(value) {
        return Ok(Object::new());
    }
    match value {
        Value::String(url) => Ok(link_object(url)),
        Value::Object(obj) => convert_object(obj, options, path),
        other => Err(ConvertError::invalid_input(
            path,
            "object or string",
            kind_name(other),
        )),
    }
}

fn convert_object(obj: &Object, options: &ToAs1Options, path: &str) -> ConvertResult<Object> {
    let as2_type = match obj.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(as2_type)) => Some(as2_type.as_str()),
        Some(other) => {
            warn!(
                "event=type_ignored module=to_as1 status=warn path={} reason=not_a_string found={}",
                path,
                kind_name(other)
            );
            None
        }
    };

    let mut out = passthrough(obj, RECOGNIZED_FIELDS);
    let inner_type = get_first(obj, "object")
        .and_then(|inner| inner.get("type"))
        .and_then(Value::as_str);

    let mut object_type: Option<&str> = None;
    let mut verb: Option<&str> = None;
    if options.populate_vocabulary {
        object_type = as2_type.and_then(vocab::type_to_object_type);
        verb = as2_type.and_then(vocab::type_to_verb);

        let is_reply = obj.get("inReplyTo").is_some_and(|value| !is_falsy(value));
        if is_reply && matches!(object_type, Some("note") | Some("article")) {
            object_type = Some("comment");
        } else if inner_type == Some("Event") {
            match as2_type {
                Some("Accept") => verb = Some("rsvp-yes"),
                Some("Reject") => verb = Some("rsvp-no"),
                _ => {}
            }
        }
        if verb.is_some() && object_type.is_none() {
            object_type = Some("activity");
        }
    }

    // mediaType prefixes override the declared type for media handling
    let mut media_type = as2_type;
    if let Some(mime_type) = obj.get("mediaType").and_then(Value::as_str) {
        put(&mut out, "mimeType", Value::String(mime_type.to_string()));
        let prefix = mime_type.split('/').next().unwrap_or_default();
        if let Some(prefix) = MEDIA_PREFIXES.iter().copied().find(|known| *known == prefix) {
            media_type = vocab::object_type_to_type(prefix);
            if options.populate_vocabulary {
                object_type = Some(prefix);
            }
        }
    }

    let username = obj.get("preferredUsername").filter(|value| !is_falsy(value));
    let display_name = obj
        .get("name")
        .filter(|value| !is_falsy(value))
        .or(username)
        .cloned()
        .or_else(|| {
            object_type
                .filter(|object_type| vocab::is_actor_object_type(object_type))
                .and_then(|_| object_address(obj))
                .map(Value::String)
        });
    if let Some(display_name) = display_name {
        put(&mut out, "displayName", display_name);
    }
    if let Some(username) = username {
        put(&mut out, "username", username.clone());
    }

    let actor = match obj.get("actor") {
        Some(actor) => convert_actor(actor, &child_path(path, "actor"))?,
        None => Object::new(),
    };
    put(&mut out, "actor", actor_value(&actor));

    let is_actor = as2_type.is_some_and(vocab::is_actor_type);
    let mut attachments = convert_all(obj, "attachment", path, is_actor)?;

    let images = convert_images(obj, path)?;
    put(&mut out, "image", objects(images));

    let replied_to = get_list(obj, "inReplyTo");
    let replied_to = Reference::from_list(&child_path(path, "inReplyTo"), &replied_to)?
        .into_iter()
        .enumerate()
        .map(|(index, reference)| {
            convert_reference(reference, &element_path(path, "inReplyTo", index))
        })
        .collect::<ConvertResult<Vec<_>>>()?;
    put(&mut out, "inReplyTo", objects(replied_to));

    if let Some(location) = obj.get("location") {
        let location_path = child_path(path, "location");
        if let Some(reference) = Reference::from_value(&location_path, location)? {
            let location = convert_reference(reference, &location_path)?;
            put(&mut out, "location", Value::Object(location));
        }
    }

    let mut inner = convert_all(obj, "object", path, is_actor)?;
    if matches!(as2_type, Some("Create") | Some("Update")) && !actor.is_empty() {
        for inner_obj in inner.iter_mut() {
            attribute_to_actor(inner_obj, &actor);
        }
    }
    let followed = (options.populate_vocabulary && as2_type == Some("Undo") && inner.len() == 1)
        .then(|| unfollowed_id(&inner[0]))
        .flatten();
    match followed {
        Some(followed) => {
            verb = Some("stop-following");
            put(&mut out, "object", Value::String(followed));
        }
        None if inner.len() == 1 => put(&mut out, "object", Value::Object(inner.remove(0))),
        None => put(&mut out, "object", objects(inner)),
    }

    // Link tags with an ActivityStreams media type are quoted posts
    let mut tags = Vec::new();
    let mut quote_urls: Vec<String> = Vec::new();
    for (index, tag) in get_list(obj, "tag").into_iter().enumerate() {
        let tag_path = element_path(path, "tag", index);
        let mut converted = convert(tag, &ToAs1Options::default(), &tag_path)?;
        let Some(url) = quotes::quoted_link(tag) else {
            tags.push(converted);
            continue;
        };
        converted.remove("href");
        converted.remove("displayName");
        converted.remove("mimeType");
        converted.insert("objectType".to_string(), Value::String("note".to_string()));
        converted.insert("id".to_string(), Value::String(url.to_string()));
        attachments.push(converted);
        if let Some(Value::String(content)) = out.get("content") {
            let stripped = quotes::strip_quote_suffix(content, url);
            out.insert("content".to_string(), Value::String(stripped));
        }
        quote_urls.push(url.to_string());
    }
    put(&mut out, "tags", objects(tags));

    for field in QUOTE_URL_FIELDS {
        let Some(url) = obj.get(*field).and_then(Value::as_str) else {
            continue;
        };
        if url.is_empty() || quote_urls.iter().any(|seen| seen == url) {
            continue;
        }
        let mut quote = link_object(url);
        quote.insert("objectType".to_string(), Value::String("note".to_string()));
        attachments.push(quote);
        quote_urls.push(url.to_string());
    }
    put(&mut out, "attachments", objects(attachments));

    let mut choices = convert_all(obj, "anyOf", path, is_actor)?;
    choices.extend(convert_all(obj, "oneOf", path, is_actor)?);
    put(&mut out, "options", objects(choices));

    if let Some(replies) = obj.get("replies") {
        let replies = convert(replies, &ToAs1Options::default(), &child_path(path, "replies"))?;
        put(&mut out, "replies", Value::Object(replies));
    }

    let (to, cc) = audience(obj);
    put(&mut out, "to", to);
    put(&mut out, "cc", cc);

    // profile link names from PropertyValue attachments label matching urls
    let link_names = profile_links::link_names(obj);
    let urls: Vec<Value> = get_urls(obj, "url")
        .into_iter()
        .map(|url| match link_names.get(&url) {
            Some(name) => json!({"displayName": name, "value": url}),
            None => Value::String(url),
        })
        .collect();
    if let Some(first) = urls.first() {
        put(&mut out, "url", first.clone());
    }
    if urls.len() > 1 {
        put(&mut out, "urls", Value::Array(urls));
    }

    for field in ["latitude", "longitude"] {
        if let Some(coordinate) = coordinate(obj, field, path) {
            out.insert(field.to_string(), Value::Number(coordinate));
        }
    }

    match media_type {
        Some(media @ ("Audio" | "Video")) => {
            let link = link_stream(obj, media);
            move_into_stream(obj, &mut out, link, path);
        }
        Some("Mention") => {
            if let Some(href) = out.remove("href") {
                put(&mut out, "url", href);
            }
        }
        _ => {}
    }

    let authors = get_list(obj, "attributedTo");
    if let Some((first, dropped)) = authors.split_first() {
        if !dropped.is_empty() {
            let dropped: Vec<Value> = dropped.iter().map(|value| (*value).clone()).collect();
            warn_lossy(path, "attributedTo", &Value::Array(dropped));
        }
        let author = convert_actor(first, &child_path(path, "attributedTo"))?;
        match out.get_mut("author") {
            Some(Value::Object(existing)) => existing.extend(author),
            _ => put(&mut out, "author", Value::Object(author)),
        }
    }

    if let Some(object_type) = object_type {
        put(&mut out, "objectType", Value::String(object_type.to_string()));
    }
    if let Some(verb) = verb {
        put(&mut out, "verb", Value::String(verb.to_string()));
    }

    Ok(trim_object(out))
}

/// Converts every value of a list field. Actors skip their `PropertyValue`
/// profile fields, which come back as named urls instead.
fn convert_all(
    obj: &Object,
    field: &str,
    path: &str,
    skip_profile_links: bool,
) -> ConvertResult<Vec<Object>> {
    let options = ToAs1Options::default();
    get_list(obj, field)
        .into_iter()
        .enumerate()
        .filter(|(_, value)| {
            !(skip_profile_links && profile_links::is_property_value(value))
        })
        .map(|(index, value)| convert(value, &options, &element_path(path, field, index)))
        .collect()
}

/// Actor and author references: a bare string is an id.
fn convert_actor(value: &Value, path: &str) -> ConvertResult<Object> {
    match value {
        Value::String(id) if !id.is_empty() => {
            let mut actor = Object::new();
            actor.insert("id".to_string(), Value::String(id.clone()));
            Ok(actor)
        }
        other => convert(other, &ToAs1Options::default(), path),
    }
}

fn actor_value(actor: &Object) -> Value {
    match actor.get("id") {
        Some(Value::String(id)) if actor.len() == 1 => Value::String(id.clone()),
        _ => Value::Object(actor.clone()),
    }
}

/// Icons, images and image attachments, converted untyped and deduplicated
/// by url.
fn convert_images(obj: &Object, path: &str) -> ConvertResult<Vec<Object>> {
    let image_attachments = get_list(obj, "attachment").into_iter().filter(|attachment| {
        attachment.get("type").and_then(Value::as_str) == Some("Image")
            || attachment
                .get("mediaType")
                .and_then(Value::as_str)
                .is_some_and(|media_type| media_type.starts_with("image/"))
    });
    let candidates = get_list(obj, "icon")
        .into_iter()
        .chain(get_list(obj, "image"))
        .chain(image_attachments);

    let mut seen_urls: Vec<String> = Vec::new();
    let mut images = Vec::new();
    for (index, candidate) in candidates.enumerate() {
        let image_path = element_path(path, "image", index);
        let image = convert(candidate, &ToAs1Options::untyped(), &image_path)?;
        if let Some(url) = image.get("url").and_then(Value::as_str) {
            if seen_urls.iter().any(|seen| seen == url) {
                continue;
            }
            seen_urls.push(url.to_string());
        }
        images.push(image);
    }
    Ok(images)
}

fn convert_reference(reference: Reference, path: &str) -> ConvertResult<Object> {
    match reference {
        Reference::Link(url) => Ok(link_object(&url)),
        Reference::Object(obj) => convert_object(&obj, &ToAs1Options::default(), path),
    }
}

fn link_object(url: &str) -> Object {
    let mut obj = Object::new();
    obj.insert("url".to_string(), Value::String(url.to_string()));
    obj
}

fn objects(items: Vec<Object>) -> Value {
    Value::Array(items.into_iter().map(Value::Object).collect())
}

/// Copies the activity's actor over the author of a created/updated object.
fn attribute_to_actor(inner: &mut Object, actor: &Object) {
    let is_actor = inner
        .get("objectType")
        .and_then(Value::as_str)
        .is_some_and(vocab::is_actor_object_type);
    if is_actor {
        return;
    }
    if let Value::Object(author) = inner
        .entry("author")
        .or_insert_with(|| Value::Object(Object::new()))
    {
        author.extend(actor.clone());
    }
}

/// For an `Undo` wrapping a `Follow`, the id of the account that was followed.
fn unfollowed_id(inner: &Object) -> Option<String> {
    if inner.get("verb").and_then(Value::as_str) != Some("follow") {
        return None;
    }
    let followed = Reference::from_value("object", inner.get("object")?).ok()??;
    followed.id().map(str::to_string)
}

/// AS1 `to`/`cc` audience objects, with the public collection mapped onto the
/// `@public` (addressed) or `@unlisted` (cc'd) group alias in `to`.
fn audience(obj: &Object) -> (Value, Value) {
    let ids = |key: &str| {
        let mut ids: Vec<&str> = get_list(obj, key)
            .into_iter()
            .filter_map(Value::as_str)
            .collect();
        ids.sort_unstable();
        ids
    };
    let to = ids("to");
    let cc = ids("cc");

    let mut as1_to: Vec<Value> = to.iter().map(|id| json!({ "id": id })).collect();
    let as1_cc: Vec<Value> = cc.iter().map(|id| json!({ "id": id })).collect();
    if to.iter().any(|id| is_public_audience(id)) {
        as1_to.push(json!({"objectType": "group", "alias": "@public"}));
    } else if cc.iter().any(|id| is_public_audience(id)) {
        as1_to.push(json!({"objectType": "group", "alias": "@unlisted"}));
    }
    (Value::Array(as1_to), Value::Array(as1_cc))
}

/// Numeric coordinate, accepting numeric strings. Anything else is dropped.
fn coordinate(obj: &Object, field: &str, path: &str) -> Option<Number> {
    let parsed = match obj.get(field)? {
        Value::Null => return None,
        Value::Number(number) => return Some(number.clone()),
        Value::String(text) if text.trim().is_empty() => return None,
        Value::String(text) => text.trim().parse::<f64>().ok().and_then(Number::from_f64),
        _ => None,
    };
    if parsed.is_none() {
        warn!(
            "event=coordinate_dropped module=to_as1 status=warn path={} field={} reason={}",
            path, field, "expected_float"
        );
    }
    parsed
}

/// Stream declared by a media `Link` url: the first of its tags whose
/// `mediaType` matches the object's media kind.
fn link_stream(obj: &Object, media: &str) -> Option<Object> {
    let kind = media.to_ascii_lowercase();
    get_list(obj, "url")
        .into_iter()
        .filter_map(Value::as_object)
        .flat_map(|link| get_list(link, "tag"))
        .find_map(|tag| {
            let media_type = tag.get("mediaType").and_then(Value::as_str)?;
            if media_type.split('/').next() != Some(kind.as_str()) {
                return None;
            }
            let mut stream = Object::new();
            put(&mut stream, "mimeType", Value::String(media_type.to_string()));
            if let Some(href) = tag.get("href") {
                put(&mut stream, "url", href.clone());
            }
            Some(stream)
        })
}

/// Moves an audio/video object's `url`, `size` and `duration` into `stream`,
/// filling only what a link-declared stream left unset.
fn move_into_stream(obj: &Object, out: &mut Object, link: Option<Object>, path: &str) {
    let mut stream = link.unwrap_or_default();
    if let Some(size) = out.remove("size") {
        if !stream.contains_key("size") {
            put(&mut stream, "size", size);
        }
    }
    out.remove("duration");
    let seconds = match obj.get("duration") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(Value::String(text)) => {
            let parsed = parse_iso8601_duration(text);
            if parsed.is_none() {
                warn_duration(path, "unparsable");
            }
            parsed
        }
        Some(other) => {
            warn_duration(path, kind_name(other));
            None
        }
    };
    let seconds = seconds.filter(|seconds| *seconds > 0.0);
    if let Some(seconds) = seconds {
        let seconds = if seconds.fract() == 0.0 {
            Some(Number::from(seconds as u64))
        } else {
            Number::from_f64(seconds)
        };
        if let Some(seconds) = seconds {
            stream.insert("duration".to_string(), Value::Number(seconds));
        }
    }
    if let Some(url) = out.remove("url") {
        if !stream.contains_key("url") {
            put(&mut stream, "url", url);
        }
    }
    put(out, "stream", Value::Object(stream));
}

fn warn_lossy(path: &str, field: &str, dropped: &Value) {
    warn!(
        "event=lossy_conversion module=to_as1 status=warn path={} field={} kept=1 dropped={}",
        path, field, dropped
    );
}

fn warn_duration(path: &str, reason: &str) {
    warn!(
        "event=duration_dropped module=to_as1 status=warn path={} reason={} expected=iso8601",
        path, reason
    );
}
