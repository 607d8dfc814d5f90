//! Audience and actor addressing helpers for AS2 trees.

use crate::links::get_url;
use crate::model::is_public_audience;
use crate::util::json::{get_first, get_list, Object};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

static PROFILE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(.+)/(users/|profile/|@)(.+)$").expect("valid profile url regex")
});

/// Returns whether an AS2 activity or object is addressed to the public.
///
/// Looks at `to` on the activity and its inner `object`; with `unlisted`,
/// `cc` counts too. Non-object input is never public.
pub fn is_public(activity: &Value, unlisted: bool) -> bool {
    let activity = match activity {
        Value::Object(map) => map,
        _ => return false,
    };
    let inner = get_first(activity, "object").and_then(Value::as_object);

    let mut fields = vec![(activity, "to")];
    if let Some(inner) = inner {
        fields.push((inner, "to"));
        if unlisted {
            fields.push((inner, "cc"));
        }
    }
    if unlisted {
        fields.push((activity, "cc"));
    }

    fields.into_iter().any(|(obj, key)| {
        get_list(obj, key)
            .into_iter()
            .filter_map(Value::as_str)
            .any(is_public_audience)
    })
}

/// Returns an actor's fediverse handle, e.g. `@alice@example.com`.
///
/// Prefers `preferredUsername` with the host of `id` (or the first url), then
/// falls back to recognizing common profile URL layouts. Accepts an actor
/// object or a bare actor id.
pub fn address(actor: &Value) -> Option<String> {
    match actor {
        Value::Object(map) => object_address(map),
        Value::String(id) => profile_url_address(id),
        _ => None,
    }
}

/// [`address`] for an actor object.
pub(crate) fn object_address(actor: &Object) -> Option<String> {
    if let Some(handle) = username_address(actor) {
        return Some(handle);
    }
    let id = actor.get("id").and_then(Value::as_str).map(str::to_string);
    id.into_iter()
        .chain(get_url(actor, "url"))
        .find_map(|url| profile_url_address(&url))
}

fn profile_url_address(url: &str) -> Option<String> {
    PROFILE_URL_RE
        .captures(url)
        .map(|captures| format!("@{}@{}", &captures[3], &captures[1]))
}

fn username_address(actor: &Object) -> Option<String> {
    let username = actor
        .get("preferredUsername")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())?;
    let host = actor
        .get("id")
        .and_then(Value::as_str)
        .and_then(authority)
        .or_else(|| get_url(actor, "url").as_deref().and_then(authority))?;
    Some(format!("@{username}@{host}"))
}

fn authority(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{address, is_public};
    use crate::model::PUBLIC_AUDIENCE;
    use serde_json::json;

    #[test]
    fn public_when_addressed_in_to() {
        assert!(is_public(&json!({"to": [PUBLIC_AUDIENCE]}), true));
        assert!(is_public(&json!({"object": {"to": "as:Public"}}), false));
        assert!(!is_public(&json!({"to": ["http://bob"]}), true));
        assert!(!is_public(&json!("http://x"), true));
    }

    #[test]
    fn unlisted_only_counts_when_requested() {
        let activity = json!({"object": {"cc": ["Public"]}});
        assert!(is_public(&activity, true));
        assert!(!is_public(&activity, false));
    }

    #[test]
    fn address_prefers_preferred_username_and_id_host() {
        let actor = json!({
            "id": "https://example.com:8443/actor",
            "preferredUsername": "alice"
        });
        assert_eq!(address(&actor).as_deref(), Some("@alice@example.com:8443"));
    }

    #[test]
    fn address_falls_back_to_profile_urls() {
        assert_eq!(
            address(&json!("https://mastodon.social/@bob")).as_deref(),
            Some("@bob@mastodon.social")
        );
        assert_eq!(
            address(&json!({"url": "https://pixel.fed/users/carol"})).as_deref(),
            Some("@carol@pixel.fed")
        );
        assert_eq!(address(&json!({"id": "tag:example.com:x"})), None);
        assert_eq!(address(&json!(null)), None);
    }
}
