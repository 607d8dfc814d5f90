//! Activity/object tree model shared by both dialects.
//!
//! # Responsibility
//! - Name the protocol constants both dialects refer to.
//! - Define explicit variants for polymorphic field values.
//!
//! # Invariants
//! - Trees are plain `serde_json` values; the role of a tree (activity or
//!   object) is inferred from its fields, never from a tag.
//! - Converters borrow trees and build new ones; inputs are never mutated.

pub mod reference;

/// JSON-LD context URI stamped on top-level AS2 objects.
pub const CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

/// ActivityPub content type.
pub const CONTENT_TYPE: &str = "application/activity+json";
/// Generic JSON-LD content type.
pub const CONTENT_TYPE_LD: &str = "application/ld+json";
/// JSON-LD content type carrying the ActivityStreams profile.
pub const CONTENT_TYPE_LD_PROFILE: &str =
    "application/ld+json; profile=\"https://www.w3.org/ns/activitystreams\"";
/// Content types accepted as ActivityStreams 2 documents.
pub const CONTENT_TYPES: &[&str] = &[CONTENT_TYPE, CONTENT_TYPE_LD];

/// JSON-LD term Misskey uses for the quoted post of a note.
pub const MISSKEY_QUOTE_TERM: &str = "_misskey_quote";
/// IRI the `_misskey_quote` term expands to.
pub const MISSKEY_QUOTE_IRI: &str = "https://misskey-hub.net/ns#_misskey_quote";

/// Canonical public collection id.
pub const PUBLIC_AUDIENCE: &str = "https://www.w3.org/ns/activitystreams#Public";
/// Every spelling of the public collection seen in the wild.
pub const PUBLICS: &[&str] = &[PUBLIC_AUDIENCE, "as:Public", "Public"];

/// Returns whether an audience value names the public collection.
pub fn is_public_audience(value: &str) -> bool {
    PUBLICS.contains(&value)
}
