//! AS1 <-> AS2 vocabulary tables.
//!
//! # Responsibility
//! - Map AS1 `objectType` and `verb` values onto AS2 `type` values.
//! - Provide the inverse lookups used by AS2 -> AS1 conversion.
//!
//! # Invariants
//! - Tables are immutable after first use and shared process-wide.
//! - Inverse lookups keep the first pair seen for each AS2 type, so each
//!   table lists the canonical AS1 term before its aliases.

use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// AS1 `objectType` -> AS2 `type`.
///
/// `note` precedes `comment` so `Note` inverts to `note`; replies are
/// recovered as `comment` from `inReplyTo` during conversion.
pub const OBJECT_TYPE_TO_TYPE: &[(&str, &str)] = &[
    ("application", "Application"),
    ("article", "Article"),
    ("audio", "Audio"),
    ("collection", "Collection"),
    ("note", "Note"),
    ("comment", "Note"),
    ("event", "Event"),
    ("flag", "Flag"),
    ("group", "Group"),
    ("hashtag", "Tag"),
    ("image", "Image"),
    ("link", "Link"),
    ("mention", "Mention"),
    ("organization", "Organization"),
    ("page", "Page"),
    ("person", "Person"),
    ("place", "Place"),
    ("question", "Question"),
    ("service", "Service"),
    ("video", "Video"),
];

/// AS1 `verb` -> AS2 `type`.
///
/// Generic verbs (`accept`, `add`, `reject`) precede the RSVP and tagging
/// verbs that share their AS2 type.
pub const VERB_TO_TYPE: &[(&str, &str)] = &[
    ("accept", "Accept"),
    ("add", "Add"),
    ("block", "Block"),
    ("delete", "Delete"),
    ("favorite", "Favorite"),
    ("follow", "Follow"),
    ("invite", "Invite"),
    ("like", "Like"),
    ("post", "Create"),
    ("reject", "Reject"),
    ("rsvp-maybe", "TentativeAccept"),
    ("rsvp-no", "Reject"),
    ("rsvp-yes", "Accept"),
    ("share", "Announce"),
    ("tag", "Add"),
    ("undo", "Undo"),
    ("update", "Update"),
];

/// AS1 object types that represent actors.
pub const ACTOR_OBJECT_TYPES: &[&str] =
    &["application", "group", "organization", "person", "service"];

struct Vocabulary {
    object_type_to_type: HashMap<&'static str, &'static str>,
    verb_to_type: HashMap<&'static str, &'static str>,
    type_to_object_type: HashMap<&'static str, &'static str>,
    type_to_verb: HashMap<&'static str, &'static str>,
}

static VOCABULARY: Lazy<Vocabulary> = Lazy::new(|| Vocabulary {
    object_type_to_type: OBJECT_TYPE_TO_TYPE.iter().copied().collect(),
    verb_to_type: VERB_TO_TYPE.iter().copied().collect(),
    type_to_object_type: invert("objectType", OBJECT_TYPE_TO_TYPE),
    type_to_verb: invert("verb", VERB_TO_TYPE),
});

fn invert(
    table: &'static str,
    pairs: &'static [(&'static str, &'static str)],
) -> HashMap<&'static str, &'static str> {
    let mut inverted = HashMap::with_capacity(pairs.len());
    for (as1, as2) in pairs {
        if let Some(kept) = inverted.get(as2) {
            debug!(
                "event=vocab_alias module=vocab status=skipped table={} type={} kept={} alias={}",
                table, as2, kept, as1
            );
            continue;
        }
        inverted.insert(*as2, *as1);
    }
    inverted
}

/// Looks up the AS2 type for an AS1 `objectType`.
pub fn object_type_to_type(object_type: &str) -> Option<&'static str> {
    VOCABULARY.object_type_to_type.get(object_type).copied()
}

/// Looks up the AS2 type for an AS1 `verb`.
pub fn verb_to_type(verb: &str) -> Option<&'static str> {
    VOCABULARY.verb_to_type.get(verb).copied()
}

/// Looks up the canonical AS1 `objectType` for an AS2 type.
pub fn type_to_object_type(as2_type: &str) -> Option<&'static str> {
    VOCABULARY.type_to_object_type.get(as2_type).copied()
}

/// Looks up the canonical AS1 `verb` for an AS2 type.
pub fn type_to_verb(as2_type: &str) -> Option<&'static str> {
    VOCABULARY.type_to_verb.get(as2_type).copied()
}

/// Resolves an AS1 term, trying the objectType table before the verb table.
pub fn resolve_type(term: &str) -> Option<&'static str> {
    object_type_to_type(term).or_else(|| verb_to_type(term))
}

/// Returns whether an AS1 `objectType` names an actor.
pub fn is_actor_object_type(object_type: &str) -> bool {
    ACTOR_OBJECT_TYPES.contains(&object_type)
}

/// Returns whether an AS2 `type` names an actor.
pub fn is_actor_type(as2_type: &str) -> bool {
    ACTOR_OBJECT_TYPES
        .iter()
        .any(|object_type| object_type_to_type(object_type) == Some(as2_type))
}

#[cfg(test)]
mod tests {
    use super::{
        is_actor_type, object_type_to_type, resolve_type, type_to_object_type, type_to_verb,
        verb_to_type, OBJECT_TYPE_TO_TYPE, VERB_TO_TYPE,
    };
    use std::collections::BTreeSet;

    fn aliases(pairs: &[(&'static str, &'static str)]) -> BTreeSet<&'static str> {
        let mut seen = BTreeSet::new();
        let mut dropped = BTreeSet::new();
        for (as1, as2) in pairs {
            if !seen.insert(*as2) {
                dropped.insert(*as1);
            }
        }
        dropped
    }

    #[test]
    fn forward_lookups_cover_every_pair() {
        for (object_type, as2_type) in OBJECT_TYPE_TO_TYPE {
            assert_eq!(object_type_to_type(object_type), Some(*as2_type));
        }
        for (verb, as2_type) in VERB_TO_TYPE {
            assert_eq!(verb_to_type(verb), Some(*as2_type));
        }
    }

    #[test]
    fn inverse_lookups_prefer_canonical_terms() {
        assert_eq!(type_to_object_type("Note"), Some("note"));
        assert_eq!(type_to_object_type("Person"), Some("person"));
        assert_eq!(type_to_verb("Accept"), Some("accept"));
        assert_eq!(type_to_verb("Reject"), Some("reject"));
        assert_eq!(type_to_verb("Add"), Some("add"));
        assert_eq!(type_to_verb("Create"), Some("post"));
        assert_eq!(type_to_verb("TentativeAccept"), Some("rsvp-maybe"));
    }

    #[test]
    fn inversion_drops_only_known_aliases() {
        assert_eq!(aliases(OBJECT_TYPE_TO_TYPE), BTreeSet::from(["comment"]));
        assert_eq!(
            aliases(VERB_TO_TYPE),
            BTreeSet::from(["rsvp-no", "rsvp-yes", "tag"])
        );
    }

    #[test]
    fn resolve_type_checks_object_types_then_verbs() {
        assert_eq!(resolve_type("person"), Some("Person"));
        assert_eq!(resolve_type("like"), Some("Like"));
        assert_eq!(resolve_type("share"), Some("Announce"));
        assert_eq!(resolve_type("unknown"), None);
    }

    #[test]
    fn actor_types_are_recognized_in_both_vocabularies() {
        assert!(is_actor_type("Person"));
        assert!(is_actor_type("Service"));
        assert!(!is_actor_type("Note"));
    }
}
