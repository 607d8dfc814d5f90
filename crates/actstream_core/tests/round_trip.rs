use actstream_core::{from_as1, to_as1, FromAs1Options, ToAs1Options};
use serde_json::{json, Value};

fn round_trip(as1: Value, options: &FromAs1Options) -> Value {
    let as2 = from_as1(&as1, options).expect("AS1 -> AS2 should succeed");
    Value::Object(to_as1(&as2, &ToAs1Options::default()).expect("AS2 -> AS1 should succeed"))
}

#[test]
fn url_only_object_survives_round_trip() {
    let input = json!({"url": "http://x"});
    assert_eq!(round_trip(input.clone(), &FromAs1Options::default()), input);
    assert_eq!(
        round_trip(input.clone(), &FromAs1Options::default().without_context()),
        input
    );
}

#[test]
fn simple_note_survives_round_trip() {
    let input = json!({
        "objectType": "note",
        "id": "tag:example.com:1",
        "displayName": "Hello",
        "content": "<p>hi</p>",
        "url": "http://example.com/1"
    });
    assert_eq!(round_trip(input.clone(), &FromAs1Options::default()), input);
}

#[test]
fn like_activity_survives_round_trip() {
    let input = json!({
        "objectType": "activity",
        "verb": "like",
        "object": {"url": "http://example.com/post"}
    });
    assert_eq!(round_trip(input.clone(), &FromAs1Options::default()), input);
}

#[test]
fn multiple_urls_survive_round_trip() {
    let input = json!({"url": "http://a", "urls": [{"value": "http://b"}]});
    let as2 = from_as1(&input, &FromAs1Options::default().without_context())
        .expect("AS1 -> AS2 should succeed");
    assert_eq!(as2, json!({"url": ["http://a", "http://b"]}));

    let as1 = to_as1(&as2, &ToAs1Options::default()).expect("AS2 -> AS1 should succeed");
    assert_eq!(
        Value::Object(as1),
        json!({"url": "http://a", "urls": ["http://a", "http://b"]})
    );
}
