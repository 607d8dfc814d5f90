use actstream_core::{to_as1, ToAs1Options};
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::{Lazy, OnceCell};
use serde_json::{json, Value};
use std::sync::Mutex;

static RECORDS: Lazy<Mutex<Vec<(Level, String)>>> = Lazy::new(|| Mutex::new(Vec::new()));
static INSTALLED: OnceCell<()> = OnceCell::new();

struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS
            .lock()
            .expect("log capture lock")
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

fn capture_logs() {
    INSTALLED.get_or_init(|| {
        log::set_logger(&LOGGER).expect("capturing logger installs once");
        log::set_max_level(LevelFilter::Trace);
    });
}

fn warnings_for(event: &str) -> Vec<String> {
    let needle = format!("event={event} ");
    RECORDS
        .lock()
        .expect("log capture lock")
        .iter()
        .filter(|(level, message)| *level == Level::Warn && message.contains(&needle))
        .map(|(_, message)| message.clone())
        .collect()
}

#[test]
fn extra_attributed_to_values_are_dropped_with_one_warning() {
    capture_logs();

    let input = json!({
        "type": "Note",
        "attributedTo": [
            {"type": "Person", "name": "A"},
            {"type": "Person", "name": "B"}
        ]
    });
    let converted = to_as1(&input, &ToAs1Options::default()).expect("conversion should succeed");

    assert_eq!(
        converted.get("author"),
        Some(&json!({"objectType": "person", "displayName": "A"}))
    );
    assert!(converted.get("attributedTo").is_none());
    assert_eq!(converted.get("objectType"), Some(&Value::from("note")));

    let lossy = warnings_for("lossy_conversion");
    assert_eq!(lossy.len(), 1, "expected one lossy warning, got {lossy:?}");
    assert!(lossy[0].contains("\"B\""));
    assert!(lossy[0].contains("field=attributedTo"));
    assert!(!lossy[0].contains("\"A\""));
}

#[test]
fn unusable_durations_are_dropped_with_a_warning() {
    capture_logs();

    let input = json!({"type": "Video", "url": "http://v", "duration": "ninety"});
    let converted = to_as1(&input, &ToAs1Options::default()).expect("conversion should succeed");
    assert_eq!(converted.get("stream"), Some(&json!({"url": "http://v"})));

    let dropped = warnings_for("duration_dropped");
    let from_to_as1 = dropped
        .iter()
        .any(|message| message.contains("module=to_as1") && message.contains("reason=unparsable"));
    assert!(from_to_as1, "expected a duration warning, got {dropped:?}");
}
