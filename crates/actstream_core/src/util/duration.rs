//! ISO 8601 duration helpers for media `duration` fields.
//!
//! AS1 stores durations as whole seconds, AS2 as ISO 8601 strings.

use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("valid iso8601 duration regex")
});

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Formats whole seconds as `P{days}DT{hours}H{minutes}M{seconds}S`.
pub fn to_iso8601_duration(total_seconds: u64) -> String {
    let days = total_seconds / SECONDS_PER_DAY;
    let rest = total_seconds % SECONDS_PER_DAY;
    let hours = rest / SECONDS_PER_HOUR;
    let minutes = (rest % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = rest % SECONDS_PER_MINUTE;
    format!("P{days}DT{hours}H{minutes}M{seconds}S")
}

/// Parses an ISO 8601 duration into seconds.
///
/// Supports week, day, hour, minute and (fractional) second components.
/// Year and month components are rejected since their length is ambiguous.
/// Returns `None` for unparsable or component-less input such as `P` or `PT`.
pub fn parse_iso8601_duration(value: &str) -> Option<f64> {
    let captures = DURATION_RE.captures(value.trim())?;
    let weights = [
        7.0 * SECONDS_PER_DAY as f64,
        SECONDS_PER_DAY as f64,
        SECONDS_PER_HOUR as f64,
        SECONDS_PER_MINUTE as f64,
        1.0,
    ];

    let mut matched = false;
    let mut total = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        if let Some(group) = captures.get(index + 1) {
            total += group.as_str().parse::<f64>().ok()? * weight;
            matched = true;
        }
    }

    matched.then_some(total)
}
