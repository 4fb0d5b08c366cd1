use chrono::{NaiveDateTime, Utc};

/// Wall-clock format used for generated instant timestamps: yyyyMMddHHmmssSSS.
pub const INSTANT_TIME_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Format the current UTC time as an instant timestamp string.
pub fn wallclock_instant() -> String {
    Utc::now().format(INSTANT_TIME_FORMAT).to_string()
}

/// Interpret an instant timestamp as epoch seconds (UTC).
///
/// Two shapes are recognized: the 17-digit wall-clock format produced by
/// [`wallclock_instant`], and plain integers treated as epoch seconds (the
/// logical-clock form used throughout the tests). Anything else is `None`.
pub fn instant_epoch_seconds(timestamp: &str) -> Option<i64> {
    let s = timestamp.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() == 17 {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, INSTANT_TIME_FORMAT) {
            return Some(dt.and_utc().timestamp());
        }
    }
    s.parse::<i64>().ok()
}
