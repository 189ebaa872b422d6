/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one day. Upper bound for time-range order queries.
pub const DAY_MILLIS: i64 = 86_400_000;
