use chrono::{DateTime, Duration, SecondsFormat, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`
pub fn now_rfc3339() -> String {
    now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Absolute expiry instant for a lifetime reported in seconds.
pub fn expires_at_after(lifetime_seconds: u64) -> DateTime<Utc> {
    let lifetime = i64::try_from(lifetime_seconds).unwrap_or(i64::MAX);
    let lifetime = Duration::try_seconds(lifetime).unwrap_or(Duration::MAX);
    now().checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
