// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Start and end (inclusive) of the UTC calendar day containing `now`.
pub fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now);
    let end = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), 23, 59, 59)
        .single()
        .unwrap_or(now);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_cover_full_day() {
        let now = "2026-08-07T13:45:00Z".parse::<DateTime<Utc>>().unwrap();
        let (start, end) = utc_day_bounds(now);

        assert_eq!(format_utc_rfc3339(start), "2026-08-07T00:00:00Z");
        assert_eq!(format_utc_rfc3339(end), "2026-08-07T23:59:59Z");
        assert!(start <= now && now <= end);
    }
}
