//! Display formatting shared by the pages and the CLI.

use chrono::{DateTime, NaiveDate, Utc};

/// Long-form date as shown to complainants: `2024-06-08` becomes
/// `8 June 2024`. Input that is not a `YYYY-MM-DD` date (an RFC 3339
/// timestamp is also accepted) comes back unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.date_naive())
    });
    date.map_or_else(|| raw.to_string(), |d| d.format("%-d %B %Y").to_string())
}

/// Timestamp rendering for timelines and "last updated" lines.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%-d %B %Y, %H:%M UTC").to_string()
}

/// Byte count in the units upload limits are quoted in: `10485760`
/// becomes `10MB`. Sizes that are not a whole number of KB or MB are
/// shown in bytes.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn long_date() {
        assert_eq!(format_date("2024-06-08"), "8 June 2024");
        assert_eq!(format_date("2024-12-25"), "25 December 2024");
        assert_eq!(format_date("2024-06-08T14:45:00Z"), "8 June 2024");
    }

    #[test]
    fn invalid_dates_pass_through() {
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date("2024-02-30"), "2024-02-30");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 8, 14, 45, 0).unwrap();
        assert_eq!(format_timestamp(ts), "8 June 2024, 14:45 UTC");
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(10 * 1024 * 1024), "10MB");
        assert_eq!(format_size(512 * 1024), "512KB");
        assert_eq!(format_size(8), "8 bytes");
        assert_eq!(format_size(1536 * 1024 + 1), "1572865 bytes");
    }
}
