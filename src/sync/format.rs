use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

/// Shown in place of any value that is absent or cannot be rendered
pub const PLACEHOLDER: &str = "—";

/// How timestamps are rendered into the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Render times in UTC instead of the local time zone
    pub utc_times: bool,
}

impl DisplayOptions {
    pub fn format_time(&self, iso: Option<&str>) -> String {
        if self.utc_times {
            format_time_in(iso, &Utc)
        } else {
            format_time_in(iso, &Local)
        }
    }
}

/// Format speed (bytes per second) to human-readable format
pub fn format_speed(bytes_per_sec: Option<f64>) -> String {
    const UNITS: &[&str] = &["B/s", "KB/s", "MB/s", "GB/s"];

    let Some(mut speed) = bytes_per_sec.filter(|v| v.is_finite() && *v > 0.0) else {
        return PLACEHOLDER.to_string();
    };
    let mut unit_idx = 0;

    while speed >= 1024.0 && unit_idx < UNITS.len() - 1 {
        speed /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{:.0} {}", speed, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", speed, UNITS[unit_idx])
    }
}

/// Format an ISO-8601 timestamp as `HH:MM` in the local time zone
pub fn format_time(iso: Option<&str>) -> String {
    format_time_in(iso, &Local)
}

/// Format an ISO-8601 timestamp as `HH:MM` (24-hour) in the given zone
pub fn format_time_in<Tz>(iso: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match iso.and_then(parse_timestamp) {
        Some(instant) => instant.with_timezone(tz).format("%H:%M").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Parse RFC 3339 (with offset or `Z`); offset-less date-times and plain dates
/// are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_speed_placeholder_cases() {
        assert_eq!(format_speed(None), PLACEHOLDER);
        assert_eq!(format_speed(Some(0.0)), PLACEHOLDER);
        assert_eq!(format_speed(Some(-10.0)), PLACEHOLDER);
        assert_eq!(format_speed(Some(f64::NAN)), PLACEHOLDER);
        assert_eq!(format_speed(Some(f64::INFINITY)), PLACEHOLDER);
        assert_eq!(format_speed(Some(f64::NEG_INFINITY)), PLACEHOLDER);
    }

    #[test]
    fn test_format_speed_units() {
        assert_eq!(format_speed(Some(500.0)), "500 B/s");
        assert_eq!(format_speed(Some(1023.0)), "1023 B/s");
        assert_eq!(format_speed(Some(1024.0)), "1.00 KB/s");
        assert_eq!(format_speed(Some(2048.0)), "2.00 KB/s");
        assert_eq!(format_speed(Some(1048576.0 * 1.5)), "1.50 MB/s");
        assert_eq!(format_speed(Some(3.0 * 1024.0 * 1024.0 * 1024.0)), "3.00 GB/s");
    }

    #[test]
    fn test_format_speed_stops_at_largest_unit() {
        let tb = 1024.0_f64.powi(4);
        assert_eq!(format_speed(Some(2.0 * tb)), "2048.00 GB/s");
    }

    #[test]
    fn test_format_speed_fractional_bytes() {
        assert_eq!(format_speed(Some(0.4)), "0 B/s");
        assert_eq!(format_speed(Some(12.6)), "13 B/s");
    }

    #[test]
    fn test_format_time_placeholder_cases() {
        assert_eq!(format_time_in(None, &Utc), PLACEHOLDER);
        assert_eq!(format_time_in(Some(""), &Utc), PLACEHOLDER);
        assert_eq!(format_time_in(Some("not a date"), &Utc), PLACEHOLDER);
        assert_eq!(format_time_in(Some("2024-13-45T99:00:00Z"), &Utc), PLACEHOLDER);
    }

    #[test]
    fn test_format_time_utc() {
        assert_eq!(format_time_in(Some("2024-03-01T07:05:59Z"), &Utc), "07:05");
        assert_eq!(format_time_in(Some("2024-03-01T23:59:00.123456789Z"), &Utc), "23:59");
    }

    #[test]
    fn test_format_time_converts_zone() {
        let kyiv = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_time_in(Some("2024-03-01T23:30:00Z"), &kyiv), "01:30");
        assert_eq!(format_time_in(Some("2024-03-01T10:00:00+02:00"), &Utc), "08:00");
    }

    #[test]
    fn test_format_time_naive_inputs_are_utc() {
        assert_eq!(format_time_in(Some("2024-03-01T10:15:30"), &Utc), "10:15");
        assert_eq!(format_time_in(Some("2024-03-01T10:15:30.250"), &Utc), "10:15");
        assert_eq!(format_time_in(Some("2024-03-01T10:15"), &Utc), "10:15");
        assert_eq!(format_time_in(Some("2024-03-01"), &Utc), "00:00");
    }

    #[test]
    fn test_format_time_local_is_two_fields() {
        let rendered = format_time(Some("2024-03-01T10:15:30Z"));
        let parts: Vec<&str> = rendered.split(':').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_display_options_select_zone() {
        let options = DisplayOptions { utc_times: true };
        assert_eq!(options.format_time(Some("2024-03-01T07:05:00Z")), "07:05");
        assert_eq!(options.format_time(None), PLACEHOLDER);
    }
}
