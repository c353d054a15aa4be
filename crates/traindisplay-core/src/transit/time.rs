//! `HH:MM` extraction and journey duration.

use core::fmt::Write as _;

use heapless::String;

pub const UNKNOWN_TIME: &str = "??:??";
const MINUTES_PER_DAY: u16 = 24 * 60;

/// `2025-01-14T15:30:00+0100` -> `15:30`.
///
/// Inputs shorter than 16 characters or without a `T` yield `??:??`.
pub fn extract_time(iso: &str) -> String<5> {
    let mut out = String::new();
    let hhmm = if iso.len() < 16 {
        None
    } else {
        iso.find('T')
            .and_then(|t| iso.get(t + 1..t + 6))
    };
    let _ = out.push_str(hhmm.unwrap_or(UNKNOWN_TIME));
    out
}

/// Minutes since midnight for a strict `HH:MM`.
pub fn parse_hhmm(text: &str) -> Option<u16> {
    let bytes = text.as_bytes();
    if bytes.len() < 5 || bytes[2] != b':' {
        return None;
    }

    let hours: u16 = text.get(0..2)?.parse().ok()?;
    let minutes: u16 = text.get(3..5)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Travel time in minutes; an arrival earlier than the departure is next day.
pub fn duration_minutes(departure: &str, arrival: &str) -> Option<u16> {
    let dep = parse_hhmm(departure)?;
    let mut arr = parse_hhmm(arrival)?;
    if arr < dep {
        arr += MINUTES_PER_DAY;
    }
    Some(arr - dep)
}

/// `1h15` from an hour upwards, `45m` below, `?` when either time is unusable.
pub fn format_duration(departure: &str, arrival: &str) -> String<8> {
    let mut out = String::new();
    match duration_minutes(departure, arrival) {
        Some(total) if total >= 60 => {
            let _ = write!(out, "{}h{:02}", total / 60, total % 60);
        }
        Some(total) => {
            let _ = write!(out, "{}m", total);
        }
        None => {
            let _ = out.push('?');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_clock_time_from_iso_timestamp() {
        assert_eq!(extract_time("2025-01-14T15:30:00+0100").as_str(), "15:30");
        assert_eq!(extract_time("2025-01-14T07:05").as_str(), "07:05");
    }

    #[test]
    fn short_or_malformed_timestamps_are_unknown() {
        assert_eq!(extract_time("15:30").as_str(), "??:??");
        assert_eq!(extract_time("2025-01-14 15:30:00").as_str(), "??:??");
        assert_eq!(extract_time("").as_str(), "??:??");
    }

    #[test]
    fn duration_wraps_across_midnight() {
        assert_eq!(format_duration("23:30", "00:45").as_str(), "1h15");
        assert_eq!(format_duration("12:00", "12:45").as_str(), "45m");
        assert_eq!(format_duration("08:00", "10:05").as_str(), "2h05");
    }

    #[test]
    fn unusable_times_give_question_mark() {
        assert_eq!(format_duration("??:??", "10:00").as_str(), "?");
        assert_eq!(format_duration("10:00", "").as_str(), "?");
        assert_eq!(parse_hhmm("25:00"), None);
    }
}
