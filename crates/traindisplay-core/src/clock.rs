//! Wall clock anchored to the last NTP sync.
//!
//! The sync task stores the Unix time together with the monotonic
//! millisecond counter it was observed at; readers extrapolate from there.
//! The anchor is 64-bit and the ESP32-S3 only has 32-bit atomics, so it
//! lives behind a critical section.

use core::{cell::Cell, fmt::Write as _};

use critical_section::Mutex;
use heapless::String;
use time::{OffsetDateTime, UtcOffset};

/// Seconds since 1970-01-01 00:00:00 UTC.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// NTP counts from 1900; anything before 1970 is rejected.
    pub const fn from_ntp_seconds(ntp: u32) -> Option<Self> {
        const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;
        let seconds = ntp as i64 - NTP_TO_UNIX_SECONDS;
        if seconds >= 0 { Some(Self(seconds)) } else { None }
    }

    pub fn to_offset_datetime(self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.0)
            .ok()
            .map(|dt| dt.to_offset(offset))
    }
}

/// Local hour, minute and second.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    pub fn from_datetime(dt: &OffsetDateTime) -> Self {
        Self {
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }

    /// `HH:MM`.
    pub fn hhmm(&self) -> String<5> {
        let mut out = String::new();
        let _ = write!(out, "{:02}:{:02}", self.hour, self.minute);
        out
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Anchor {
    synced: bool,
    unix_at_sync: i64,
    mono_ms_at_sync: u64,
    offset_seconds: i32,
}

/// Anchor shared between the NTP sync and the UI.
pub struct WallClock {
    anchor: Mutex<Cell<Anchor>>,
}

impl WallClock {
    pub const fn new(offset_seconds: i32) -> Self {
        Self {
            anchor: Mutex::new(Cell::new(Anchor {
                synced: false,
                unix_at_sync: 0,
                mono_ms_at_sync: 0,
                offset_seconds,
            })),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Anchor)) {
        critical_section::with(|cs| {
            let cell = self.anchor.borrow(cs);
            let mut anchor = cell.get();
            f(&mut anchor);
            cell.set(anchor);
        });
    }

    fn snapshot(&self) -> Anchor {
        critical_section::with(|cs| self.anchor.borrow(cs).get())
    }

    pub fn set(&self, unix: UnixSeconds, now_ms: u64) {
        self.update(|anchor| {
            anchor.unix_at_sync = unix.as_i64();
            anchor.mono_ms_at_sync = now_ms;
            anchor.synced = true;
        });
    }

    pub fn set_offset_seconds(&self, offset_seconds: i32) {
        self.update(|anchor| anchor.offset_seconds = offset_seconds);
    }

    pub fn is_synced(&self) -> bool {
        self.snapshot().synced
    }

    /// Current local time, or `None` before the first sync.
    pub fn local_time(&self, now_ms: u64) -> Option<LocalTime> {
        let anchor = self.snapshot();
        if !anchor.synced {
            return None;
        }

        let elapsed_secs = now_ms.saturating_sub(anchor.mono_ms_at_sync) / 1000;
        let unix = UnixSeconds(anchor.unix_at_sync.saturating_add(elapsed_secs as i64));
        let offset = UtcOffset::from_whole_seconds(anchor.offset_seconds).unwrap_or(UtcOffset::UTC);
        unix.to_offset_datetime(offset)
            .map(|dt| LocalTime::from_datetime(&dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntp_epoch_is_shifted_to_unix() {
        assert_eq!(UnixSeconds::from_ntp_seconds(2_208_988_800), Some(UnixSeconds(0)));
        assert_eq!(UnixSeconds::from_ntp_seconds(1_000), None);
    }

    #[test]
    fn unsynced_clock_reports_nothing() {
        let clock = WallClock::new(7_200);
        assert_eq!(clock.local_time(5_000), None);
    }

    #[test]
    fn local_time_applies_offset_and_elapsed_time() {
        let clock = WallClock::new(7_200);
        // 2025-01-14 13:30:00 UTC
        clock.set(UnixSeconds(1_736_861_400), 10_000);

        let now = clock.local_time(10_000 + 65_500).unwrap();
        assert_eq!(now, LocalTime { hour: 15, minute: 31, second: 5 });
        assert_eq!(now.hhmm().as_str(), "15:31");
    }

    #[test]
    fn offset_wraps_past_midnight() {
        let clock = WallClock::new(3_600);
        // 1970-01-01 23:30:00 UTC
        clock.set(UnixSeconds(84_600), 0);
        assert_eq!(clock.local_time(0).unwrap().hhmm().as_str(), "00:30");
    }

    #[test]
    fn resync_moves_anchor_and_keeps_offset() {
        let clock = WallClock::new(0);
        clock.set(UnixSeconds(3_600), 0);
        clock.set_offset_seconds(7_200);
        // Anchor past the u32 millisecond range.
        clock.set(UnixSeconds(36_000), 5_000_000_000);

        assert!(clock.is_synced());
        let now = clock.local_time(5_000_060_000).unwrap();
        assert_eq!(now, LocalTime { hour: 12, minute: 1, second: 0 });
    }
}
