//! WiFi association, HTTP and NTP over embassy-net, plus the link snapshot
//! the UI reads without touching the radio.

pub mod http;
pub mod ntp;
pub mod wifi;

use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU32, Ordering};

use traindisplay_core::wifi::LinkStatus;

const RSSI_UNKNOWN: i8 = i8::MIN;

/// Lock-free link state shared between the network code and the UI loop.
#[derive(Debug)]
pub struct ConnectivityHandle {
    connected: AtomicBool,
    rssi: AtomicI8,
    revision: AtomicU32,
}

impl ConnectivityHandle {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            rssi: AtomicI8::new(RSSI_UNKNOWN),
            revision: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> LinkStatus {
        let rssi = self.rssi.load(Ordering::Acquire);
        LinkStatus {
            connected: self.connected.load(Ordering::Acquire),
            rssi: (rssi != RSSI_UNKNOWN).then_some(rssi),
        }
    }

    /// Bumped on every change; cheap to compare per loop.
    pub fn revision(&self) -> u32 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn mark_connected(&self, rssi: Option<i8>) {
        let mut changed = !self.connected.swap(true, Ordering::AcqRel);
        let raw = rssi.unwrap_or(RSSI_UNKNOWN);
        changed |= self.rssi.swap(raw, Ordering::AcqRel) != raw;
        if changed {
            self.bump_revision();
        }
    }

    pub fn mark_disconnected(&self) {
        let mut changed = self.connected.swap(false, Ordering::AcqRel);
        changed |= self.rssi.swap(RSSI_UNKNOWN, Ordering::AcqRel) != RSSI_UNKNOWN;
        if changed {
            self.bump_revision();
        }
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for ConnectivityHandle {
    fn default() -> Self {
        Self::new()
    }
}
