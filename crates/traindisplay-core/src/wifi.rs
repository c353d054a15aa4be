//! Radio-independent WiFi records shared by the screens and the board layer.

use heapless::{String, Vec};

use crate::{
    config::{PASSWORD_CHARS, SSID_CHARS, WIFI_SCAN_MAX_NETWORKS},
    text::bounded,
};

pub type NetworkList = Vec<NetworkRecord, WIFI_SCAN_MAX_NETWORKS>;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Credentials {
    pub ssid: String<SSID_CHARS>,
    pub password: String<PASSWORD_CHARS>,
}

impl Credentials {
    pub fn new(ssid: &str, password: &str) -> Self {
        Self {
            ssid: bounded(ssid),
            password: bounded(password),
        }
    }
}

/// One scan result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkRecord {
    pub ssid: String<SSID_CHARS>,
    pub rssi: i8,
    pub secure: bool,
}

impl NetworkRecord {
    pub fn new(ssid: &str, rssi: i8, secure: bool) -> Self {
        Self {
            ssid: bounded(ssid),
            rssi,
            secure,
        }
    }

    /// Coarse 0..=4 signal bars.
    pub fn bars(&self) -> u8 {
        match self.rssi {
            r if r >= -55 => 4,
            r if r >= -65 => 3,
            r if r >= -75 => 2,
            r if r >= -85 => 1,
            _ => 0,
        }
    }
}

/// Builds the on-screen list: hidden SSIDs dropped, duplicates collapsed to
/// the strongest, strongest first, capped at the scan limit.
pub fn collect_networks<I>(raw: I) -> NetworkList
where
    I: IntoIterator<Item = NetworkRecord>,
{
    let mut list = NetworkList::new();

    for record in raw {
        if record.ssid.is_empty() {
            continue;
        }

        if let Some(existing) = list.iter_mut().find(|n| n.ssid == record.ssid) {
            if record.rssi > existing.rssi {
                *existing = record;
            }
            continue;
        }

        if list.is_full() {
            // Replace the weakest entry when a stronger network shows up late.
            let weakest = list
                .iter()
                .enumerate()
                .min_by_key(|(_, n)| n.rssi)
                .map(|(i, n)| (i, n.rssi));
            if let Some((index, rssi)) = weakest
                && record.rssi > rssi
            {
                list[index] = record;
            }
            continue;
        }

        let _ = list.push(record);
    }

    list.sort_unstable_by(|a, b| b.rssi.cmp(&a.rssi));
    list
}

/// Connection state the UI cares about.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LinkStatus {
    pub connected: bool,
    pub rssi: Option<i8>,
}

/// One time budget shared by every stage of a connect attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectDeadline {
    expires_ms: u64,
}

impl ConnectDeadline {
    pub const fn starting_at(now_ms: u64, budget_ms: u64) -> Self {
        Self {
            expires_ms: now_ms.saturating_add(budget_ms),
        }
    }

    /// Time left, or `None` once the budget is spent.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let left = self.expires_ms.saturating_sub(now_ms);
        (left > 0).then_some(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WIFI_CONNECT_TIMEOUT_MS;

    #[test]
    fn duplicates_keep_strongest_and_sort_descending() {
        let list = collect_networks([
            NetworkRecord::new("cafe", -80, false),
            NetworkRecord::new("home", -60, true),
            NetworkRecord::new("cafe", -50, false),
            NetworkRecord::new("", -40, true),
        ]);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].ssid.as_str(), "cafe");
        assert_eq!(list[0].rssi, -50);
        assert_eq!(list[1].ssid.as_str(), "home");
    }

    #[test]
    fn list_is_capped_at_scan_limit() {
        let mut raw = std::vec::Vec::new();
        for i in 0..30 {
            let name = std::format!("net{}", i);
            raw.push(NetworkRecord::new(&name, -90 + i as i8, true));
        }

        let list = collect_networks(raw);
        assert_eq!(list.len(), WIFI_SCAN_MAX_NETWORKS);
        assert_eq!(list[0].ssid.as_str(), "net29");
        assert!(list.iter().all(|n| n.rssi >= -80));
    }

    #[test]
    fn signal_bars_follow_rssi() {
        assert_eq!(NetworkRecord::new("a", -50, true).bars(), 4);
        assert_eq!(NetworkRecord::new("a", -70, true).bars(), 2);
        assert_eq!(NetworkRecord::new("a", -95, true).bars(), 0);
    }

    #[test]
    fn later_stages_only_get_what_association_left() {
        let deadline = ConnectDeadline::starting_at(1_000, WIFI_CONNECT_TIMEOUT_MS);

        assert_eq!(deadline.remaining_ms(1_000), Some(WIFI_CONNECT_TIMEOUT_MS));
        // Association took 7.5 s, DHCP may only use the rest.
        assert_eq!(deadline.remaining_ms(8_500), Some(2_500));
        assert_eq!(deadline.remaining_ms(11_000), None);
        assert_eq!(deadline.remaining_ms(60_000), None);
    }
}
