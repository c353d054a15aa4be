//! Public-transport departures: request target, response decoding and the
//! route-keyed cache shown on the main screen.

mod parse;
pub mod time;
pub mod url;

pub use parse::parse_connections;
pub use time::{extract_time, format_duration};
pub use url::{connections_path, connections_url};

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::{
    config::{MAX_TRAINS, STATION_NAME_CHARS},
    error::{ErrorInfo, ErrorKind},
};

pub type ConnectionList = Vec<Connection, { MAX_TRAINS as usize }>;

/// One departure as displayed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Connection {
    /// `HH:MM`, or `??:??` when the timestamp was unusable.
    pub departure: String<5>,
    pub arrival: String<5>,
    pub platform: String<8>,
    /// `"IC 1715"`; empty when cancelled.
    pub train_number: String<24>,
    /// Not reported by the service; kept at zero.
    pub delay_min: u16,
    pub cancelled: bool,
    pub fetched_at_ms: u64,
}

impl Connection {
    pub fn is_valid(&self) -> bool {
        !self.departure.is_empty() && !self.cancelled
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransitError {
    /// Non-200 status line.
    Http(u16),
    /// DNS, connect, timeout or a short read.
    Network,
    /// The body did not fit the receive buffer.
    TooLarge,
    Parse,
    MissingFields,
    NoConnections,
}

impl TransitError {
    /// User-facing form; `url` and `payload` feed the detail line.
    pub fn to_error_info(self, url: &str, payload: &[u8], now_ms: u64) -> ErrorInfo {
        let mut message: String<24> = String::new();
        match self {
            Self::Http(status) => {
                let _ = write!(message, "HTTP Error: {}", status);
                ErrorInfo::new(ErrorKind::ApiRequest, &message, url, now_ms)
            }
            Self::Network => ErrorInfo::new(ErrorKind::ApiRequest, "Request failed", url, now_ms),
            Self::TooLarge => {
                ErrorInfo::new(ErrorKind::ApiParse, "Response too large", url, now_ms)
            }
            Self::Parse => ErrorInfo::new(
                ErrorKind::ApiParse,
                "JSON parse error",
                payload_prefix(payload),
                now_ms,
            ),
            Self::MissingFields => ErrorInfo::new(
                ErrorKind::ApiParse,
                "Missing times",
                payload_prefix(payload),
                now_ms,
            ),
            Self::NoConnections => {
                ErrorInfo::new(ErrorKind::NoConnections, "No connections found", "", now_ms)
            }
        }
    }
}

/// Longest valid UTF-8 prefix of the payload; `ErrorInfo` bounds it further.
fn payload_prefix(payload: &[u8]) -> &str {
    match core::str::from_utf8(payload) {
        Ok(text) => text,
        Err(err) => core::str::from_utf8(&payload[..err.valid_up_to()]).unwrap_or(""),
    }
}

/// Route the cached rows belong to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Route {
    pub from: String<STATION_NAME_CHARS>,
    pub to: String<STATION_NAME_CHARS>,
}

impl Route {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: crate::text::bounded(from),
            to: crate::text::bounded(to),
        }
    }

    pub fn matches(&self, from: &str, to: &str) -> bool {
        self.from.as_str() == from && self.to.as_str() == to
    }
}

/// Last successful fetch plus the last failure and the route it hit.
#[derive(Clone, Debug, Default)]
pub struct TransitCache {
    connections: ConnectionList,
    route: Option<Route>,
    fetched_at_ms: u64,
    last_error: ErrorInfo,
    error_route: Option<Route>,
}

impl TransitCache {
    pub const fn new() -> Self {
        Self {
            connections: Vec::new(),
            route: None,
            fetched_at_ms: 0,
            last_error: ErrorInfo::empty(),
            error_route: None,
        }
    }

    /// Replaces the rows; only called with a successful result.
    pub fn store(&mut self, route: Route, connections: ConnectionList, now_ms: u64) {
        self.connections = connections;
        self.route = Some(route);
        self.fetched_at_ms = now_ms;
        self.last_error.clear();
        self.error_route = None;
    }

    /// Keeps the previous rows untouched.
    pub fn record_error(&mut self, route: Route, error: ErrorInfo) {
        self.last_error = error;
        self.error_route = Some(route);
    }

    pub fn has_data(&self) -> bool {
        self.route.is_some() && !self.connections.is_empty()
    }

    pub fn is_fresh(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.has_data() && now_ms.saturating_sub(self.fetched_at_ms) < max_age_ms
    }

    /// Rows for `from -> to`, if that is the cached route.
    pub fn connections_for(&self, from: &str, to: &str) -> Option<&[Connection]> {
        match &self.route {
            Some(route) if route.matches(from, to) => Some(&self.connections),
            _ => None,
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn fetched_at_ms(&self) -> u64 {
        self.fetched_at_ms
    }

    pub fn last_error(&self) -> &ErrorInfo {
        &self.last_error
    }

    /// The last failure, if it was for `from -> to`.
    pub fn error_for(&self, from: &str, to: &str) -> Option<&ErrorInfo> {
        match &self.error_route {
            Some(route) if route.matches(from, to) => Some(&self.last_error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_row(departure: &str) -> ConnectionList {
        let mut list = ConnectionList::new();
        let _ = list.push(Connection {
            departure: crate::text::bounded(departure),
            ..Connection::default()
        });
        list
    }

    #[test]
    fn cache_is_keyed_by_route() {
        let mut cache = TransitCache::new();
        assert!(!cache.has_data());

        cache.store(Route::new("Lausanne", "Bern"), one_row("15:30"), 1_000);
        assert!(cache.connections_for("Lausanne", "Bern").is_some());
        assert!(cache.connections_for("Lausanne", "Geneve").is_none());
    }

    #[test]
    fn freshness_uses_fetch_time() {
        let mut cache = TransitCache::new();
        cache.store(Route::new("A", "B"), one_row("10:00"), 1_000);

        assert!(cache.is_fresh(60_999, 60_000));
        assert!(!cache.is_fresh(61_000, 60_000));
    }

    #[test]
    fn errors_do_not_replace_rows() {
        let mut cache = TransitCache::new();
        cache.store(Route::new("A", "B"), one_row("10:00"), 0);
        cache.record_error(
            Route::new("A", "B"),
            TransitError::Http(503).to_error_info("http://x", b"", 5),
        );

        assert_eq!(cache.connections()[0].departure.as_str(), "10:00");
        assert_eq!(cache.last_error().kind, ErrorKind::ApiRequest);
        assert_eq!(cache.last_error().message.as_str(), "HTTP Error: 503");
        assert_eq!(cache.last_error().detail.as_str(), "http://x");
    }

    #[test]
    fn errors_are_scoped_to_their_route() {
        let mut cache = TransitCache::new();
        cache.record_error(
            Route::new("Lausanne", "Bern"),
            TransitError::NoConnections.to_error_info("u", b"", 5),
        );

        assert_eq!(
            cache.error_for("Lausanne", "Bern").map(|e| e.kind),
            Some(ErrorKind::NoConnections)
        );
        assert!(cache.error_for("Lausanne", "Geneve").is_none());

        cache.store(Route::new("Lausanne", "Bern"), one_row("10:00"), 9);
        assert!(cache.error_for("Lausanne", "Bern").is_none());
    }

    #[test]
    fn parse_errors_carry_a_bounded_payload_excerpt() {
        let payload = [b'x'; 300];
        let info = TransitError::Parse.to_error_info("u", &payload, 0);
        assert_eq!(info.kind, ErrorKind::ApiParse);
        assert_eq!(info.detail.len(), 100);
    }
}
