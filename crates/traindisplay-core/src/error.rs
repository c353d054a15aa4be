//! User-facing error taxonomy.

use heapless::String;

use crate::text::push_truncated;

pub const ERROR_MESSAGE_CHARS: usize = 24;
pub const ERROR_DETAIL_CHARS: usize = 100;

/// Failure kinds surfaced to the user.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorKind {
    #[default]
    None,
    WifiConnect,
    WifiScan,
    ApiRequest,
    ApiParse,
    NoConnections,
    Storage,
    DisplayInit,
}

impl ErrorKind {
    /// Constant title used by the error screen.
    pub const fn title(self) -> &'static str {
        match self {
            Self::None => "Error",
            Self::WifiConnect => "WiFi Error",
            Self::WifiScan => "Scan Error",
            Self::ApiRequest => "API Error",
            Self::ApiParse => "Parse Error",
            Self::NoConnections => "No Trains",
            Self::Storage => "Storage Error",
            Self::DisplayInit => "Display Error",
        }
    }

    /// Only a display failure stops the firmware.
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::DisplayInit)
    }
}

/// A populated error with a short message and a bounded detail line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String<ERROR_MESSAGE_CHARS>,
    pub detail: String<ERROR_DETAIL_CHARS>,
    pub timestamp_ms: u64,
}

impl ErrorInfo {
    pub const fn empty() -> Self {
        Self {
            kind: ErrorKind::None,
            message: String::new(),
            detail: String::new(),
            timestamp_ms: 0,
        }
    }

    pub fn new(kind: ErrorKind, message: &str, detail: &str, timestamp_ms: u64) -> Self {
        let mut info = Self {
            kind,
            timestamp_ms,
            ..Self::default()
        };
        let _ = push_truncated(&mut info.message, message);
        let _ = push_truncated(&mut info.detail, detail);
        info
    }

    pub fn is_error(&self) -> bool {
        self.kind != ErrorKind::None
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_capped_at_one_hundred_chars() {
        let long = "x".repeat(180);
        let info = ErrorInfo::new(ErrorKind::ApiParse, "JSON Parse Error", &long, 7);
        assert_eq!(info.detail.len(), ERROR_DETAIL_CHARS);
        assert_eq!(info.timestamp_ms, 7);
        assert!(info.is_error());
    }

    #[test]
    fn default_info_is_not_an_error() {
        let mut info = ErrorInfo::new(ErrorKind::Storage, "Save failed", "", 0);
        info.clear();
        assert!(!info.is_error());
        assert!(ErrorKind::DisplayInit.is_fatal());
        assert!(!ErrorKind::WifiConnect.is_fatal());
    }
}
