//! Request target for the connections endpoint.

use core::fmt::Write as _;

use heapless::String;

use crate::config::{API_BASE_PATH, API_BASE_URL};

pub const PATH_CHARS: usize = 256;

/// Appends `value` percent-encoded; unreserved characters pass through.
pub fn push_percent_encoded<const N: usize>(out: &mut String<N>, value: &str) -> bool {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    for byte in value.bytes() {
        let keep = byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~');
        let pushed = if keep {
            out.push(byte as char).is_ok()
        } else {
            out.push('%').is_ok()
                && out.push(HEX[(byte >> 4) as usize] as char).is_ok()
                && out.push(HEX[(byte & 0x0F) as usize] as char).is_ok()
        };
        if !pushed {
            return false;
        }
    }
    true
}

fn push_query(out: &mut String<PATH_CHARS>, from: &str, to: &str, limit: u8) -> Option<()> {
    out.push_str("/connections?from=").ok()?;
    push_percent_encoded(out, from).then_some(())?;
    out.push_str("&to=").ok()?;
    push_percent_encoded(out, to).then_some(())?;
    write!(out, "&limit={}", limit).ok()
}

/// Origin-relative target sent on the request line.
pub fn connections_path(from: &str, to: &str, limit: u8) -> Option<String<PATH_CHARS>> {
    let mut out = String::new();
    out.push_str(API_BASE_PATH).ok()?;
    push_query(&mut out, from, to, limit)?;
    Some(out)
}

/// Absolute URL, logged and reported as error detail.
pub fn connections_url(from: &str, to: &str, limit: u8) -> Option<String<PATH_CHARS>> {
    let mut out = String::new();
    out.push_str(API_BASE_URL).ok()?;
    push_query(&mut out, from, to, limit)?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_request_target_with_limit() {
        let path = connections_path("Lausanne", "Bern", 3).unwrap();
        assert_eq!(path.as_str(), "/v1/connections?from=Lausanne&to=Bern&limit=3");
    }

    #[test]
    fn station_names_are_percent_encoded() {
        let url = connections_url("Zurich HB", "Genève", 1).unwrap();
        assert_eq!(
            url.as_str(),
            "http://transport.opendata.ch/v1/connections?from=Zurich%20HB&to=Gen%C3%A8ve&limit=1"
        );
    }
}
