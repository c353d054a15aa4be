//! Minimal HTTP/1.0 GET over an embassy-net TCP socket.

use core::fmt::Write as _;

use embassy_net::{IpEndpoint, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, with_timeout};
use embedded_io_async::Write;
use heapless::String;
use log::{debug, warn};

const SOCKET_BUFFER_BYTES: usize = 1536;
const REQUEST_BYTES: usize = 384;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HttpError {
    Dns,
    Connect,
    Write,
    Read,
    Timeout,
    /// The response did not fit the caller's buffer.
    TooLarge,
    BadResponse,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Body bytes, moved to the front of the caller's buffer.
    pub body_len: usize,
}

/// Performs `GET path` against `host:port` and leaves the body at the start
/// of `buffer`. The whole exchange is bounded by `timeout_ms`.
pub async fn get(
    stack: Stack<'_>,
    host: &str,
    port: u16,
    path: &str,
    buffer: &mut [u8],
    timeout_ms: u64,
) -> Result<HttpResponse, HttpError> {
    with_timeout(
        Duration::from_millis(timeout_ms),
        exchange(stack, host, port, path, buffer),
    )
    .await
    .map_err(|_| {
        warn!("http: GET {} timed out after {}ms", path, timeout_ms);
        HttpError::Timeout
    })?
}

async fn exchange(
    stack: Stack<'_>,
    host: &str,
    port: u16,
    path: &str,
    buffer: &mut [u8],
) -> Result<HttpResponse, HttpError> {
    let addresses = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| HttpError::Dns)?;
    let address = *addresses.first().ok_or(HttpError::Dns)?;

    let mut rx_buffer = [0u8; SOCKET_BUFFER_BYTES];
    let mut tx_buffer = [0u8; SOCKET_BUFFER_BYTES];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket
        .connect(IpEndpoint::new(address, port))
        .await
        .map_err(|err| {
            warn!("http: connect {} failed: {:?}", host, err);
            HttpError::Connect
        })?;

    let mut request: String<REQUEST_BYTES> = String::new();
    write!(
        request,
        "GET {} HTTP/1.0\r\nHost: {}\r\nAccept: application/json\r\nConnection: close\r\n\r\n",
        path, host
    )
    .map_err(|_| HttpError::TooLarge)?;
    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| HttpError::Write)?;

    let mut total = 0usize;
    loop {
        if total == buffer.len() {
            socket.abort();
            return Err(HttpError::TooLarge);
        }
        let n = socket
            .read(&mut buffer[total..])
            .await
            .map_err(|_| HttpError::Read)?;
        if n == 0 {
            break;
        }
        total += n;
    }
    socket.close();
    debug!("http: {} bytes from {}", total, host);

    split_response(buffer, total)
}

/// Parses the status line, then moves the body to the front of `buffer`.
fn split_response(buffer: &mut [u8], total: usize) -> Result<HttpResponse, HttpError> {
    let raw = &buffer[..total];
    let header_end = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or(HttpError::BadResponse)?;
    let status = parse_status(&raw[..header_end]).ok_or(HttpError::BadResponse)?;

    let body_start = header_end + 4;
    let body_len = total - body_start;
    buffer.copy_within(body_start..total, 0);
    Ok(HttpResponse { status, body_len })
}

/// `HTTP/1.x NNN ...` -> `NNN`.
fn parse_status(head: &[u8]) -> Option<u16> {
    let line_end = head
        .iter()
        .position(|b| *b == b'\r')
        .unwrap_or(head.len());
    let line = core::str::from_utf8(&head[..line_end]).ok()?;
    let mut parts = line.split_ascii_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
