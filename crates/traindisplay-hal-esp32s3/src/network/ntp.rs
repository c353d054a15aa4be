use embassy_net::{
    Stack,
    dns::DnsQueryType,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Duration, Timer, with_timeout};
use log::{info, warn};
use traindisplay_core::{
    clock::{UnixSeconds, WallClock},
    config::{CLOCK_RESYNC_MS, CLOCK_SYNC_RETRY_MS, NTP_SERVER_1, NTP_SERVER_2},
};

const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;
const NTP_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NtpError {
    Dns,
    Bind,
    Send,
    Timeout,
    Receive,
    ShortResponse,
    InvalidTimestamp,
}

/// Keeps `clock` synced for as long as the stack has an address.
///
/// Runs beside the UI so a slow time server never holds up a connect.
pub async fn run(stack: Stack<'_>, clock: &WallClock, now_ms: impl Fn() -> u64) -> ! {
    loop {
        stack.wait_config_up().await;
        let pause_ms = match sync(stack, clock, &now_ms).await {
            Ok(_) => CLOCK_RESYNC_MS,
            Err(err) => {
                warn!("ntp: sync failed: {:?}", err);
                CLOCK_SYNC_RETRY_MS
            }
        };
        Timer::after_millis(pause_ms).await;
    }
}

/// Sets `clock` from the first server that answers.
pub async fn sync(
    stack: Stack<'_>,
    clock: &WallClock,
    now_ms: impl Fn() -> u64,
) -> Result<UnixSeconds, NtpError> {
    let mut last_error = NtpError::Dns;
    for server in [NTP_SERVER_1, NTP_SERVER_2] {
        match query(stack, server).await {
            Ok(unix) => {
                clock.set(unix, now_ms());
                info!("ntp: synced from {} unix={}", server, unix.as_i64());
                return Ok(unix);
            }
            Err(err) => {
                warn!("ntp: {} failed: {:?}", server, err);
                last_error = err;
            }
        }
    }
    Err(last_error)
}

async fn query(stack: Stack<'_>, server: &str) -> Result<UnixSeconds, NtpError> {
    let addresses = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(|_| NtpError::Dns)?;
    let address = *addresses.first().ok_or(NtpError::Dns)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| NtpError::Bind)?;

    // LI=0, VN=3, Mode=3 (client).
    let mut request = [0u8; NTP_PACKET_LEN];
    request[0] = 0x1B;
    socket
        .send_to(&request, (address, NTP_PORT))
        .await
        .map_err(|_| NtpError::Send)?;

    let mut response = [0u8; NTP_PACKET_LEN];
    let (len, _) = with_timeout(
        Duration::from_millis(NTP_TIMEOUT_MS),
        socket.recv_from(&mut response),
    )
    .await
    .map_err(|_| NtpError::Timeout)?
    .map_err(|_| NtpError::Receive)?;

    if len < NTP_PACKET_LEN {
        return Err(NtpError::ShortResponse);
    }

    // Transmit timestamp, seconds part.
    let seconds = u32::from_be_bytes([response[40], response[41], response[42], response[43]]);
    UnixSeconds::from_ntp_seconds(seconds).ok_or(NtpError::InvalidTimestamp)
}
