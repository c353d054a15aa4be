use embassy_net::Stack;
use embassy_time::Instant;
use log::{info, warn};
use traindisplay_core::{
    config::{API_HOST, API_PORT, HTTP_TIMEOUT_MS},
    error::{ErrorInfo, ErrorKind},
    screens::{IoOutcome, IoRequest},
    transit::{
        ConnectionList, Route, TransitError, connections_path, connections_url, parse_connections,
    },
    wifi::Credentials,
};
use traindisplay_hal_esp32s3::network::{
    http::{self, HttpError},
    wifi::{WifiError, WifiFacade},
};

const HTTP_OK: u16 = 200;

/// Runs the blocking requests screens post, on behalf of the UI loop.
pub(super) struct Services<'d> {
    wifi: WifiFacade<'d>,
    stack: Stack<'d>,
    body: &'static mut [u8],
}

impl<'d> Services<'d> {
    pub(super) fn new(wifi: WifiFacade<'d>, stack: Stack<'d>, body: &'static mut [u8]) -> Self {
        Self { wifi, stack, body }
    }

    pub(super) async fn connect(&mut self, credentials: &Credentials) -> Result<(), WifiError> {
        self.wifi.connect(credentials).await.map(|_| ())
    }

    pub(super) fn poll_link(&self) {
        self.wifi.poll_link();
    }

    pub(super) async fn execute(&mut self, request: IoRequest) -> IoOutcome {
        match request {
            IoRequest::Scan => {
                let result = self.wifi.scan().await.map_err(|err| {
                    ErrorInfo::new(ErrorKind::WifiScan, err.message(), "", now_ms())
                });
                IoOutcome::Scanned(result)
            }
            IoRequest::Connect(credentials) => {
                let result = self.wifi.connect(&credentials).await.map_err(|err| {
                    ErrorInfo::new(
                        ErrorKind::WifiConnect,
                        err.message(),
                        &credentials.ssid,
                        now_ms(),
                    )
                });
                IoOutcome::Connected(result)
            }
            IoRequest::Fetch { route, limit } => {
                if !self.wifi.is_connected() {
                    self.wifi.maintain().await;
                }
                let result = self.fetch(&route, limit).await;
                IoOutcome::Fetched { route, result }
            }
        }
    }

    async fn fetch(&mut self, route: &Route, limit: u8) -> Result<ConnectionList, ErrorInfo> {
        let url = connections_url(&route.from, &route.to, limit).unwrap_or_default();
        let Some(path) = connections_path(&route.from, &route.to, limit) else {
            return Err(TransitError::Network.to_error_info(&url, &[], now_ms()));
        };

        info!("transit: GET {}", url);
        let response = http::get(
            self.stack,
            API_HOST,
            API_PORT,
            &path,
            self.body,
            HTTP_TIMEOUT_MS,
        )
        .await
        .map_err(|err| {
            warn!("transit: request failed: {:?}", err);
            let error = match err {
                HttpError::TooLarge => TransitError::TooLarge,
                _ => TransitError::Network,
            };
            error.to_error_info(&url, &[], now_ms())
        })?;

        let body = &self.body[..response.body_len];
        if response.status != HTTP_OK {
            warn!("transit: status {}", response.status);
            return Err(TransitError::Http(response.status).to_error_info(&url, body, now_ms()));
        }

        parse_connections(body, limit, now_ms()).map_err(|err| {
            warn!("transit: parse failed: {:?}", err);
            err.to_error_info(&url, body, now_ms())
        })
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}
