//! Station-mode WiFi: scan, associate and DHCP.

use embassy_net::{Ipv4Address, Stack};
use embassy_time::{Duration, Instant, WithTimeout};
use esp_radio::wifi::{AuthMethod, ClientConfig, ModeConfig, ScanConfig, WifiController};
use log::{info, warn};
use traindisplay_core::{
    config::{WIFI_CONNECT_TIMEOUT_MS, WIFI_SCAN_MAX_NETWORKS},
    wifi::{
        ConnectDeadline, Credentials, LinkStatus, NetworkList, NetworkRecord, collect_networks,
    },
};

use super::ConnectivityHandle;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WifiError {
    Start,
    Config,
    Scan,
    Associate,
    Timeout,
    Dhcp,
    NoCredentials,
}

impl WifiError {
    /// Short user-facing reason.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Start => "Radio start failed",
            Self::Config => "Bad WiFi config",
            Self::Scan => "Scan failed",
            Self::Associate => "Connection failed",
            Self::Timeout => "Connection timeout",
            Self::Dhcp => "No IP address",
            Self::NoCredentials => "No WiFi configured",
        }
    }
}

/// Owns the radio controller and keeps [`ConnectivityHandle`] current.
pub struct WifiFacade<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
    connectivity: &'static ConnectivityHandle,
    credentials: Option<Credentials>,
}

impl<'d> WifiFacade<'d> {
    pub fn new(
        controller: WifiController<'d>,
        stack: Stack<'d>,
        connectivity: &'static ConnectivityHandle,
    ) -> Self {
        Self {
            controller,
            stack,
            connectivity,
            credentials: None,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.controller.is_connected(), Ok(true)) && self.stack.config_v4().is_some()
    }

    pub fn local_ip(&self) -> Option<Ipv4Address> {
        self.stack.config_v4().map(|config| config.address.address())
    }

    /// Signal of the associated access point.
    pub fn rssi(&self) -> Option<i8> {
        self.controller
            .rssi()
            .ok()
            .map(|rssi| rssi.clamp(i8::MIN as i32 + 1, 0) as i8)
    }

    /// Visible networks, strongest first, duplicates collapsed.
    pub async fn scan(&mut self) -> Result<NetworkList, WifiError> {
        if self.credentials.is_none() && !self.controller.is_started().unwrap_or(false) {
            self.controller
                .set_config(&ModeConfig::Client(ClientConfig::default()))
                .map_err(|_| WifiError::Config)?;
        }
        self.ensure_started().await?;

        let config = ScanConfig::default().with_max(WIFI_SCAN_MAX_NETWORKS);
        let found = self
            .controller
            .scan_with_config_async(config)
            .await
            .map_err(|err| {
                warn!("wifi: scan failed: {:?}", err);
                WifiError::Scan
            })?;

        let networks = collect_networks(found.iter().map(|ap| {
            let secure = !matches!(ap.auth_method, None | Some(AuthMethod::None));
            NetworkRecord::new(ap.ssid.as_str(), ap.signal_strength, secure)
        }));
        info!("wifi: scan found {} networks", networks.len());
        Ok(networks)
    }

    /// Associates with `credentials` and waits for DHCP.
    ///
    /// Both stages share one [`WIFI_CONNECT_TIMEOUT_MS`] budget. The clock
    /// sync runs on its own once the stack has an address.
    pub async fn connect(&mut self, credentials: &Credentials) -> Result<LinkStatus, WifiError> {
        info!("wifi: connecting to {}", credentials.ssid.as_str());
        self.credentials = Some(credentials.clone());
        let deadline = ConnectDeadline::starting_at(now_ms(), WIFI_CONNECT_TIMEOUT_MS);

        if matches!(self.controller.is_connected(), Ok(true)) {
            let _ = self.controller.disconnect_async().await;
        }
        self.connectivity.mark_disconnected();

        let client = ClientConfig::default()
            .with_ssid(credentials.ssid.as_str().into())
            .with_password(credentials.password.as_str().into());
        self.controller
            .set_config(&ModeConfig::Client(client))
            .map_err(|err| {
                warn!("wifi: config rejected: {:?}", err);
                WifiError::Config
            })?;
        self.ensure_started().await?;

        let budget = self.remaining(&deadline).await?;
        match self.controller.connect_async().with_timeout(budget).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!("wifi: associate failed: {:?}", err);
                let _ = self.controller.disconnect_async().await;
                return Err(WifiError::Associate);
            }
            Err(_) => {
                warn!("wifi: associate timed out");
                let _ = self.controller.disconnect_async().await;
                return Err(WifiError::Timeout);
            }
        }

        let budget = self.remaining(&deadline).await?;
        if self.stack.wait_config_up().with_timeout(budget).await.is_err() {
            warn!("wifi: dhcp timed out");
            let _ = self.controller.disconnect_async().await;
            return Err(WifiError::Dhcp);
        }

        if let Some(ip) = self.local_ip() {
            info!("wifi: connected, ip={}", ip);
        }

        let link = LinkStatus {
            connected: true,
            rssi: self.rssi(),
        };
        self.connectivity.mark_connected(link.rssi);
        Ok(link)
    }

    /// Publishes the live link state without reconnecting.
    pub fn poll_link(&self) -> LinkStatus {
        if self.is_connected() {
            self.connectivity.mark_connected(self.rssi());
        } else {
            self.connectivity.mark_disconnected();
        }
        self.connectivity.snapshot()
    }

    /// Refreshes the shared link state and re-associates with the last
    /// credentials when the link dropped.
    pub async fn maintain(&mut self) -> LinkStatus {
        if self.is_connected() {
            self.connectivity.mark_connected(self.rssi());
            return self.connectivity.snapshot();
        }

        self.connectivity.mark_disconnected();
        let Some(credentials) = self.credentials.clone() else {
            return self.connectivity.snapshot();
        };

        info!("wifi: link lost, reconnecting");
        match self.connect(&credentials).await {
            Ok(link) => link,
            Err(err) => {
                warn!("wifi: reconnect failed: {:?}", err);
                self.connectivity.snapshot()
            }
        }
    }

    pub async fn disconnect(&mut self) {
        let _ = self.controller.disconnect_async().await;
        self.connectivity.mark_disconnected();
    }

    async fn remaining(&mut self, deadline: &ConnectDeadline) -> Result<Duration, WifiError> {
        match deadline.remaining_ms(now_ms()) {
            Some(left) => Ok(Duration::from_millis(left)),
            None => {
                warn!("wifi: connect budget spent");
                let _ = self.controller.disconnect_async().await;
                Err(WifiError::Timeout)
            }
        }
    }

    async fn ensure_started(&mut self) -> Result<(), WifiError> {
        if self.controller.is_started().unwrap_or(false) {
            return Ok(());
        }
        self.controller.start_async().await.map_err(|err| {
            warn!("wifi: start failed: {:?}", err);
            WifiError::Start
        })
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}
