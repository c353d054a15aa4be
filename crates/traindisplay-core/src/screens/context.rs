//! Shared model handed to every screen call, plus the deferred I/O protocol.

use heapless::String;

use crate::{
    clock::LocalTime,
    config::SSID_CHARS,
    error::ErrorInfo,
    preset::{PresetRepository, PresetType},
    settings::KeyValueStore,
    transit::{ConnectionList, Route, TransitCache},
    wifi::{Credentials, LinkStatus, NetworkList},
};

use super::AppState;

/// Blocking work a screen wants done. The main loop runs it right after the
/// tick that posted it and answers with an [`IoOutcome`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IoRequest {
    Scan,
    Connect(Credentials),
    Fetch { route: Route, limit: u8 },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IoOutcome {
    Scanned(Result<NetworkList, ErrorInfo>),
    Connected(Result<LinkStatus, ErrorInfo>),
    Fetched {
        route: Route,
        result: Result<ConnectionList, ErrorInfo>,
    },
}

/// Progress of one kind of request, observed by the screen that posted it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl RequestStatus {
    /// Returns a finished status once and resets it to `Idle`.
    pub fn take_finished(&mut self) -> Option<bool> {
        match *self {
            Self::Succeeded => {
                *self = Self::Idle;
                Some(true)
            }
            Self::Failed => {
                *self = Self::Idle;
                Some(false)
            }
            _ => None,
        }
    }
}

/// Network-facing part of the model.
#[derive(Clone, Debug, Default)]
pub struct NetModel {
    pub link: LinkStatus,
    pub networks: NetworkList,
    pub scan: RequestStatus,
    pub connect: RequestStatus,
    pub fetch: RequestStatus,
}

/// What PresetEdit should open.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditTarget {
    Existing { index: usize, return_to: AppState },
    Create { kind: PresetType, return_to: AppState },
}

/// Data passed across a transition.
#[derive(Clone, Debug, Default)]
pub struct Handoff {
    /// WiFiScan -> WiFiPassword.
    pub selected_ssid: Option<String<SSID_CHARS>>,
    /// PresetSelect or Main -> PresetEdit.
    pub edit: Option<EditTarget>,
    /// Anything -> Error.
    pub last_error: ErrorInfo,
}

pub struct Ctx<'a> {
    pub now_ms: u64,
    pub local_time: Option<LocalTime>,
    pub presets: &'a mut PresetRepository,
    pub store: &'a mut dyn KeyValueStore,
    pub transit: &'a mut TransitCache,
    pub net: &'a mut NetModel,
    pub handoff: &'a mut Handoff,
    pub request: &'a mut Option<IoRequest>,
}

impl Ctx<'_> {
    /// Queues `request` and marks its kind pending. A second post in the same
    /// tick replaces the first.
    pub fn post(&mut self, request: IoRequest) {
        match request {
            IoRequest::Scan => self.net.scan = RequestStatus::Pending,
            IoRequest::Connect(_) => self.net.connect = RequestStatus::Pending,
            IoRequest::Fetch { .. } => self.net.fetch = RequestStatus::Pending,
        }
        *self.request = Some(request);
    }

    pub fn is_connected(&self) -> bool {
        self.net.link.connected
    }

    /// Posts a fetch for the current preset when it is a train route.
    pub fn refresh_current(&mut self) -> bool {
        let Some(preset) = self.presets.current() else {
            return false;
        };
        if !preset.is_train() {
            return false;
        }

        let request = IoRequest::Fetch {
            route: Route::new(&preset.from, &preset.to),
            limit: preset.trains_to_display,
        };
        self.post(request);
        true
    }

    pub fn fail(&mut self, error: ErrorInfo) {
        self.handoff.last_error = error;
    }
}
