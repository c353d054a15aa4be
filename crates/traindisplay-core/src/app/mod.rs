//! Screen state machine: owns the shared model, routes input to the active
//! screen and turns finished I/O into model updates.

use log::{debug, info, warn};

use crate::{
    clock::WallClock,
    display::Canvas,
    input::{ButtonEvent, InputSource},
    preset::PresetRepository,
    screens::{
        AppState, Ctx, EditTarget, Handoff, IoOutcome, IoRequest, NetModel, RequestStatus,
        ScreenRegistry,
    },
    settings::{self, KeyValueStore, StorageError},
    transit::TransitCache,
    wifi::{Credentials, LinkStatus},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

pub struct StateMachine<S>
where
    S: KeyValueStore,
{
    state: AppState,
    screens: ScreenRegistry,
    presets: PresetRepository,
    store: S,
    transit: TransitCache,
    net: NetModel,
    handoff: Handoff,
    request: Option<IoRequest>,
    clock: Option<&'static WallClock>,
    pending_redraw: bool,
}

impl<S> StateMachine<S>
where
    S: KeyValueStore,
{
    /// Loads the presets from `store`, seeding the defaults on a blank store.
    pub fn new(mut store: S) -> Self {
        let mut presets = PresetRepository::new();
        if let Err(err) = presets.load_all(&mut store) {
            warn!("app: preset load failed: {:?}", err);
        }

        Self {
            state: AppState::Main,
            screens: ScreenRegistry::default(),
            presets,
            store,
            transit: TransitCache::new(),
            net: NetModel::default(),
            handoff: Handoff::default(),
            request: None,
            clock: None,
            pending_redraw: false,
        }
    }

    pub fn with_clock(mut self, clock: &'static WallClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn presets(&self) -> &PresetRepository {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetRepository {
        &mut self.presets
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn transit(&self) -> &TransitCache {
        &self.transit
    }

    pub fn net(&self) -> &NetModel {
        &self.net
    }

    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    pub fn credentials(&self) -> Option<Credentials> {
        settings::load_wifi_credentials(&self.store)
    }

    /// Writes the presets if anything changed since the last save.
    pub fn save_presets(&mut self) -> Result<(), StorageError> {
        if !self.presets.is_dirty() {
            return Ok(());
        }
        self.presets.save_all(&mut self.store)
    }

    /// Mirrors the radio state; the active screen decides whether to redraw.
    pub fn set_link(&mut self, link: LinkStatus) {
        if self.net.link != link {
            info!(
                "app: link connected={} rssi={:?}",
                link.connected, link.rssi
            );
            self.net.link = link;
        }
    }

    pub fn request_redraw(&mut self) {
        self.pending_redraw = true;
    }

    /// Work posted during the last tick, if any.
    pub fn take_request(&mut self) -> Option<IoRequest> {
        self.request.take()
    }

    /// Queues a fetch for the current preset, as the bootstrap does after
    /// connecting. Returns the request to run.
    pub fn refresh_current(&mut self, now_ms: u64) -> Option<IoRequest> {
        let (_, mut ctx) = self.split(now_ms);
        ctx.refresh_current();
        self.request.take()
    }

    /// Applies a finished request to the shared model.
    pub fn resolve(&mut self, outcome: IoOutcome, now_ms: u64) {
        match outcome {
            IoOutcome::Scanned(Ok(networks)) => {
                info!("app: scan found {} networks", networks.len());
                self.net.networks = networks;
                self.net.scan = RequestStatus::Succeeded;
            }
            IoOutcome::Scanned(Err(error)) => {
                self.net.networks.clear();
                self.handoff.last_error = error;
                self.net.scan = RequestStatus::Failed;
            }
            IoOutcome::Connected(Ok(link)) => {
                self.net.link = link;
                self.net.connect = RequestStatus::Succeeded;
            }
            IoOutcome::Connected(Err(error)) => {
                self.net.link = LinkStatus::default();
                self.handoff.last_error = error;
                self.net.connect = RequestStatus::Failed;
            }
            IoOutcome::Fetched {
                route,
                result: Ok(connections),
            } => {
                info!(
                    "app: fetched {} connections {} -> {}",
                    connections.len(),
                    route.from,
                    route.to
                );
                self.transit.store(route, connections, now_ms);
                self.net.fetch = RequestStatus::Succeeded;
            }
            IoOutcome::Fetched {
                route,
                result: Err(error),
            } => {
                self.transit.record_error(route, error.clone());
                self.handoff.last_error = error;
                self.net.fetch = RequestStatus::Failed;
            }
        }
    }

    /// Borrows the registry and a context over the rest of the model.
    fn split(&mut self, now_ms: u64) -> (&mut ScreenRegistry, Ctx<'_>) {
        let Self {
            screens,
            presets,
            store,
            transit,
            net,
            handoff,
            request,
            clock,
            ..
        } = self;

        let ctx = Ctx {
            now_ms,
            local_time: clock.and_then(|clock| clock.local_time(now_ms)),
            presets,
            store,
            transit,
            net,
            handoff,
            request,
        };
        (screens, ctx)
    }
}

/// Fills in the edit target when a screen opens PresetEdit without one.
fn default_handoff(handoff: &mut Handoff, presets: &PresetRepository, from: AppState, to: AppState) {
    if to == AppState::PresetEdit && handoff.edit.is_none() {
        handoff.edit = Some(EditTarget::Existing {
            index: presets.current_index(),
            return_to: from,
        });
    }
}

include!("runtime.rs");

#[cfg(test)]
mod tests;
