use log::{info, warn};
use traindisplay_core::{
    app::StateMachine, config::PRESET_SAVE_DEBOUNCE_MS, settings::KeyValueStore,
};

/// Delays preset writes until the encoder has been quiet for a while, so
/// spinning through presets on Main costs one flash erase.
pub(super) struct PresetSyncState {
    last_index: usize,
    pending_since: Option<u64>,
}

impl PresetSyncState {
    pub(super) fn new(current_index: usize) -> Self {
        Self {
            last_index: current_index,
            pending_since: None,
        }
    }

    pub(super) fn track_current(&mut self, dirty: bool, current_index: usize, now_ms: u64) {
        if !dirty {
            self.last_index = current_index;
            self.pending_since = None;
            return;
        }

        if self.pending_since.is_none() || current_index != self.last_index {
            self.last_index = current_index;
            self.pending_since = Some(now_ms);
        }
    }

    pub(super) fn flush_if_due<S: KeyValueStore>(
        &mut self,
        machine: &mut StateMachine<S>,
        now_ms: u64,
    ) {
        let Some(changed_at_ms) = self.pending_since else {
            return;
        };

        if now_ms.saturating_sub(changed_at_ms) < PRESET_SAVE_DEBOUNCE_MS {
            return;
        }

        match machine.save_presets() {
            Ok(()) => {
                info!(
                    "preset-save: flushed count={} current={}",
                    machine.presets().len(),
                    machine.presets().current_index()
                );
                self.pending_since = None;
            }
            Err(err) => {
                // Memory stays dirty; try again after another quiet period.
                warn!("preset-save: failed: {:?}", err);
                self.pending_since = Some(now_ms);
            }
        }
    }
}
