//! Debounced short/long press classifier for an active-low push button.

use log::debug;

use super::ButtonEvent;
use crate::config::{BUTTON_DEBOUNCE_MS, LONG_PRESS_MS};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ButtonConfig {
    debounce_ms: u64,
    long_press_ms: u64,
    active_low: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: BUTTON_DEBOUNCE_MS,
            long_press_ms: LONG_PRESS_MS,
            active_low: true,
        }
    }
}

impl ButtonConfig {
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub const fn with_long_press_ms(mut self, long_press_ms: u64) -> Self {
        self.long_press_ms = long_press_ms;
        self
    }

    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }
}

/// Turns sampled pin levels into at most one [`ButtonEvent`] per press cycle.
#[derive(Debug, Clone)]
pub struct ButtonClassifier {
    config: ButtonConfig,
    raw_pressed: bool,
    stable_pressed: bool,
    press_start_ms: u64,
    last_edge_ms: u64,
    pressed: bool,
    long_fired: bool,
    pending: ButtonEvent,
}

impl ButtonClassifier {
    /// `pin_high` is the level sampled at boot.
    pub fn new(config: ButtonConfig, pin_high: bool, now_ms: u64) -> Self {
        let pressed = level_is_pressed(pin_high, config.active_low);
        Self {
            config,
            raw_pressed: pressed,
            stable_pressed: pressed,
            press_start_ms: 0,
            last_edge_ms: now_ms,
            // A button held through boot never produces an event.
            pressed: false,
            long_fired: pressed,
            pending: ButtonEvent::None,
        }
    }

    /// Feeds one pin sample taken at `now_ms`.
    pub fn update(&mut self, pin_high: bool, now_ms: u64) {
        let reading = level_is_pressed(pin_high, self.config.active_low);
        if reading != self.raw_pressed {
            self.raw_pressed = reading;
            self.last_edge_ms = now_ms;
        }

        if now_ms.saturating_sub(self.last_edge_ms) >= self.config.debounce_ms
            && self.stable_pressed != self.raw_pressed
        {
            self.stable_pressed = self.raw_pressed;
            if self.stable_pressed {
                self.on_press(now_ms);
            } else {
                self.on_release(now_ms);
            }
        }

        if self.pressed
            && !self.long_fired
            && now_ms.saturating_sub(self.press_start_ms) >= self.config.long_press_ms
        {
            self.long_fired = true;
            self.pending = ButtonEvent::Long;
            debug!("button: long press");
        }
    }

    /// Returns the pending event once, then `ButtonEvent::None`.
    pub fn take_event(&mut self) -> ButtonEvent {
        core::mem::take(&mut self.pending)
    }

    /// Milliseconds the button has been held, zero when released.
    pub fn press_duration(&self, now_ms: u64) -> u64 {
        if self.pressed {
            now_ms.saturating_sub(self.press_start_ms)
        } else {
            0
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn on_press(&mut self, now_ms: u64) {
        self.pressed = true;
        self.press_start_ms = now_ms;
        self.long_fired = false;
    }

    fn on_release(&mut self, now_ms: u64) {
        if self.pressed && !self.long_fired {
            let duration = now_ms.saturating_sub(self.press_start_ms);
            if duration > self.config.debounce_ms && duration < self.config.long_press_ms {
                self.pending = ButtonEvent::Short;
                debug!("button: short press duration_ms={}", duration);
            }
            self.press_start_ms = 0;
        }
        self.pressed = false;
        self.long_fired = false;
    }
}

#[inline]
fn level_is_pressed(pin_high: bool, active_low: bool) -> bool {
    if active_low { !pin_high } else { pin_high }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIGH: bool = true;
    const LOW: bool = false;

    fn classifier() -> ButtonClassifier {
        ButtonClassifier::new(ButtonConfig::default(), HIGH, 0)
    }

    /// Holds `level` from `from_ms` to `to_ms` inclusive, sampling every millisecond.
    fn hold(button: &mut ButtonClassifier, level: bool, from_ms: u64, to_ms: u64) -> Vec<ButtonEvent> {
        let mut events = Vec::new();
        for now in from_ms..=to_ms {
            button.update(level, now);
            let event = button.take_event();
            if event.is_some() {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn quick_click_emits_one_short() {
        let mut button = classifier();
        let mut events = hold(&mut button, LOW, 100, 300);
        events.extend(hold(&mut button, HIGH, 301, 600));
        assert_eq!(events, vec![ButtonEvent::Short]);
    }

    #[test]
    fn long_press_fires_at_exactly_the_threshold() {
        let mut button = classifier();
        // Stable press accepted at 150 after 50 ms of debounce.
        let before = hold(&mut button, LOW, 100, 1_149);
        assert!(before.is_empty());

        button.update(LOW, 1_150);
        assert_eq!(button.take_event(), ButtonEvent::Long);

        let after_release = hold(&mut button, HIGH, 1_151, 1_400);
        assert!(after_release.is_empty());
    }

    #[test]
    fn release_one_ms_before_threshold_is_short() {
        let mut button = classifier();
        // Press stable at 150, release stable at 150 + 999.
        let mut events = hold(&mut button, LOW, 100, 1_098);
        events.extend(hold(&mut button, HIGH, 1_099, 1_300));
        assert_eq!(events, vec![ButtonEvent::Short]);
    }

    #[test]
    fn contact_bounce_is_ignored() {
        let mut button = classifier();
        let mut events = Vec::new();
        for (i, now) in (100..140).enumerate() {
            button.update(i % 2 == 0, now);
            events.push(button.take_event());
        }
        events.extend(hold(&mut button, HIGH, 140, 400));
        assert!(events.iter().all(|e| *e == ButtonEvent::None));
    }

    #[test]
    fn event_is_consumed_once() {
        let mut button = classifier();
        hold(&mut button, LOW, 100, 200);
        for now in 201..=260 {
            button.update(HIGH, now);
        }
        assert_eq!(button.take_event(), ButtonEvent::Short);
        assert_eq!(button.take_event(), ButtonEvent::None);
    }

    #[test]
    fn button_held_through_boot_stays_silent() {
        let mut button = ButtonClassifier::new(ButtonConfig::default(), LOW, 0);
        let mut events = hold(&mut button, LOW, 1, 2_000);
        events.extend(hold(&mut button, HIGH, 2_001, 2_200));
        assert!(events.is_empty());
    }
}
