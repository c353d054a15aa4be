//! Interrupt-driven quadrature decoder with per-detent deltas.
//!
//! The ISR side calls [`QuadratureDecoder::on_edge`]; the main loop drains
//! movement with [`QuadratureDecoder::take_delta`]. Every field is an atomic
//! word so a static decoder can be shared without locks. Main-side writes that
//! touch more than one field run inside a critical section.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use crate::config::ENCODER_DEBOUNCE_MS;

// Indexed by (previous_ab << 2) | current_ab. Forward words are
// 1101, 0100, 0010, 1011 and reverse words 1110, 0111, 0001, 1000.
const QUADRATURE_TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EncoderConfig {
    guard_ms: u32,
    counts_per_detent: i32,
    direction_inverted: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderConfig {
    pub const fn new() -> Self {
        Self {
            guard_ms: ENCODER_DEBOUNCE_MS,
            counts_per_detent: 2,
            direction_inverted: false,
        }
    }

    pub const fn with_guard_ms(mut self, guard_ms: u32) -> Self {
        self.guard_ms = guard_ms;
        self
    }

    pub const fn with_counts_per_detent(mut self, counts_per_detent: i32) -> Self {
        self.counts_per_detent = if counts_per_detent < 1 {
            1
        } else {
            counts_per_detent
        };
        self
    }

    pub const fn with_direction_inverted(mut self, direction_inverted: bool) -> Self {
        self.direction_inverted = direction_inverted;
        self
    }
}

#[derive(Debug)]
pub struct QuadratureDecoder {
    config: EncoderConfig,
    raw_count: AtomicI32,
    position: AtomicI32,
    last_read_position: AtomicI32,
    last_encoded: AtomicU32,
    last_edge_ms: AtomicU32,
    seen_edge: AtomicBool,
}

impl QuadratureDecoder {
    pub const fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            raw_count: AtomicI32::new(0),
            position: AtomicI32::new(0),
            last_read_position: AtomicI32::new(0),
            last_encoded: AtomicU32::new(0),
            last_edge_ms: AtomicU32::new(0),
            seen_edge: AtomicBool::new(false),
        }
    }

    /// Records the resting pin levels so the first edge decodes correctly.
    pub fn prime(&self, a_high: bool, b_high: bool) {
        self.last_encoded
            .store(encode(a_high, b_high), Ordering::Release);
    }

    /// Pin-change handler body. Safe to call from interrupt context.
    pub fn on_edge(&self, a_high: bool, b_high: bool, now_ms: u32) {
        if self.seen_edge.load(Ordering::Acquire)
            && now_ms.wrapping_sub(self.last_edge_ms.load(Ordering::Acquire)) < self.config.guard_ms
        {
            return;
        }
        self.last_edge_ms.store(now_ms, Ordering::Release);
        self.seen_edge.store(true, Ordering::Release);

        let encoded = encode(a_high, b_high);
        let previous = self.last_encoded.swap(encoded, Ordering::AcqRel);
        let step = QUADRATURE_TRANSITIONS[((previous << 2) | encoded) as usize] as i32;
        if step == 0 {
            return;
        }

        let step = if self.config.direction_inverted {
            -step
        } else {
            step
        };
        let raw = self.raw_count.fetch_add(step, Ordering::AcqRel) + step;
        self.position
            .store(raw / self.config.counts_per_detent, Ordering::Release);
    }

    /// Detents moved since the previous call; each step is reported once.
    pub fn take_delta(&self) -> i32 {
        let position = self.position.load(Ordering::Acquire);
        let previous = self.last_read_position.swap(position, Ordering::AcqRel);
        position.wrapping_sub(previous)
    }

    /// Absolute detent position.
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.set_position(0);
    }

    pub fn set_position(&self, position: i32) {
        critical_section::with(|_| {
            self.position.store(position, Ordering::Release);
            self.raw_count.store(
                position.saturating_mul(self.config.counts_per_detent),
                Ordering::Release,
            );
            self.last_read_position.store(position, Ordering::Release);
        });
    }
}

#[inline]
fn encode(a_high: bool, b_high: bool) -> u32 {
    ((a_high as u32) << 1) | (b_high as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Forward cycle: 11 -> 01 -> 00 -> 10 -> 11.
    const FORWARD: [(bool, bool); 4] = [(false, true), (false, false), (true, false), (true, true)];
    const REVERSE: [(bool, bool); 4] = [(true, false), (false, false), (false, true), (true, true)];

    fn decoder() -> QuadratureDecoder {
        let decoder = QuadratureDecoder::new(EncoderConfig::new());
        decoder.prime(true, true);
        decoder
    }

    fn feed(decoder: &QuadratureDecoder, steps: &[(bool, bool)], start_ms: u32) -> u32 {
        let mut now = start_ms;
        for (a, b) in steps {
            decoder.on_edge(*a, *b, now);
            now += 10;
        }
        now
    }

    #[test]
    fn one_detent_is_reported_exactly_once() {
        let decoder = decoder();
        feed(&decoder, &FORWARD[..2], 100);

        assert_eq!(decoder.take_delta(), 1);
        assert_eq!(decoder.take_delta(), 0);
        assert_eq!(decoder.take_delta(), 0);
    }

    #[test]
    fn full_cycle_counts_two_detents_each_way() {
        let decoder = decoder();
        let now = feed(&decoder, &FORWARD, 100);
        assert_eq!(decoder.take_delta(), 2);

        feed(&decoder, &REVERSE, now);
        assert_eq!(decoder.take_delta(), -2);
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn edges_inside_guard_window_are_dropped() {
        let decoder = decoder();
        decoder.on_edge(false, true, 100);
        decoder.on_edge(false, false, 102);
        assert_eq!(decoder.take_delta(), 0);

        decoder.on_edge(false, false, 106);
        assert_eq!(decoder.take_delta(), 1);
    }

    #[test]
    fn invalid_jumps_are_ignored() {
        let decoder = decoder();
        // 11 -> 00 skips a state and carries no direction.
        decoder.on_edge(false, false, 100);
        assert_eq!(decoder.take_delta(), 0);
    }

    #[test]
    fn set_position_does_not_produce_a_delta() {
        let decoder = decoder();
        decoder.set_position(7);
        assert_eq!(decoder.take_delta(), 0);

        feed(&decoder, &FORWARD[..2], 100);
        assert_eq!(decoder.position(), 8);
        assert_eq!(decoder.take_delta(), 1);

        decoder.reset();
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.take_delta(), 0);
    }

    #[test]
    fn inverted_direction_flips_sign() {
        let decoder = QuadratureDecoder::new(EncoderConfig::new().with_direction_inverted(true));
        decoder.prime(true, true);
        feed(&decoder, &FORWARD[..2], 100);
        assert_eq!(decoder.take_delta(), -1);
    }
}
