use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::InputPin;

use traindisplay_core::input::{
    ButtonClassifier, ButtonConfig, ButtonEvent, InputSource, QuadratureDecoder,
};

/// Encoder A/B pins parked for the GPIO interrupt handler.
pub struct EncoderPins<A, B> {
    clk: A,
    dt: B,
}

impl<A, B> EncoderPins<A, B>
where
    A: InputPin,
    B: InputPin,
{
    pub fn new(clk: A, dt: B) -> Self {
        Self { clk, dt }
    }

    /// Reads both levels, or `None` when either pin read fails.
    pub fn levels(&mut self) -> Option<(bool, bool)> {
        let a = self.clk.is_high().ok()?;
        let b = self.dt.is_high().ok()?;
        Some((a, b))
    }

    pub fn pins_mut(&mut self) -> (&mut A, &mut B) {
        (&mut self.clk, &mut self.dt)
    }
}

/// Pins shared between `main` and the interrupt handler.
pub type SharedEncoderPins<A, B> = Mutex<RefCell<Option<EncoderPins<A, B>>>>;

/// Interrupt body: samples the pins and feeds the decoder.
///
/// The caller clears the pending GPIO flags; this only touches levels.
pub fn service_encoder_edge<A, B>(
    pins: &SharedEncoderPins<A, B>,
    decoder: &QuadratureDecoder,
    now_ms: u32,
) where
    A: InputPin,
    B: InputPin,
{
    critical_section::with(|cs| {
        let mut slot = pins.borrow_ref_mut(cs);
        let Some(pins) = slot.as_mut() else {
            return;
        };
        if let Some((a, b)) = pins.levels() {
            decoder.on_edge(a, b, now_ms);
        }
    });
}

#[derive(Debug)]
pub enum RotaryInputError<SwErr> {
    Sw(SwErr),
}

/// Encoder deltas from the interrupt-fed decoder plus the polled push button.
pub struct RotaryInput<SW> {
    decoder: &'static QuadratureDecoder,
    sw: SW,
    button: ButtonClassifier,
}

impl<SW> RotaryInput<SW>
where
    SW: InputPin,
{
    pub fn new(
        decoder: &'static QuadratureDecoder,
        mut sw: SW,
        config: ButtonConfig,
        now_ms: u64,
    ) -> Result<Self, RotaryInputError<SW::Error>> {
        let sw_high = sw.is_high().map_err(RotaryInputError::Sw)?;
        Ok(Self {
            decoder,
            sw,
            button: ButtonClassifier::new(config, sw_high, now_ms),
        })
    }

    /// Samples the button; call once per loop before ticking the app.
    pub fn update(&mut self, now_ms: u64) -> Result<(), RotaryInputError<SW::Error>> {
        let sw_high = self.sw.is_high().map_err(RotaryInputError::Sw)?;
        self.button.update(sw_high, now_ms);
        Ok(())
    }

    pub fn is_pressed(&self) -> bool {
        self.button.is_pressed()
    }
}

impl<SW> InputSource for RotaryInput<SW>
where
    SW: InputPin,
{
    fn take_encoder_delta(&mut self) -> i32 {
        self.decoder.take_delta()
    }

    fn take_button_event(&mut self) -> ButtonEvent {
        self.button.take_event()
    }
}
