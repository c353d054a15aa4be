//! Input abstraction layer: encoder detents and classified button presses.

pub mod button;
pub mod encoder;
pub mod mock;

pub use button::{ButtonClassifier, ButtonConfig};
pub use encoder::{EncoderConfig, QuadratureDecoder};

/// Classified push-button gesture.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ButtonEvent {
    #[default]
    None,
    Short,
    Long,
}

impl ButtonEvent {
    pub const fn is_some(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Drained once per tick by the state machine.
pub trait InputSource {
    /// Detents moved since the previous call; positive is clockwise.
    fn take_encoder_delta(&mut self) -> i32;

    /// Pending button gesture, consumed on read.
    fn take_button_event(&mut self) -> ButtonEvent;
}
