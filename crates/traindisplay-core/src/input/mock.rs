use heapless::Deque;

use super::{ButtonEvent, InputSource};

const MOCK_QUEUE: usize = 32;

/// Scripted input source for bring-up and tests.
///
/// Each queued step is delivered on one call pair: the delta on
/// `take_encoder_delta`, then the button gesture on `take_button_event`.
#[derive(Default, Debug)]
pub struct MockInput {
    steps: Deque<(i32, ButtonEvent), MOCK_QUEUE>,
    current_event: ButtonEvent,
}

impl MockInput {
    pub const fn new() -> Self {
        Self {
            steps: Deque::new(),
            current_event: ButtonEvent::None,
        }
    }

    pub fn rotate(&mut self, detents: i32) -> &mut Self {
        let _ = self.steps.push_back((detents, ButtonEvent::None));
        self
    }

    pub fn short(&mut self) -> &mut Self {
        let _ = self.steps.push_back((0, ButtonEvent::Short));
        self
    }

    pub fn long(&mut self) -> &mut Self {
        let _ = self.steps.push_back((0, ButtonEvent::Long));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl InputSource for MockInput {
    fn take_encoder_delta(&mut self) -> i32 {
        match self.steps.pop_front() {
            Some((delta, event)) => {
                self.current_event = event;
                delta
            }
            None => {
                self.current_event = ButtonEvent::None;
                0
            }
        }
    }

    fn take_button_event(&mut self) -> ButtonEvent {
        core::mem::take(&mut self.current_event)
    }
}
