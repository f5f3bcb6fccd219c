use tracing::info;

use crate::codec::Frame;

/// Receives every frame that passed validation.
///
/// Called exactly once per valid frame, with ownership of the frame.
pub trait Dispatcher {
    fn dispatch(&mut self, frame: Frame, id: u8);
}

impl<F: FnMut(Frame, u8)> Dispatcher for F {
    fn dispatch(&mut self, frame: Frame, id: u8) {
        self(frame, id)
    }
}

/// Dispatcher that only logs what it receives.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    fn dispatch(&mut self, frame: Frame, id: u8) {
        info!(id, len = frame.len(), "message processed");
    }
}
