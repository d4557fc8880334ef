use crate::deck::SlideSummary;

use super::payload::{ControlAction, SyncPayload};
use super::surface::{CloseFlag, Port};

/// State of the presenter window, fed only through its message port.
#[derive(Debug)]
pub struct PresenterWindow {
    port: Port,
    closed: CloseFlag,
    pub slides: Vec<SlideSummary>,
    pub index: usize,
}

impl PresenterWindow {
    pub(super) fn new(port: Port, closed: CloseFlag) -> Self {
        Self {
            port,
            closed,
            slides: Vec::new(),
            index: 0,
        }
    }

    /// Apply every pending `state`/`update` message. Anything else is ignored.
    pub fn receive(&mut self) -> usize {
        let mut applied = 0;
        for message in self.port.drain() {
            let Some(payload) = SyncPayload::from_message(&message) else {
                tracing::debug!("presenter window ignored message: {message}");
                continue;
            };
            if let Some((slides, index)) = payload.snapshot() {
                self.slides = slides.to_vec();
                self.index = index;
                applied += 1;
            }
        }
        applied
    }

    pub fn current(&self) -> Option<&SlideSummary> {
        self.slides.get(self.index)
    }

    pub fn upcoming(&self) -> Option<&SlideSummary> {
        self.index
            .checked_add(1)
            .and_then(|i| self.slides.get(i))
    }

    pub fn navigate(&self, index: usize) {
        self.send(&SyncPayload::Nav { index });
    }

    pub fn control(&self, action: ControlAction) {
        self.send(&SyncPayload::Control { action });
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_closed()
    }

    /// Close from the window side (native close button).
    pub fn close(&self) {
        self.control(ControlAction::Close);
        self.closed.close();
    }

    fn send(&self, payload: &SyncPayload) {
        if let Ok(message) = payload.to_message() {
            self.port.post(message);
        }
    }
}
