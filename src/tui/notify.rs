//! Auto-dismissing status banner. One slot; each `notify` replaces both the
//! text and the hide deadline, so only the latest message's timer controls
//! visibility.

use std::time::{Duration, Instant};

const DISPLAY_FOR: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct TransientNotifier {
    slot: Option<(String, Instant)>,
}

impl TransientNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.slot = Some((message.into(), Instant::now() + DISPLAY_FOR));
    }

    /// Current message, if its deadline has not passed.
    pub fn message(&self) -> Option<&str> {
        match &self.slot {
            Some((text, deadline)) if Instant::now() < *deadline => Some(text),
            _ => None,
        }
    }

    /// Drop an expired message. Called from the tick arm of the event loop.
    pub fn prune(&mut self) {
        if let Some((_, deadline)) = &self.slot {
            if Instant::now() >= *deadline {
                self.slot = None;
            }
        }
    }

    #[cfg(test)]
    fn deadline(&self) -> Option<Instant> {
        self.slot.as_ref().map(|(_, d)| *d)
    }
}
