//! Bridge between the host application and the dispatcher.
//!
//! The host writes one JSON event per line: `{"command": ..., "context": {...}, "state": {...}}`.

use std::io::BufRead;

use nn_apply_runtime::{Dispatcher, Event, Platform};

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("Failed to read events: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome counts of an event loop run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub handled: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Feed every event read from `reader` to the dispatcher, in order, until end of input.
///
/// Lines that are not valid events are skipped. A failing handler does not stop the loop.
pub fn run<P: Platform, R: BufRead>(
    dispatcher: &mut Dispatcher<P>,
    reader: R,
) -> Result<LoopSummary, HostError> {
    let mut summary = LoopSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<Event>(line) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Skipping malformed event on line {}: {e}", index + 1);
                summary.skipped += 1;
                continue;
            }
        };

        log::debug!("Received '{}' event", event.command);
        match dispatcher.dispatch_event(event) {
            Ok(()) => summary.handled += 1,
            Err(_) => summary.failed += 1,
        }
    }

    Ok(summary)
}
