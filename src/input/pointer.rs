//! Single-slot pointer cell
//!
//! The input side overwrites the slot on every pointer event; the simulation
//! reads whatever is there once per tick. Nothing is queued, so only the most
//! recent position is ever observed.

use tokio::sync::watch;

use crate::game::PointerPosition;

/// Writing half, owned by whoever receives pointer events
#[derive(Debug)]
pub struct PointerSlot {
    tx: watch::Sender<Option<PointerPosition>>,
}

/// Reading half, owned by the simulation
#[derive(Debug, Clone)]
pub struct PointerReader {
    rx: watch::Receiver<Option<PointerPosition>>,
}

/// Create an empty slot and a reader for it
pub fn pointer_channel() -> (PointerSlot, PointerReader) {
    let (tx, rx) = watch::channel(None);
    (PointerSlot { tx }, PointerReader { rx })
}

impl PointerSlot {
    /// Replace the stored position
    pub fn publish(&self, position: PointerPosition) {
        self.tx.send_replace(Some(position));
    }
}

impl PointerReader {
    /// Latest published position, if any
    pub fn latest(&self) -> Option<PointerPosition> {
        *self.rx.borrow()
    }
}
