//! Notification interface for loading detail content into slots.

use tracing::info;

use crate::LodLeaf;

/// Receives a notification whenever a leaf gains a freshly assigned slot.
///
/// Called synchronously from inside [`QuadtreeLod::step`](crate::QuadtreeLod::step)
/// for every child created by a split and every parent restored by a merge.
/// The manager does not wait for the content to be loaded; the sink may
/// queue the work and return immediately.
///
/// Any `FnMut(&LodLeaf)` closure is a sink.
pub trait DetailSink {
    /// `leaf.slot` needs to be filled with content for `leaf`'s region.
    fn detail_needed(&mut self, leaf: &LodLeaf);
}

impl<F: FnMut(&LodLeaf)> DetailSink for F {
    fn detail_needed(&mut self, leaf: &LodLeaf) {
        self(leaf);
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DetailSink for NullSink {
    fn detail_needed(&mut self, _leaf: &LodLeaf) {}
}

/// Emits an `info` event per notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DetailSink for LogSink {
    fn detail_needed(&mut self, leaf: &LodLeaf) {
        info!(
            node = %leaf.id,
            x = leaf.origin.x,
            z = leaf.origin.y,
            size = leaf.size,
            slot = ?leaf.slot,
            "node detail requested"
        );
    }
}

/// Keeps every notification, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    /// Leaves in the order they were reported.
    pub notified: Vec<LodLeaf>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.notified.clear();
    }
}

impl DetailSink for RecordingSink {
    fn detail_needed(&mut self, leaf: &LodLeaf) {
        self.notified.push(*leaf);
    }
}
