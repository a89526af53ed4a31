//! Frame scheduling.
//!
//! The view never loops on its own. It asks a [`FrameScheduler`] for a
//! frame and the host calls [`MapView::on_frame`](crate::MapView::on_frame)
//! with that id when the frame is due.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Handle of a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

/// Host hook for requesting and cancelling animation frames.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self) -> FrameId;
    fn cancel_frame(&self, id: FrameId);
}

/// Scheduler that queues frame ids for the host to drain.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next_id: AtomicU64,
    pending: Mutex<BTreeSet<FrameId>>,
    requested: AtomicU64,
    cancelled: AtomicU64,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest pending frame.
    pub fn next_frame(&self) -> Option<FrameId> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_first()
    }

    pub fn pending(&self) -> Vec<FrameId> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn requested_count(&self) -> u64 {
        self.requested.load(Ordering::Relaxed)
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&self) -> FrameId {
        let id = FrameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.requested.fetch_add(1, Ordering::Relaxed);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        let removed = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed {
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }
}
