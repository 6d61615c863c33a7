//! Shared state between the pipeline threads.
//!
//! The `SharedState` struct holds the anchor registry and the flags every
//! thread needs, protected by appropriate synchronization primitives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::anchors::{AnchorRegistry, RegistryConfig, TrackedAnchor};
use crate::session::TrackingState;

/// State shared by the scheduler, the sweeper, the anchor owner and callers.
pub struct SharedState {
    /// All anchors of the session.
    /// Protected by RwLock: only the anchor owner writes, anyone may read.
    pub anchors: RwLock<AnchorRegistry>,

    /// Last tracking quality reported by the session.
    tracking_state: Mutex<TrackingState>,

    /// Request all threads to finish and exit.
    shutdown_requested: AtomicBool,
}

impl SharedState {
    /// Create a new SharedState with an empty registry.
    pub fn new(registry: RegistryConfig) -> Arc<Self> {
        Arc::new(Self {
            anchors: RwLock::new(AnchorRegistry::new(registry)),
            tracking_state: Mutex::new(TrackingState::default()),
            shutdown_requested: AtomicBool::new(false),
        })
    }

    /// Copy of every anchor, taken under the read lock.
    pub fn anchor_snapshot(&self) -> Vec<TrackedAnchor> {
        self.anchors.read().anchors().to_vec()
    }

    pub fn tracking_state(&self) -> TrackingState {
        *self.tracking_state.lock()
    }

    /// Store the new tracking state, returning the previous one.
    pub fn set_tracking_state(&self, state: TrackingState) -> TrackingState {
        std::mem::replace(&mut *self.tracking_state.lock(), state)
    }

    /// Request shutdown of all pipeline threads.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown was requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}
