//! Inter-thread message types.
//!
//! The scheduler and the sweeper never touch anchors directly; they send
//! commands to the anchor owner and wait for its reply.

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use nalgebra::Vector3;
use tracing::warn;

use crate::anchors::{AnchorId, UpdateOutcome};

use super::shared_state::SharedState;

/// How long a requester waits for a reply before re-checking shutdown.
const REPLY_POLL: Duration = Duration::from_millis(100);

/// World position resolved for one detection.
#[derive(Debug, Clone)]
pub struct StabilizedPosition {
    /// Anchor name the position belongs to, e.g. `"innerLips"`.
    pub name: String,

    /// Averaged world position.
    pub position: Vector3<f64>,

    /// Timestamp of the frame the detection came from.
    pub frame_timestamp_ns: u64,
}

/// Command sent to the anchor owner.
pub enum AnchorCommand {
    /// Match the positions of one detection cycle, in order.
    Apply {
        updates: Vec<StabilizedPosition>,
        /// Wall-clock time recorded as `last_updated` on matched anchors.
        observed_at: Instant,
        reply: Sender<Vec<UpdateOutcome>>,
    },

    /// Hide visible anchors not matched within `stale_after` of `now`.
    HideStale {
        now: Instant,
        stale_after: Duration,
        reply: Sender<Vec<AnchorId>>,
    },
}

/// Send a command built around a fresh reply channel and block until the
/// owner answers.
///
/// Returns `None` if the owner is gone or shutdown was requested while
/// waiting; in-flight work is discarded in that case.
pub(crate) fn request<T>(
    commands: &Sender<AnchorCommand>,
    shared: &SharedState,
    build: impl FnOnce(Sender<T>) -> AnchorCommand,
) -> Option<T> {
    let (reply_tx, reply_rx): (Sender<T>, Receiver<T>) = bounded(1);
    if commands.send(build(reply_tx)).is_err() {
        warn!("Anchor owner is gone, dropping command");
        return None;
    }

    loop {
        match reply_rx.recv_timeout(REPLY_POLL) {
            Ok(reply) => return Some(reply),
            Err(RecvTimeoutError::Timeout) => {
                if shared.is_shutdown_requested() {
                    return None;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}
