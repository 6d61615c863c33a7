//! Tracking system orchestration and thread management.
//!
//! This module contains the top-level `FaceTrackingSystem` that spawns and
//! coordinates the scheduler, sweeper and anchor owner threads, along with
//! shared state and inter-thread messaging types.

pub mod messages;
pub mod scheduler;
pub mod shared_state;
pub mod sweeper;
mod tracking_system;

#[cfg(test)]
pub(crate) mod test_support;

pub use messages::{AnchorCommand, StabilizedPosition};
pub use scheduler::{CycleReport, PipelineScheduler, SchedulerConfig, SchedulerStats};
pub use shared_state::SharedState;
pub use sweeper::{StalenessSweeper, SweeperConfig};
pub use tracking_system::{Collaborators, FaceTrackingSystem};
