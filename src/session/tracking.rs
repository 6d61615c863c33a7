//! Session tracking quality and the advisory surfaced to the user.

/// Why tracking is currently limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedReason {
    /// Session just started and has not built a map yet.
    Initializing,
    ExcessiveMotion,
    InsufficientFeatures,
    Relocalizing,
}

/// Tracking quality reported by the camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// Tracking unavailable; hit tests return nothing useful.
    NotAvailable,
    /// Tracking works with reduced quality.
    Limited(LimitedReason),
    /// Tracking works normally.
    Normal,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::NotAvailable
    }
}

/// Transient hint for the HUD. Never affects the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingAdvisory {
    /// Show a progress indicator with the given title.
    Progress(&'static str),
    /// Tell the user tracking is not available.
    Unavailable,
    /// Hide any advisory.
    Clear,
}

impl TrackingState {
    pub fn advisory(self) -> TrackingAdvisory {
        match self {
            Self::Limited(LimitedReason::Initializing) => TrackingAdvisory::Progress("Initializing"),
            Self::NotAvailable => TrackingAdvisory::Unavailable,
            _ => TrackingAdvisory::Clear,
        }
    }
}
