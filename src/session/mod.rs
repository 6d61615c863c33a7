//! Camera/session collaborators consumed by the pipeline.
//!
//! The live session supplies frames and ray casts into its spatial map; the
//! display reports how the device is held. Both are implemented outside this
//! crate (or by `io::replay` for recorded sessions).

pub mod frame;
pub mod tracking;

pub use frame::{ArSession, DisplayState, FixedDisplay, Frame, FrameBuffer, HitResult, HitTestKind};
pub use tracking::{LimitedReason, TrackingAdvisory, TrackingState};
