//! Data sources outside a live camera session.

pub mod replay;

pub use replay::{load_recording, ReplayFrame, ReplaySession};
