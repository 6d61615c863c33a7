//! Stabilized localization: view-space region to world position.

mod localizer;

pub use localizer::{HitSelection, LocalizerConfig, StabilizedLocalizer};
