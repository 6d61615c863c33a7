//! Anchor module - tracked anchors and their single owner.
//!
//! - [`TrackedAnchor`] - a named marker with a scene node and timestamps
//! - [`AnchorRegistry`] - matching, creation, hysteresis and staleness
//! - [`AnchorOwner`] - thread body applying all anchor/scene mutations

pub mod anchor;
pub mod owner;
pub mod registry;
pub mod types;

pub use anchor::TrackedAnchor;
pub use owner::{AnchorOwner, OwnerStats};
pub use registry::{AnchorRegistry, RegistryConfig, UpdateOutcome};
pub use types::AnchorId;
