pub mod anchors;
pub mod config;
pub mod detection;
pub mod geometry;
pub mod io;
pub mod localization;
pub mod scene;
pub mod session;
pub mod system;
