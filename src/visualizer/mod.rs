// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tools: palette, connector topologies, and the live viewer.

/// Color definitions and the overlay palette.
pub mod color;

/// Delaunay face mesh.
pub mod mesh;

/// Connector sets for pose, hand, and face landmarks.
pub mod skeleton;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::Color;
pub use skeleton::{Connection, FaceTopology};

#[cfg(feature = "visualize")]
pub use viewer::Viewer;
