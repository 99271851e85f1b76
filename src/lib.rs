// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Holistic Overlay
//!
//! Renders full-body landmark overlays on top of video frames. A perception engine
//! (pose, hands, face mesh, and an optional segmentation mask) reports one result
//! per frame; this crate turns each result into a single composited frame:
//!
//! - the source image, or a tinted segmentation composite of it
//! - elbow-to-wrist bridges and the pose skeleton with left/right markers
//! - both hands, with joint markers that shrink with depth
//! - face tessellation, eyes, eyebrows and lips
//! - a rectangle around both hands
//!
//! The landmark model itself is an external black box reached through the
//! [`PerceptionEngine`] trait. [`ReplayEngine`] replays results recorded as JSON
//! Lines, which is how the CLI and the tests drive the renderer.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use holistic_overlay::{
//!     EngineOptions, FaceTopology, FrameRenderer, PerceptionEngine, RenderConfig,
//!     ReplayEngine, Surface,
//! };
//! use std::sync::mpsc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let renderer = FrameRenderer::new(RenderConfig::default(), FaceTopology::default());
//!
//!     let mut engine = ReplayEngine::open("results.jsonl")?;
//!     engine.configure(&EngineOptions::new().with_segmentation(true))?;
//!     let (tx, rx) = mpsc::channel();
//!     engine.on_result(Box::new(move |result| {
//!         let _ = tx.send(result);
//!     }));
//!
//!     let frame = image::open("frame.png")?;
//!     engine.submit_frame(&frame)?;
//!     for result in rx.try_iter() {
//!         let mut surface = Surface::new(frame.width(), frame.height());
//!         let stats = renderer.on_result(&mut surface, result);
//!         println!("{} connectors, {} markers", stats.connectors, stats.markers);
//!         surface.image().save("overlay.png")?;
//!     }
//!     engine.release();
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Render every frame in a directory against a recording and save PNGs
//! holistic-overlay render --source frames/ --results results.jsonl --save
//!
//! # Tint the background instead of the person, and show a window
//! holistic-overlay render -s "frames/*.png" -r results.jsonl --effect cutout --show
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`renderer`] | [`FrameRenderer`]: fixed-order per-frame rendering |
//! | [`annotate`] | Connector, marker, and hand-box drawing |
//! | [`surface`] | RGBA drawing [`Surface`] with Porter-Duff compositing |
//! | [`config`] | [`RenderConfig`], [`DrawingStyle`], [`EffectMode`] |
//! | [`landmarks`] | [`Landmark`], [`LandmarkList`], pose filtering, bounding box |
//! | [`results`] | [`PerceptionResult`] and its serialized [`ResultRecord`] |
//! | [`engine`] | [`PerceptionEngine`] trait and [`ReplayEngine`] |
//! | [`source`] | Frame sources ([`Source`], [`SourceIterator`]) |
//! | [`io`] | Saving frames and numbering run directories |
//! | [`visualizer`] | Palette, connector topologies, live viewer |
//! | [`error`] | Error types ([`OverlayError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Real-time window display (default) |

// Modules
pub mod annotate;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod landmarks;
pub mod renderer;
pub mod results;
pub mod source;
pub mod surface;
pub mod visualizer;

// Re-export main types for convenience
pub use config::{DrawingStyle, EffectMode, RadiusSpec, RenderConfig};
pub use engine::{EngineOptions, PerceptionEngine, ReplayEngine, ResultHandler};
pub use error::{OverlayError, Result};
pub use landmarks::{BoundingBox, Landmark, LandmarkList};
pub use renderer::{Background, FrameRenderer, RenderStats};
pub use results::{PerceptionResult, ResultRecord};
pub use source::{Source, SourceIterator, SourceMeta};
pub use surface::{CompositeOp, Surface};
pub use visualizer::{Color, FaceTopology};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "holistic-overlay");
    }
}
