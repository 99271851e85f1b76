// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;
use std::sync::mpsc;
#[cfg(feature = "visualize")]
use std::time::Duration;

use image::DynamicImage;

use crate::cli::args::RenderArgs;
use crate::config::RenderConfig;
use crate::engine::{EngineOptions, PerceptionEngine, ReplayEngine};
use crate::error::{OverlayError, Result};
use crate::io::{FrameWriter, find_next_run_dir};
use crate::renderer::{FrameRenderer, RenderStats};
use crate::results::PerceptionResult;
use crate::source::{Source, SourceIterator, SourceMeta};
use crate::surface::Surface;
use crate::visualizer::FaceTopology;
#[cfg(feature = "visualize")]
use crate::visualizer::Viewer;
use crate::{VERSION, section, verbose, warn};

/// Parent directory of saved runs.
pub const RUNS_DIR: &str = "runs/overlay";

/// Totals for one `render` invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    /// Frames read from the source.
    pub frames: usize,
    /// Frames rendered from delivered results.
    pub rendered: usize,
    /// Frames written to disk.
    pub saved: usize,
    /// Sum of per-frame render times in milliseconds.
    pub total_ms: f64,
    /// Run directory, when saving.
    pub save_dir: Option<PathBuf>,
}

/// Live window across frames. Opened on first use and never reopened once the
/// user closes it.
#[cfg(any(feature = "visualize", test))]
#[derive(Debug)]
enum ViewerState<V> {
    Unopened,
    Open(V),
    Closed,
}

#[cfg(any(feature = "visualize", test))]
impl<V> ViewerState<V> {
    const fn new() -> Self {
        Self::Unopened
    }

    /// Show one frame, opening the window first if needed. `show` returns
    /// `false` once the window has been closed.
    fn present<O, S>(&mut self, open: O, show: S) -> Result<()>
    where
        O: FnOnce() -> Result<V>,
        S: FnOnce(&mut V) -> Result<bool>,
    {
        if matches!(self, Self::Unopened) {
            *self = Self::Open(open()?);
        }
        let keep_open = match self {
            Self::Open(viewer) => show(viewer)?,
            Self::Unopened | Self::Closed => return Ok(()),
        };
        if !keep_open {
            verbose!("Viewer closed");
            *self = Self::Closed;
        }
        Ok(())
    }
}

/// Run the render command: replay recorded results over the source frames.
///
/// # Errors
///
/// Returns an error if the recording, topology, or source cannot be opened, the
/// engine rejects its options, or a frame cannot be read or saved.
pub fn run_render(args: &RenderArgs) -> Result<RenderSummary> {
    run_render_in(args, RUNS_DIR)
}

/// [`run_render`] with saved runs placed under `runs_dir`.
///
/// # Errors
///
/// See [`run_render`].
#[allow(clippy::cast_precision_loss)]
pub fn run_render_in(args: &RenderArgs, runs_dir: &str) -> Result<RenderSummary> {
    if !(args.pixel_ratio.is_finite() && args.pixel_ratio > 0.0) {
        return Err(OverlayError::ConfigError(format!(
            "pixel ratio must be positive, got {}",
            args.pixel_ratio
        )));
    }

    let topology = match &args.face_topology {
        Some(path) => FaceTopology::load_tesselation(path)?,
        None => FaceTopology::default(),
    };
    let tess_edges = topology
        .tesselation()
        .map_or_else(|| "derived".to_string(), |edges| format!("{} edges", edges.len()));
    let renderer = FrameRenderer::new(RenderConfig::new().with_effect(args.effect), topology);

    let options = EngineOptions::new()
        .with_segmentation(args.segmentation)
        .with_selfie_mode(args.selfie);
    let mut engine = ReplayEngine::open(&args.results)?;
    engine.configure(&options)?;
    let (sender, receiver) = mpsc::channel::<PerceptionResult>();
    engine.on_result(Box::new(move |result| {
        // Receiver lives for the whole run.
        let _ = sender.send(result);
    }));

    let source = Source::from(args.source.as_str());
    let frames = SourceIterator::new(source)?;
    let total = frames.total_frames();

    section!("holistic-overlay {VERSION} 🚀 render");
    verbose!(
        "{} frames, {} recorded results, effect={}, tessellation={}",
        total,
        engine.remaining(),
        args.effect,
        tess_edges
    );

    let mut summary = RenderSummary::default();
    let mut writer = if args.save {
        let dir = find_next_run_dir(runs_dir, "render");
        summary.save_dir = Some(dir.clone());
        Some(FrameWriter::new(dir))
    } else {
        None
    };
    #[cfg(feature = "visualize")]
    let mut viewer = ViewerState::<Viewer>::new();
    #[cfg(not(feature = "visualize"))]
    if args.show {
        warn!("--show requires the 'visualize' feature. Rebuild with --features visualize.");
    }

    for item in frames {
        let (frame, meta) = item?;
        summary.frames += 1;
        engine.submit_frame(&frame)?;

        for result in receiver.try_iter() {
            let mut surface = surface_for(args, &frame);
            let detail = result.verbose();
            let stats = renderer.on_result(&mut surface, result);
            log_frame(&meta, &surface, &detail, &stats);
            summary.rendered += 1;
            summary.total_ms += stats.render_ms;

            if let Some(writer) = writer.as_mut() {
                writer.save(&meta, surface.image())?;
                summary.saved = writer.saved();
            }

            #[cfg(feature = "visualize")]
            if args.show {
                let (w, h) = (surface.width() as usize, surface.height() as usize);
                viewer.present(
                    || Viewer::new("holistic-overlay", w, h),
                    |v| Ok(v.show(&surface)? && v.wait(Duration::from_millis(200))?),
                )?;
            }
        }
    }

    if engine.remaining() > 0 {
        warn!(
            "{} recorded results had no matching frame and were not replayed",
            engine.remaining()
        );
    }
    engine.release();

    verbose!(
        "Speed: {:.1}ms render per frame",
        summary.total_ms / summary.rendered.max(1) as f64
    );
    if let Some(dir) = &summary.save_dir {
        verbose!("Results saved to {}", dir.display());
    }
    Ok(summary)
}

/// Surface for one frame: the requested logical size, or the frame size.
fn surface_for(args: &RenderArgs, frame: &DynamicImage) -> Surface {
    let width = args.width.unwrap_or_else(|| frame.width()).max(1);
    let height = args.height.unwrap_or_else(|| frame.height()).max(1);
    Surface::with_pixel_ratio(width, height, args.pixel_ratio)
}

fn log_frame(meta: &SourceMeta, surface: &Surface, detail: &str, stats: &RenderStats) {
    verbose!(
        "image {}/{} {}: {}x{} {}, {:.1}ms",
        meta.frame_idx + 1,
        meta.total_frames,
        meta.path,
        surface.width(),
        surface.height(),
        detail,
        stats.render_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectMode;
    use image::RgbImage;

    fn args(source: String, results: PathBuf) -> RenderArgs {
        RenderArgs {
            source,
            results,
            effect: EffectMode::Mask,
            width: None,
            height: None,
            pixel_ratio: 1.0,
            face_topology: None,
            segmentation: true,
            selfie: false,
            save: false,
            show: false,
            verbose: false,
        }
    }

    #[test]
    fn test_render_saves_one_png_per_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let frames = tmp.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        RgbImage::new(8, 6).save(frames.join("a.png")).unwrap();
        RgbImage::new(8, 6).save(frames.join("b.png")).unwrap();
        let results = tmp.path().join("results.jsonl");
        std::fs::write(&results, "{\"poseLandmarks\":[{\"x\":0.5,\"y\":0.5}]}\n").unwrap();

        let mut args = args(frames.to_string_lossy().to_string(), results);
        args.save = true;
        args.pixel_ratio = 2.0;
        let runs = tmp.path().join("runs").to_string_lossy().to_string();
        let summary = run_render_in(&args, &runs).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.saved, 2);
        let dir = summary.save_dir.unwrap();
        assert_eq!(dir, tmp.path().join("runs").join("render"));
        let saved = image::open(dir.join("a.png")).unwrap();
        assert_eq!((saved.width(), saved.height()), (16, 12));
        assert!(dir.join("b.png").exists());
    }

    #[test]
    fn test_render_rejects_bad_pixel_ratio() {
        let mut args = args("x.png".to_string(), PathBuf::from("r.jsonl"));
        args.pixel_ratio = 0.0;
        assert!(matches!(run_render(&args), Err(OverlayError::ConfigError(_))));
    }

    #[test]
    fn test_render_missing_results() {
        let args = args("x.png".to_string(), PathBuf::from("/no/such/results.jsonl"));
        assert!(matches!(run_render(&args), Err(OverlayError::IoError(_))));
    }

    #[test]
    fn test_closed_viewer_is_not_reopened() {
        let mut state = ViewerState::new();
        let (mut opened, mut shown) = (0, 0);
        for keep_open in [true, false, true, true] {
            state
                .present(
                    || {
                        opened += 1;
                        Ok(())
                    },
                    |_| {
                        shown += 1;
                        Ok(keep_open)
                    },
                )
                .unwrap();
        }
        assert_eq!((opened, shown), (1, 2));
        assert!(matches!(state, ViewerState::Closed));
    }

    #[test]
    fn test_viewer_open_error_propagates() {
        let mut state = ViewerState::<()>::new();
        let err = state.present(
            || Err(OverlayError::VisualizerError("no display".to_string())),
            |_| Ok(true),
        );
        assert!(err.is_err());
        assert!(matches!(state, ViewerState::Unopened));
    }

    #[test]
    fn test_surface_for_uses_requested_size() {
        let mut a = args(String::new(), PathBuf::new());
        let frame = DynamicImage::new_rgb8(10, 4);
        assert_eq!(surface_for(&a, &frame).logical_size(), (10, 4));
        a.width = Some(20);
        a.height = Some(30);
        assert_eq!(surface_for(&a, &frame).logical_size(), (20, 30));
    }
}
