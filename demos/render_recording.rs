// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Example script rendering overlays from a recorded results file.
//!
//! Usage:
//!
//! ```bash
//! cargo run --example render_recording -- results.jsonl frame.png
//! ```
//!
//! Without arguments a synthetic pose with both hands is rendered over a blank
//! frame, which is handy for checking styles.

use std::sync::mpsc;

use holistic_overlay::{
    FaceTopology, FrameRenderer, Landmark, LandmarkList, PerceptionEngine, PerceptionResult,
    RenderConfig, ReplayEngine, Result, Surface,
};
use image::DynamicImage;

fn synthetic_result(frame: DynamicImage) -> PerceptionResult {
    // Shoulders, elbows, wrists, hips, knees, ankles.
    let mut pose = vec![Landmark::new(0.5, 0.5).with_visibility(0.0); 33];
    for (i, x, y) in [
        (11, 0.60, 0.30),
        (12, 0.40, 0.30),
        (13, 0.68, 0.45),
        (14, 0.32, 0.45),
        (15, 0.70, 0.58),
        (16, 0.30, 0.58),
        (23, 0.56, 0.62),
        (24, 0.44, 0.62),
        (25, 0.57, 0.78),
        (26, 0.43, 0.78),
        (27, 0.58, 0.93),
        (28, 0.42, 0.93),
    ] {
        pose[i] = Landmark::new(x, y).with_visibility(0.99);
    }
    let hand = |cx: f32| {
        LandmarkList::new(
            (0..21u8)
                .map(|j| {
                    let t = f32::from(j) / 20.0;
                    Landmark::new(cx + (t - 0.5) * 0.06, 0.60 + t * 0.08).with_z(-0.15 + t * 0.25)
                })
                .collect(),
        )
    };

    PerceptionResult {
        pose_landmarks: Some(LandmarkList::new(pose)),
        left_hand_landmarks: Some(hand(0.70)),
        right_hand_landmarks: Some(hand(0.30)),
        ..PerceptionResult::from_image(frame)
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let renderer = FrameRenderer::new(RenderConfig::default(), FaceTopology::default());

    let results: Vec<PerceptionResult> = if let [recording, frame_path, ..] = args.as_slice() {
        let frame = image::open(frame_path)?;
        let mut engine = ReplayEngine::open(recording)?;
        let (tx, rx) = mpsc::channel();
        engine.on_result(Box::new(move |r| {
            let _ = tx.send(r);
        }));
        engine.submit_frame(&frame)?;
        engine.release();
        rx.try_iter().collect()
    } else {
        println!("No recording given, rendering a synthetic pose");
        vec![synthetic_result(DynamicImage::new_rgb8(640, 480))]
    };

    for (i, result) in results.into_iter().enumerate() {
        let (w, h) = result
            .source_image
            .as_ref()
            .map_or((640, 480), |img| (img.width(), img.height()));
        let mut surface = Surface::new(w, h);
        let stats = renderer.on_result(&mut surface, result);
        let out = format!("overlay_{i}.png");
        surface.image().save(&out)?;
        println!(
            "Saved {out}: {} limbs, {} connectors, {} markers, {:.1}ms",
            stats.limbs, stats.connectors, stats.markers, stats.render_ms
        );
    }
    Ok(())
}
