// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the overlay library

use std::path::Path;
use std::sync::mpsc;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use holistic_overlay::landmarks::filter_pose_landmarks;
use holistic_overlay::{
    Background, EffectMode, EngineOptions, FaceTopology, FrameRenderer, Landmark, LandmarkList,
    OverlayError, PerceptionEngine, PerceptionResult, RenderConfig, ReplayEngine, Surface,
};

fn gray_frame(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([100, 100, 100])))
}

/// Write a recording with one masked frame and return its path.
fn write_recording(dir: &Path, mask_value: u8) -> std::path::PathBuf {
    std::fs::create_dir_all(dir.join("masks")).unwrap();
    GrayImage::from_pixel(16, 16, Luma([mask_value]))
        .save(dir.join("masks/0000.png"))
        .unwrap();
    let path = dir.join("results.jsonl");
    std::fs::write(&path, "{\"segmentationMask\":\"masks/0000.png\"}\n").unwrap();
    path
}

/// Replay one frame through `engine` and collect the delivered results.
fn replay_one(engine: &mut ReplayEngine, frame: &DynamicImage) -> Vec<PerceptionResult> {
    let (tx, rx) = mpsc::channel();
    engine.on_result(Box::new(move |r| {
        let _ = tx.send(r);
    }));
    engine.submit_frame(frame).unwrap();
    rx.try_iter().collect()
}

fn render(effect: EffectMode, result: PerceptionResult) -> Surface {
    let renderer = FrameRenderer::new(
        RenderConfig::new().with_effect(effect),
        FaceTopology::default(),
    );
    let mut surface = Surface::new(16, 16);
    renderer.on_result(&mut surface, result);
    surface
}

#[test]
fn test_no_landmarks_renders_background_only() {
    let frame = gray_frame(16, 16);
    let renderer = FrameRenderer::default();
    let mut surface = Surface::new(16, 16);
    let stats = renderer.on_result(&mut surface, PerceptionResult::from_image(frame.clone()));

    assert_eq!(stats.background, Background::Image);
    assert_eq!(stats.connectors + stats.markers + stats.limbs, 0);
    assert!(stats.hand_box.is_none());
    assert!(surface.image().pixels().all(|p| p.0 == [100, 100, 100, 255]));
}

#[test]
fn test_pose_filter_keeps_positions() {
    let original: Vec<Landmark> = (0..33u8)
        .map(|i| Landmark::new(f32::from(i) / 33.0, 0.5))
        .collect();
    let mut pose = LandmarkList::new(original.clone());
    filter_pose_landmarks(&mut pose);

    assert_eq!(pose.len(), 33);
    assert_eq!(pose.present_count(), 14);
    for (i, expected) in original.iter().enumerate() {
        let removed = i <= 10 || (15..=22).contains(&i);
        match pose.get(i) {
            None => assert!(removed, "index {i} should be kept"),
            Some(lm) => {
                assert!(!removed, "index {i} should be removed");
                assert_eq!(lm, expected);
            }
        }
    }
}

#[test]
fn test_hand_box_from_left_hand_only() {
    let result = PerceptionResult {
        left_hand_landmarks: Some(LandmarkList::new(vec![
            Landmark::new(0.2, 0.3),
            Landmark::new(0.4, 0.1),
        ])),
        ..PerceptionResult::default()
    };
    let mut surface = Surface::new(100, 100);
    let stats = FrameRenderer::default().on_result(&mut surface, result);

    let bounds = stats.hand_box.unwrap();
    assert!((bounds.x_min - 0.2).abs() < f32::EPSILON);
    assert!((bounds.x_max - 0.4).abs() < f32::EPSILON);
    assert!((bounds.y_min - 0.1).abs() < f32::EPSILON);
    assert!((bounds.y_max - 0.3).abs() < f32::EPSILON);
}

#[test]
fn test_replayed_mask_differs_between_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let recording = write_recording(tmp.path(), 255);
    let frame = gray_frame(16, 16);
    let options = EngineOptions::new()
        .with_segmentation(true)
        .with_selfie_mode(false);

    let mut engine = ReplayEngine::open(&recording).unwrap();
    engine.configure(&options).unwrap();
    let mut results = replay_one(&mut engine, &frame);
    assert_eq!(results.len(), 1);
    let result = results.remove(0);
    assert!(result.segmentation_mask.is_some());

    let masked = render(EffectMode::Mask, result.clone());
    let cutout = render(EffectMode::Cutout, result);

    let m = masked.pixel(8, 8);
    let c = cutout.pixel(8, 8);
    assert_ne!(m, c);
    assert_eq!(m[3], 255);
    assert!(m[1] > m[0] && m[1] > m[2], "mask mode tints the person green: {m:?}");
    assert_eq!(c.0, [100, 100, 100, 255]);
}

#[test]
fn test_cutout_tints_background_blue() {
    let tmp = tempfile::tempdir().unwrap();
    let recording = write_recording(tmp.path(), 0);
    let mut engine = ReplayEngine::open(&recording).unwrap();
    engine
        .configure(&EngineOptions::new().with_segmentation(true))
        .unwrap();
    let result = replay_one(&mut engine, &gray_frame(16, 16)).remove(0);

    let p = render(EffectMode::Cutout, result).pixel(3, 3);
    assert_eq!(p[3], 255);
    assert!(p[2] > p[0] && p[2] > p[1], "background is tinted blue: {p:?}");
}

#[test]
fn test_release_stops_delivery() {
    let tmp = tempfile::tempdir().unwrap();
    let recording = write_recording(tmp.path(), 255);
    let mut engine = ReplayEngine::open(&recording).unwrap();
    let (tx, rx) = mpsc::channel::<PerceptionResult>();
    engine.on_result(Box::new(move |r| {
        let _ = tx.send(r);
    }));
    engine.release();

    let err = engine.submit_frame(&gray_frame(4, 4)).unwrap_err();
    assert!(matches!(err, OverlayError::EngineError(_)));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_malformed_recording_names_line() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.jsonl");
    std::fs::write(&path, "{}\n{\"poseLandmarks\": 5}\n").unwrap();
    let err = ReplayEngine::open(&path).unwrap_err();
    assert!(matches!(err, OverlayError::ResultFormatError(ref msg) if msg.contains("line 2")));
}
