// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-frame rendering of perception results.
//!
//! [`FrameRenderer::on_result`] repaints the whole surface from one result in a
//! fixed order. Later passes paint over earlier ones, so the order is the z-order:
//!
//! 1. remove unused pose landmarks
//! 2. clear
//! 3. background (video or segmentation composite)
//! 4. elbow-to-wrist bridges
//! 5. pose skeleton and left/right pose markers
//! 6. right hand, then left hand
//! 7. face tessellation, right eye and eyebrow, left eye and eyebrow, lips
//! 8. hand bounding box
//!
//! Rendering keeps no state between frames and never fails.

use std::time::Instant;

use crate::annotate::{draw_connectors, draw_hand_bounding_box, draw_landmarks, draw_segment};
use crate::config::{EffectMode, RenderConfig};
use crate::landmarks::{BoundingBox, LandmarkList};
use crate::results::PerceptionResult;
use crate::surface::{CompositeOp, Surface};
use crate::visualizer::FaceTopology;
use crate::visualizer::color::Color;
use crate::visualizer::skeleton::{
    FACEMESH_LEFT_EYE, FACEMESH_LEFT_EYEBROW, FACEMESH_LIPS, FACEMESH_RIGHT_EYE,
    FACEMESH_RIGHT_EYEBROW, HAND_CONNECTIONS, HAND_WRIST, LEFT_ELBOW, POSE_CONNECTIONS,
    POSE_LANDMARKS_LEFT, POSE_LANDMARKS_RIGHT, RIGHT_ELBOW,
};

/// What was painted as the frame background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Neither image nor mask was available; the surface stays transparent.
    None,
    /// The raw source image.
    Image,
    /// Segmentation mask tinted and composited with the source image.
    Segmentation,
}

/// Counters describing one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    /// Background that was painted.
    pub background: Background,
    /// Elbow-to-wrist bridges drawn.
    pub limbs: usize,
    /// Connector segments drawn across all passes, bridges excluded.
    pub connectors: usize,
    /// Landmark markers drawn.
    pub markers: usize,
    /// Hand bounding box in normalized coordinates, if one was drawn.
    pub hand_box: Option<BoundingBox>,
    /// Wall-clock render time in milliseconds.
    pub render_ms: f64,
}

/// Paint the frame background.
///
/// Without a mask the source image fills the surface. With a mask, the mask is
/// painted first, the tint keeps only the foreground (`mask`/`both`) or only the
/// background (`cutout`), the source image fills the remaining holes underneath,
/// and the composite mode is reset to normal painting.
#[allow(clippy::cast_precision_loss)]
pub fn composite_background(
    surface: &mut Surface,
    result: &PerceptionResult,
    effect: EffectMode,
    foreground_tint: Color,
    background_tint: Color,
) -> Background {
    let Some(mask) = result.segmentation_mask.as_ref() else {
        return match result.source_image.as_ref() {
            Some(image) => {
                surface.draw_image(image);
                Background::Image
            }
            None => Background::None,
        };
    };

    surface.draw_mask(mask);
    let (w, h) = (surface.width() as f32, surface.height() as f32);
    if effect.tints_foreground() {
        surface.set_composite(CompositeOp::SourceIn);
        surface.fill_rect(0.0, 0.0, w, h, foreground_tint);
    } else {
        surface.set_composite(CompositeOp::SourceOut);
        surface.fill_rect(0.0, 0.0, w, h, background_tint);
    }
    if let Some(image) = result.source_image.as_ref() {
        surface.set_composite(CompositeOp::DestinationAtop);
        surface.draw_image(image);
    }
    surface.set_composite(CompositeOp::SourceOver);
    Background::Segmentation
}

/// Renders perception results onto a surface.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    config: RenderConfig,
    topology: FaceTopology,
}

impl FrameRenderer {
    /// Create a renderer with the given configuration and face topology.
    #[must_use]
    pub const fn new(config: RenderConfig, topology: FaceTopology) -> Self {
        Self { config, topology }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Repaint `surface` from one result.
    ///
    /// Takes ownership of the result: the pose filter mutates it and nothing is
    /// kept after the call returns.
    pub fn on_result(&self, surface: &mut Surface, mut result: PerceptionResult) -> RenderStats {
        let start = Instant::now();
        let config = &self.config;

        result.remove_unused_landmarks();

        surface.set_composite(CompositeOp::SourceOver);
        surface.clear();

        let background = composite_background(
            surface,
            &result,
            config.effect,
            config.foreground_tint,
            config.background_tint,
        );

        let limbs = self.connect_limbs(surface, &result);

        let mut connectors = 0;
        let mut markers = 0;

        if let Some(pose) = result.pose_landmarks.as_ref() {
            connectors += draw_connectors(surface, pose, &POSE_CONNECTIONS, &config.pose_connectors);
            markers += draw_landmarks(
                surface,
                POSE_LANDMARKS_LEFT.iter().map(|&i| pose.get(i)),
                &config.pose_left_markers,
            );
            markers += draw_landmarks(
                surface,
                POSE_LANDMARKS_RIGHT.iter().map(|&i| pose.get(i)),
                &config.pose_right_markers,
            );
        }

        for (hand, marker_style) in [
            (result.right_hand_landmarks.as_ref(), &config.right_hand_markers),
            (result.left_hand_landmarks.as_ref(), &config.left_hand_markers),
        ] {
            if let Some(hand) = hand {
                connectors += draw_connectors(surface, hand, &HAND_CONNECTIONS, &config.hand_connectors);
                markers += draw_landmarks(surface, hand.slots().iter().map(Option::as_ref), marker_style);
            }
        }

        if let Some(face) = result.face_landmarks.as_ref() {
            connectors += self.draw_face(surface, face);
        }

        let box_style = if result.pose_landmarks.is_some() {
            &config.hand_box
        } else {
            &config.hand_box_without_pose
        };
        let hand_box = draw_hand_bounding_box(
            surface,
            result.left_hand_landmarks.as_ref(),
            result.right_hand_landmarks.as_ref(),
            box_style,
        );

        RenderStats {
            background,
            limbs,
            connectors,
            markers,
            hand_box,
            render_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Bridge each pose elbow to the matching hand's wrist.
    fn connect_limbs(&self, surface: &mut Surface, result: &PerceptionResult) -> usize {
        let Some(pose) = result.pose_landmarks.as_ref() else {
            return 0;
        };
        let mut drawn = 0;
        for (elbow, hand) in [
            (RIGHT_ELBOW, result.right_hand_landmarks.as_ref()),
            (LEFT_ELBOW, result.left_hand_landmarks.as_ref()),
        ] {
            let endpoints = hand.and_then(|h| h.get(HAND_WRIST)).zip(pose.get(elbow));
            if let Some((wrist, elbow)) = endpoints
                && draw_segment(surface, elbow, wrist, &self.config.limb)
            {
                drawn += 1;
            }
        }
        drawn
    }

    fn draw_face(&self, surface: &mut Surface, face: &LandmarkList) -> usize {
        let config = &self.config;
        let tesselation = self.topology.tesselation_for(face);
        let passes = [
            (tesselation.as_ref(), &config.face_tesselation),
            (&FACEMESH_RIGHT_EYE[..], &config.right_eye),
            (&FACEMESH_RIGHT_EYEBROW[..], &config.right_eye),
            (&FACEMESH_LEFT_EYE[..], &config.left_eye),
            (&FACEMESH_LEFT_EYEBROW[..], &config.left_eye),
            (&FACEMESH_LIPS[..], &config.lips),
        ];
        passes
            .into_iter()
            .map(|(connections, style)| draw_connectors(surface, face, connections, style))
            .sum()
    }
}
