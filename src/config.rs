// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Render configuration and drawing styles.
//!
//! This module defines the [`RenderConfig`] struct, which is built once at startup
//! and passed to every render call. It selects the segmentation effect and holds
//! the stroke and marker style of every drawing pass.

use std::fmt;
use std::str::FromStr;

use crate::error::OverlayError;
use crate::landmarks::Landmark;
use crate::visualizer::Color;
use crate::visualizer::color::{
    BACKGROUND_TINT, COLOR_LEFT, COLOR_RIGHT, FOREGROUND_TINT, TESSELATION_COLOR,
};

/// Which side of the segmentation mask receives the tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectMode {
    /// Tint the foreground (the person) green.
    #[default]
    Mask,
    /// Tint the background blue.
    Cutout,
    /// Same as [`EffectMode::Mask`].
    Both,
}

impl EffectMode {
    /// Check if this mode tints the foreground side of the mask.
    #[must_use]
    pub const fn tints_foreground(self) -> bool {
        matches!(self, Self::Mask | Self::Both)
    }
}

impl FromStr for EffectMode {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mask" => Ok(Self::Mask),
            "cutout" | "background" => Ok(Self::Cutout),
            "both" => Ok(Self::Both),
            other => Err(OverlayError::ConfigError(format!(
                "Unknown effect '{other}', expected one of: mask, cutout, both"
            ))),
        }
    }
}

impl fmt::Display for EffectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mask => "mask",
            Self::Cutout => "cutout",
            Self::Both => "both",
        };
        f.write_str(name)
    }
}

/// Linear interpolation from `[x0, x1]` to `[y0, y1]`, clamped to the output range.
#[must_use]
pub fn lerp(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + t * (y1 - y0)
}

/// Marker radius policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusSpec {
    /// Same radius for every marker.
    Fixed(f32),
    /// Radius interpolated from the landmark depth. Landmarks without depth are
    /// treated as `z = 0`.
    DepthLerp {
        /// Depth mapped to `r_near`.
        z_near: f32,
        /// Depth mapped to `r_far`.
        z_far: f32,
        /// Radius at `z_near` and closer.
        r_near: f32,
        /// Radius at `z_far` and farther.
        r_far: f32,
    },
}

impl RadiusSpec {
    /// Depth mapping used for hand joints: `z = -0.15` gives 10 px, `z = 0.1` gives 1 px.
    pub const HAND_DEPTH: Self = Self::DepthLerp {
        z_near: -0.15,
        z_far: 0.1,
        r_near: 10.0,
        r_far: 1.0,
    };

    /// Radius for one landmark.
    #[must_use]
    pub fn radius_for(&self, landmark: &Landmark) -> f32 {
        match *self {
            Self::Fixed(r) => r,
            Self::DepthLerp {
                z_near,
                z_far,
                r_near,
                r_far,
            } => lerp(landmark.z.unwrap_or(0.0), z_near, z_far, r_near, r_far),
        }
    }
}

/// Stroke and marker style for one drawing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingStyle {
    /// Stroke color for connectors and marker outlines.
    pub color: Color,
    /// Marker fill. `None` fills with `color`.
    pub fill_color: Option<Color>,
    /// Stroke width in backing pixels.
    pub line_width: f32,
    /// Marker radius policy.
    pub radius: RadiusSpec,
    /// Markers with a visibility score below this are skipped.
    pub visibility_min: f32,
}

impl Default for DrawingStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            fill_color: None,
            line_width: 4.0,
            radius: RadiusSpec::Fixed(6.0),
            visibility_min: 0.5,
        }
    }
}

impl DrawingStyle {
    /// Default style with the given stroke color.
    #[must_use]
    pub fn stroke(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Set the stroke color.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the marker fill color.
    #[must_use]
    pub const fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    /// Set the stroke width.
    #[must_use]
    pub const fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the marker radius policy.
    #[must_use]
    pub const fn with_radius(mut self, radius: RadiusSpec) -> Self {
        self.radius = radius;
        self
    }

    /// Set the marker visibility threshold.
    #[must_use]
    pub const fn with_visibility_min(mut self, min: f32) -> Self {
        self.visibility_min = min;
        self
    }

    /// Effective marker fill.
    #[must_use]
    pub fn fill(&self) -> Color {
        self.fill_color.unwrap_or(self.color)
    }
}

/// Configuration for frame rendering.
///
/// Immutable for the life of the process; construct once and share with the
/// renderer.
///
/// # Example
///
/// ```rust
/// use holistic_overlay::{EffectMode, RenderConfig};
///
/// let config = RenderConfig::new()
///     .with_effect(EffectMode::Cutout)
///     .with_limb_width(3.0)
///     .with_pose_visibility_min(0.8);
/// assert_eq!(config.effect, EffectMode::Cutout);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Segmentation effect.
    pub effect: EffectMode,
    /// Tint for foreground pixels in mask mode.
    pub foreground_tint: Color,
    /// Tint for background pixels in cutout mode.
    pub background_tint: Color,
    /// Elbow-to-wrist bridges.
    pub limb: DrawingStyle,
    /// Pose skeleton.
    pub pose_connectors: DrawingStyle,
    /// Pose markers on the subject's left side.
    pub pose_left_markers: DrawingStyle,
    /// Pose markers on the subject's right side.
    pub pose_right_markers: DrawingStyle,
    /// Hand rig lines, both hands.
    pub hand_connectors: DrawingStyle,
    /// Left hand joints.
    pub left_hand_markers: DrawingStyle,
    /// Right hand joints.
    pub right_hand_markers: DrawingStyle,
    /// Face tessellation.
    pub face_tesselation: DrawingStyle,
    /// Right eye and eyebrow.
    pub right_eye: DrawingStyle,
    /// Left eye and eyebrow.
    pub left_eye: DrawingStyle,
    /// Lip contours.
    pub lips: DrawingStyle,
    /// Rectangle around both hands when a pose was detected.
    pub hand_box: DrawingStyle,
    /// Rectangle around both hands with no pose in the frame.
    pub hand_box_without_pose: DrawingStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let pose_markers = DrawingStyle::stroke(Color::WHITE).with_visibility_min(0.65);
        let hand_markers = DrawingStyle::stroke(Color::WHITE)
            .with_line_width(2.0)
            .with_radius(RadiusSpec::HAND_DEPTH);
        Self {
            effect: EffectMode::Mask,
            foreground_tint: FOREGROUND_TINT,
            background_tint: BACKGROUND_TINT,
            limb: DrawingStyle::stroke(Color::WHITE).with_line_width(5.0),
            pose_connectors: DrawingStyle::stroke(Color::WHITE),
            pose_left_markers: pose_markers.with_fill(COLOR_LEFT),
            pose_right_markers: pose_markers.with_fill(COLOR_RIGHT),
            hand_connectors: DrawingStyle::stroke(Color::WHITE),
            left_hand_markers: hand_markers.with_fill(COLOR_LEFT),
            right_hand_markers: hand_markers.with_fill(COLOR_RIGHT),
            face_tesselation: DrawingStyle::stroke(TESSELATION_COLOR).with_line_width(1.0),
            right_eye: DrawingStyle::stroke(COLOR_RIGHT),
            left_eye: DrawingStyle::stroke(COLOR_LEFT),
            lips: DrawingStyle::stroke(COLOR_LEFT).with_line_width(5.0),
            hand_box: DrawingStyle::stroke(Color::WHITE).with_line_width(5.0),
            hand_box_without_pose: DrawingStyle::stroke(Color::BLACK).with_line_width(5.0),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segmentation effect.
    #[must_use]
    pub const fn with_effect(mut self, effect: EffectMode) -> Self {
        self.effect = effect;
        self
    }

    /// Set the width of the elbow-to-wrist bridges.
    #[must_use]
    pub const fn with_limb_width(mut self, width: f32) -> Self {
        self.limb.line_width = width;
        self
    }

    /// Set the visibility threshold for pose markers on both sides.
    #[must_use]
    pub const fn with_pose_visibility_min(mut self, min: f32) -> Self {
        self.pose_left_markers.visibility_min = min;
        self.pose_right_markers.visibility_min = min;
        self
    }

    /// Set the marker fill colors for the subject's left and right sides.
    #[must_use]
    pub const fn with_side_colors(mut self, left: Color, right: Color) -> Self {
        self.pose_left_markers.fill_color = Some(left);
        self.pose_right_markers.fill_color = Some(right);
        self.left_hand_markers.fill_color = Some(left);
        self.right_hand_markers.fill_color = Some(right);
        self.left_eye.color = left;
        self.right_eye.color = right;
        self.lips.color = left;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_depth_radius() {
        let hand = RadiusSpec::HAND_DEPTH;
        let near = Landmark::new(0.5, 0.5).with_z(-0.15);
        let far = Landmark::new(0.5, 0.5).with_z(0.1);
        assert!((hand.radius_for(&near) - 10.0).abs() < 1e-5);
        assert!((hand.radius_for(&far) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_lerp_clamps() {
        let hand = RadiusSpec::HAND_DEPTH;
        let very_near = Landmark::new(0.5, 0.5).with_z(-1.0);
        let very_far = Landmark::new(0.5, 0.5).with_z(2.0);
        assert!((hand.radius_for(&very_near) - 10.0).abs() < 1e-5);
        assert!((hand.radius_for(&very_far) - 1.0).abs() < 1e-5);
        let mid = lerp(-0.025, -0.15, 0.1, 10.0, 1.0);
        assert!((mid - 5.5).abs() < 1e-4);
    }

    #[test]
    fn test_effect_mode_parse() {
        assert_eq!("mask".parse::<EffectMode>().unwrap(), EffectMode::Mask);
        assert_eq!("Cutout".parse::<EffectMode>().unwrap(), EffectMode::Cutout);
        assert_eq!("background".parse::<EffectMode>().unwrap(), EffectMode::Cutout);
        assert_eq!("both".parse::<EffectMode>().unwrap(), EffectMode::Both);
        assert!("sparkles".parse::<EffectMode>().is_err());
        assert!(EffectMode::Both.tints_foreground());
        assert!(!EffectMode::Cutout.tints_foreground());
        assert_eq!(EffectMode::Cutout.to_string(), "cutout");
    }

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.effect, EffectMode::Mask);
        assert!((config.limb.line_width - 5.0).abs() < f32::EPSILON);
        assert!((config.pose_left_markers.visibility_min - 0.65).abs() < f32::EPSILON);
        assert_eq!(config.left_hand_markers.radius, RadiusSpec::HAND_DEPTH);
        assert_eq!(config.pose_left_markers.fill(), COLOR_LEFT);
        assert_eq!(config.pose_connectors.fill(), Color::WHITE);
        assert_eq!(config.hand_box.color, Color::WHITE);
        assert_eq!(config.hand_box_without_pose.color, Color::BLACK);
        assert!((config.hand_box.line_width - 5.0).abs() < f32::EPSILON);
        assert!((config.hand_box_without_pose.line_width - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builder() {
        let red = Color::new(255, 0, 0);
        let config = RenderConfig::new()
            .with_effect(EffectMode::Both)
            .with_limb_width(2.0)
            .with_side_colors(red, Color::BLACK);
        assert_eq!(config.effect, EffectMode::Both);
        assert_eq!(config.left_hand_markers.fill(), red);
        assert_eq!(config.right_eye.color, Color::BLACK);
        assert!((config.limb.line_width - 2.0).abs() < f32::EPSILON);
    }
}
