// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-frame perception results.
//!
//! A [`PerceptionResult`] is produced by a perception engine for one submitted
//! frame and consumed once by the renderer. Every field is optional: an absent
//! field means there is nothing to draw for it.

use std::path::PathBuf;

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkList, filter_pose_landmarks};

/// Output of the perception engine for one frame.
#[derive(Debug, Clone, Default)]
pub struct PerceptionResult {
    /// The frame the landmarks were computed on.
    pub source_image: Option<DynamicImage>,
    /// Per-pixel foreground probability, 0 for background and 255 for foreground.
    pub segmentation_mask: Option<GrayImage>,
    /// Up to 33 body landmarks.
    pub pose_landmarks: Option<LandmarkList>,
    /// 21 joints of the subject's left hand.
    pub left_hand_landmarks: Option<LandmarkList>,
    /// 21 joints of the subject's right hand.
    pub right_hand_landmarks: Option<LandmarkList>,
    /// Face mesh landmarks.
    pub face_landmarks: Option<LandmarkList>,
}

impl PerceptionResult {
    /// Result carrying only a source frame.
    #[must_use]
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            source_image: Some(image),
            ..Self::default()
        }
    }

    /// Check if no landmark group is present.
    #[must_use]
    pub const fn has_no_landmarks(&self) -> bool {
        self.pose_landmarks.is_none()
            && self.left_hand_landmarks.is_none()
            && self.right_hand_landmarks.is_none()
            && self.face_landmarks.is_none()
    }

    /// Remove pose landmarks the overlay does not draw. No-op without a pose.
    pub fn remove_unused_landmarks(&mut self) {
        if let Some(pose) = self.pose_landmarks.as_mut() {
            filter_pose_landmarks(pose);
        }
    }

    /// One-line summary of what the result contains.
    #[must_use]
    pub fn verbose(&self) -> String {
        let count = |list: &Option<LandmarkList>| list.as_ref().map_or(0, LandmarkList::present_count);
        let mut parts = Vec::new();
        if self.pose_landmarks.is_some() {
            parts.push(format!("pose {}", count(&self.pose_landmarks)));
        }
        if self.left_hand_landmarks.is_some() {
            parts.push(format!("left hand {}", count(&self.left_hand_landmarks)));
        }
        if self.right_hand_landmarks.is_some() {
            parts.push(format!("right hand {}", count(&self.right_hand_landmarks)));
        }
        if self.face_landmarks.is_some() {
            parts.push(format!("face {}", count(&self.face_landmarks)));
        }
        if self.segmentation_mask.is_some() {
            parts.push("mask".to_string());
        }
        if parts.is_empty() {
            "(no detections)".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Serialized form of one result, as recorded from the engine's callback.
///
/// Field names use the engine's camelCase spelling so recordings made with
/// `JSON.stringify` in the browser load without conversion. The mask is a path to
/// a grayscale image, relative to the recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultRecord {
    /// Body landmarks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose_landmarks: Option<LandmarkList>,
    /// Left hand joints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_hand_landmarks: Option<LandmarkList>,
    /// Right hand joints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_hand_landmarks: Option<LandmarkList>,
    /// Face mesh landmarks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_landmarks: Option<LandmarkList>,
    /// Path to the segmentation mask image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation_mask: Option<PathBuf>,
}

impl ResultRecord {
    /// Convert to a result with no image or mask attached.
    #[must_use]
    pub fn into_result(self) -> PerceptionResult {
        PerceptionResult {
            source_image: None,
            segmentation_mask: None,
            pose_landmarks: self.pose_landmarks,
            left_hand_landmarks: self.left_hand_landmarks,
            right_hand_landmarks: self.right_hand_landmarks,
            face_landmarks: self.face_landmarks,
        }
    }
}
