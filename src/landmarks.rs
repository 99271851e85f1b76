// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Landmark types and the pose landmark filter.
//!
//! Landmarks are normalized image coordinates in `[0, 1]`. A [`LandmarkList`] keeps
//! one slot per schema index so connector topologies can address entries by
//! position; removed or undetected points are `None` slots.

use serde::{Deserialize, Serialize};

/// Pose landmark indices that are never drawn by the overlay.
///
/// Nose, eyes, ears, mouth, and the pinky/index/thumb tips of both hands. The face
/// mesh and hand rigs cover these regions with far more detail.
pub const REMOVED_POSE_LANDMARKS: [usize; 19] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 15, 16, 17, 18, 19, 20, 21, 22,
];

/// A single normalized keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0.0 at the left edge and 1.0 at the right edge.
    pub x: f32,
    /// Vertical position, 0.0 at the top edge and 1.0 at the bottom edge.
    pub y: f32,
    /// Relative depth. Smaller values are closer to the camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Detection confidence in `[0, 1]`, only reported for pose landmarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    /// Create a 2-D landmark without depth or visibility.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    /// Set the depth value.
    #[must_use]
    pub const fn with_z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    /// Set the visibility score.
    #[must_use]
    pub const fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Positional landmark sequence with optional slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkList(Vec<Option<Landmark>>);

impl LandmarkList {
    /// Create a list where every slot is present.
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self(landmarks.into_iter().map(Some).collect())
    }

    /// Create a list from raw slots.
    #[must_use]
    pub const fn from_slots(slots: Vec<Option<Landmark>>) -> Self {
        Self(slots)
    }

    /// Number of slots, present or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the list has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Landmark at `index`, or `None` when removed, undetected, or out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// All slots in schema order.
    #[must_use]
    pub fn slots(&self) -> &[Option<Landmark>] {
        &self.0
    }

    /// Iterate over present landmarks only.
    pub fn present(&self) -> impl Iterator<Item = &Landmark> {
        self.0.iter().flatten()
    }

    /// Number of present landmarks.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    /// Mark the given indices as absent. Out-of-range indices are ignored and the
    /// list length never changes.
    pub fn remove(&mut self, indices: &[usize]) {
        for &index in indices {
            if let Some(slot) = self.0.get_mut(index) {
                *slot = None;
            }
        }
    }
}

impl From<Vec<Landmark>> for LandmarkList {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self::new(landmarks)
    }
}

/// Remove the pose landmarks the overlay does not draw.
pub fn filter_pose_landmarks(pose: &mut LandmarkList) {
    pose.remove(&REMOVED_POSE_LANDMARKS);
}

/// Axis-aligned bounds in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x_min: f32,
    /// Top edge.
    pub y_min: f32,
    /// Right edge.
    pub x_max: f32,
    /// Bottom edge.
    pub y_max: f32,
}

impl BoundingBox {
    /// Width in normalized units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Height in normalized units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Bounds over every present, finite landmark of the given lists.
///
/// Returns `None` when there is no such landmark, so callers never see infinite or
/// NaN bounds.
#[must_use]
pub fn bounding_box<'a, I>(lists: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a LandmarkList>,
{
    lists
        .into_iter()
        .flat_map(LandmarkList::present)
        .filter(|lm| lm.is_finite())
        .fold(None, |acc: Option<BoundingBox>, lm| {
            Some(match acc {
                None => BoundingBox {
                    x_min: lm.x,
                    y_min: lm.y,
                    x_max: lm.x,
                    y_max: lm.y,
                },
                Some(b) => BoundingBox {
                    x_min: b.x_min.min(lm.x),
                    y_min: b.y_min.min(lm.y),
                    x_max: b.x_max.max(lm.x),
                    y_max: b.y_max.max(lm.y),
                },
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn pose_33() -> LandmarkList {
        LandmarkList::new(
            (0..33)
                .map(|i| Landmark::new(i as f32 / 33.0, 0.5).with_visibility(0.9))
                .collect(),
        )
    }

    #[test]
    fn test_filter_keeps_length_and_positions() {
        let original = pose_33();
        let mut pose = original.clone();
        filter_pose_landmarks(&mut pose);

        assert_eq!(pose.len(), 33);
        assert_eq!(pose.present_count(), 33 - 19);
        for i in 0..33 {
            if REMOVED_POSE_LANDMARKS.contains(&i) {
                assert!(pose.get(i).is_none(), "index {i} should be removed");
            } else {
                assert_eq!(pose.get(i), original.get(i));
            }
        }
    }

    #[test]
    fn test_filter_short_list() {
        let mut pose = LandmarkList::new(vec![Landmark::new(0.1, 0.1); 5]);
        filter_pose_landmarks(&mut pose);
        assert_eq!(pose.len(), 5);
        assert_eq!(pose.present_count(), 0);
    }

    #[test]
    fn test_bounding_box_single_hand() {
        let left = LandmarkList::new(vec![Landmark::new(0.2, 0.3), Landmark::new(0.4, 0.1)]);
        let bounds = bounding_box([&left]).unwrap();
        assert!((bounds.x_min - 0.2).abs() < f32::EPSILON);
        assert!((bounds.x_max - 0.4).abs() < f32::EPSILON);
        assert!((bounds.y_min - 0.1).abs() < f32::EPSILON);
        assert!((bounds.y_max - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bounding_box_union() {
        let left = LandmarkList::new(vec![Landmark::new(0.2, 0.3)]);
        let right = LandmarkList::new(vec![Landmark::new(0.7, 0.6), Landmark::new(0.5, 0.9)]);
        let bounds = bounding_box([&left, &right]).unwrap();
        assert!((bounds.x_min - 0.2).abs() < f32::EPSILON);
        assert!((bounds.x_max - 0.7).abs() < f32::EPSILON);
        assert!((bounds.y_max - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(bounding_box(std::iter::empty::<&LandmarkList>()).is_none());
        let empty = LandmarkList::from_slots(vec![None, None]);
        assert!(bounding_box([&empty]).is_none());
        let nan = LandmarkList::new(vec![Landmark::new(f32::NAN, 0.5)]);
        assert!(bounding_box([&nan]).is_none());
    }

    #[test]
    fn test_deserialize_with_nulls() {
        let list: LandmarkList =
            serde_json::from_str(r#"[{"x":0.1,"y":0.2,"z":-0.05},null,{"x":0.3,"y":0.4,"visibility":0.8}]"#)
                .unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.get(1).is_none());
        assert_eq!(list.get(0).unwrap().z, Some(-0.05));
        assert_eq!(list.get(2).unwrap().visibility, Some(0.8));
    }
}
