// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Connector topologies for the holistic landmark schemas.
//!
//! Pose uses the 33-point body schema, hands the 21-point joint schema, and the
//! face the 468-point mesh schema. Each connector set lists `(from, to)` index pairs
//! joined by one line segment.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::{OverlayError, Result};
use crate::landmarks::LandmarkList;
use crate::visualizer::mesh::triangulate;

/// A pair of landmark indices joined by a line.
pub type Connection = (usize, usize);

/// Left elbow in the pose schema.
pub const LEFT_ELBOW: usize = 13;
/// Right elbow in the pose schema.
pub const RIGHT_ELBOW: usize = 14;
/// Wrist joint in the hand schema.
pub const HAND_WRIST: usize = 0;

/// Named pose landmarks on the subject's left side: left eye points, ear,
/// mouth corner, and the left limb joints.
pub const POSE_LANDMARKS_LEFT: [usize; 16] =
    [1, 2, 3, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25, 27, 29, 31];

/// Named pose landmarks on the subject's right side: right eye points, ear,
/// mouth corner, and the right limb joints.
pub const POSE_LANDMARKS_RIGHT: [usize; 16] =
    [4, 5, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32];

/// Body skeleton.
pub const POSE_CONNECTIONS: [Connection; 35] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// Hand rig: palm plus four joints per finger.
pub const HAND_CONNECTIONS: [Connection; 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Outer and inner lip contours.
pub const FACEMESH_LIPS: [Connection; 40] = [
    (61, 146),
    (146, 91),
    (91, 181),
    (181, 84),
    (84, 17),
    (17, 314),
    (314, 405),
    (405, 321),
    (321, 375),
    (375, 291),
    (61, 185),
    (185, 40),
    (40, 39),
    (39, 37),
    (37, 0),
    (0, 267),
    (267, 269),
    (269, 270),
    (270, 409),
    (409, 291),
    (78, 95),
    (95, 88),
    (88, 178),
    (178, 87),
    (87, 14),
    (14, 317),
    (317, 402),
    (402, 318),
    (318, 324),
    (324, 308),
    (78, 191),
    (191, 80),
    (80, 81),
    (81, 82),
    (82, 13),
    (13, 312),
    (312, 311),
    (311, 310),
    (310, 415),
    (415, 308),
];

/// Subject's left eye contour.
pub const FACEMESH_LEFT_EYE: [Connection; 16] = [
    (263, 249),
    (249, 390),
    (390, 373),
    (373, 374),
    (374, 380),
    (380, 381),
    (381, 382),
    (382, 362),
    (263, 466),
    (466, 388),
    (388, 387),
    (387, 386),
    (386, 385),
    (385, 384),
    (384, 398),
    (398, 362),
];

/// Subject's left eyebrow.
pub const FACEMESH_LEFT_EYEBROW: [Connection; 8] = [
    (276, 283),
    (283, 282),
    (282, 295),
    (295, 285),
    (300, 293),
    (293, 334),
    (334, 296),
    (296, 336),
];

/// Subject's right eye contour.
pub const FACEMESH_RIGHT_EYE: [Connection; 16] = [
    (33, 7),
    (7, 163),
    (163, 144),
    (144, 145),
    (145, 153),
    (153, 154),
    (154, 155),
    (155, 133),
    (33, 246),
    (246, 161),
    (161, 160),
    (160, 159),
    (159, 158),
    (158, 157),
    (157, 173),
    (173, 133),
];

/// Subject's right eyebrow.
pub const FACEMESH_RIGHT_EYEBROW: [Connection; 8] = [
    (46, 53),
    (53, 52),
    (52, 65),
    (65, 55),
    (70, 63),
    (63, 105),
    (105, 66),
    (66, 107),
];

/// Face mesh tessellation.
///
/// By default the mesh is the Delaunay triangulation of each received face,
/// so the tessellation pass always has edges to draw. A fixed edge list, such as
/// the one exported with the face model, replaces it when loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceTopology {
    tesselation: Option<Vec<Connection>>,
}

impl FaceTopology {
    /// Create a topology from explicit tessellation edges.
    #[must_use]
    pub const fn new(tesselation: Vec<Connection>) -> Self {
        Self {
            tesselation: Some(tesselation),
        }
    }

    /// Parse a JSON array of `[from, to]` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not an array of two-element index arrays.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let pairs: Vec<[usize; 2]> = serde_json::from_str(json).map_err(|e| {
            OverlayError::ResultFormatError(format!("Invalid face tessellation: {e}"))
        })?;
        Ok(Self::new(pairs.into_iter().map(|[a, b]| (a, b)).collect()))
    }

    /// Load the tessellation from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_tesselation<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            OverlayError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Fixed tessellation edges, or `None` when the mesh is derived per face.
    #[must_use]
    pub fn tesselation(&self) -> Option<&[Connection]> {
        self.tesselation.as_deref()
    }

    /// Tessellation edges for one face.
    #[must_use]
    pub fn tesselation_for(&self, face: &LandmarkList) -> Cow<'_, [Connection]> {
        match &self.tesselation {
            Some(fixed) => Cow::Borrowed(fixed),
            None => Cow::Owned(triangulate(face)),
        }
    }
}
