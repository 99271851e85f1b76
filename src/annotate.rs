// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Landmark annotation primitives: connectors, markers, and the hand bounding box.

use crate::config::DrawingStyle;
use crate::landmarks::{BoundingBox, Landmark, LandmarkList, bounding_box};
use crate::surface::Surface;
use crate::visualizer::Connection;

/// Connectors whose endpoints are both scored, one of them below this, are not drawn.
pub const CONNECTOR_VISIBILITY_MIN: f32 = 0.1;

/// Scale a normalized landmark to surface pixels.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn to_pixel(surface: &Surface, landmark: &Landmark) -> (f32, f32) {
    (
        landmark.x * surface.width() as f32,
        landmark.y * surface.height() as f32,
    )
}

/// Whether a segment between `from` and `to` is hidden by low visibility.
///
/// Only pairs where both endpoints carry a score are gated; a pair mixing a
/// scored and an unscored landmark (an elbow and a hand wrist) always qualifies.
#[must_use]
pub fn is_occluded(from: &Landmark, to: &Landmark) -> bool {
    from.visibility
        .zip(to.visibility)
        .is_some_and(|(a, b)| a < CONNECTOR_VISIBILITY_MIN || b < CONNECTOR_VISIBILITY_MIN)
}

/// Draw one segment between two landmarks.
///
/// Returns `false` when the segment is skipped because [`is_occluded`] holds or
/// an endpoint has non-finite coordinates.
pub fn draw_segment(surface: &mut Surface, from: &Landmark, to: &Landmark, style: &DrawingStyle) -> bool {
    if is_occluded(from, to) || !(from.is_finite() && to.is_finite()) {
        return false;
    }
    let a = to_pixel(surface, from);
    let b = to_pixel(surface, to);
    surface.stroke_line(a, b, style.line_width, style.color);
    true
}

/// Draw every connector whose endpoints are both present.
///
/// Pairs referencing a removed, undetected, or out-of-range index are skipped
/// silently. Returns the number of segments drawn.
pub fn draw_connectors(
    surface: &mut Surface,
    landmarks: &LandmarkList,
    connections: &[Connection],
    style: &DrawingStyle,
) -> usize {
    let mut drawn = 0;
    for &(a, b) in connections {
        if let (Some(from), Some(to)) = (landmarks.get(a), landmarks.get(b))
            && draw_segment(surface, from, to, style)
        {
            drawn += 1;
        }
    }
    drawn
}

/// Draw a filled, outlined circle at each present landmark.
///
/// Markers with a visibility score below `style.visibility_min` are skipped. The
/// radius comes from `style.radius`, so hand joints shrink with depth. Returns the
/// number of markers drawn.
pub fn draw_landmarks<'a, I>(surface: &mut Surface, landmarks: I, style: &DrawingStyle) -> usize
where
    I: IntoIterator<Item = Option<&'a Landmark>>,
{
    let mut drawn = 0;
    for landmark in landmarks.into_iter().flatten() {
        if landmark.visibility.is_some_and(|v| v < style.visibility_min) || !landmark.is_finite() {
            continue;
        }
        let center = to_pixel(surface, landmark);
        let radius = style.radius.radius_for(landmark);
        surface.fill_circle(center, radius, style.fill());
        surface.stroke_circle(center, radius, style.line_width, style.color);
        drawn += 1;
    }
    drawn
}

/// Stroke the rectangle enclosing every present hand landmark.
///
/// With no hand landmarks nothing is drawn and `None` is returned.
#[allow(clippy::cast_precision_loss)]
pub fn draw_hand_bounding_box(
    surface: &mut Surface,
    left: Option<&LandmarkList>,
    right: Option<&LandmarkList>,
    style: &DrawingStyle,
) -> Option<BoundingBox> {
    let bounds = bounding_box(left.into_iter().chain(right))?;
    let (w, h) = (surface.width() as f32, surface.height() as f32);
    surface.stroke_rect(
        bounds.x_min * w,
        bounds.y_min * h,
        bounds.width() * w,
        bounds.height() * h,
        style.line_width,
        style.color,
    );
    Some(bounds)
}
