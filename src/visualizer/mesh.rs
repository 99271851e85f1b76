// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Delaunay tessellation of a face landmark list.
//!
//! Used when no fixed tessellation is loaded: the mesh is rebuilt from the
//! received points each frame with the Bowyer-Watson insertion algorithm.

use std::collections::BTreeSet;

use crate::landmarks::LandmarkList;
use crate::visualizer::Connection;

/// Super-triangle size relative to the point cloud's extent.
const SUPER_SCALE: f64 = 200.0;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    /// Circumcenter and squared radius; `None` for a degenerate triangle.
    circle: Option<(f64, f64, f64)>,
}

impl Triangle {
    fn new(v: [usize; 3], points: &[(f64, f64)]) -> Self {
        Self {
            v,
            circle: circumcircle(points[v[0]], points[v[1]], points[v[2]]),
        }
    }

    fn encloses(&self, (x, y): (f64, f64)) -> bool {
        self.circle
            .is_some_and(|(cx, cy, r2)| (x - cx).powi(2) + (y - cy).powi(2) < r2)
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [ordered(a, b), ordered(b, c), ordered(c, a)]
    }
}

const fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<(f64, f64, f64)> {
    let (bx, by) = (b.0 - a.0, b.1 - a.1);
    let (cx, cy) = (c.0 - a.0, c.1 - a.1);
    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < f64::EPSILON * (bx.abs() + by.abs() + cx.abs() + cy.abs()).powi(2) {
        return None;
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    Some((a.0 + ux, a.1 + uy, ux * ux + uy * uy))
}

/// Edges of the Delaunay triangulation of the present, finite landmarks.
///
/// Indices refer to `landmarks`. Points duplicating an earlier one are ignored.
/// Fewer than three distinct non-collinear points give no edges. The result is
/// sorted with `from < to` in each pair.
#[must_use]
pub fn triangulate(landmarks: &LandmarkList) -> Vec<Connection> {
    let mut ids = Vec::new();
    let mut points: Vec<(f64, f64)> = Vec::new();
    for (i, slot) in landmarks.slots().iter().enumerate() {
        let Some(lm) = slot.as_ref().filter(|lm| lm.is_finite()) else {
            continue;
        };
        let p = (f64::from(lm.x), f64::from(lm.y));
        if !points.contains(&p) {
            ids.push(i);
            points.push(p);
        }
    }
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for &(x, y) in &points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON) * SUPER_SCALE;
    let (mx, my) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    points.push((mx - span, my - span));
    points.push((mx, my + span));
    points.push((mx + span, my - span));

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &points)];
    for p in 0..n {
        let (bad, kept): (Vec<Triangle>, Vec<Triangle>) =
            triangles.into_iter().partition(|t| t.encloses(points[p]));
        triangles = kept;

        // Cavity boundary: edges belonging to exactly one removed triangle.
        let mut edges: Vec<(usize, usize)> = bad.iter().flat_map(Triangle::edges).collect();
        edges.sort_unstable();
        let mut i = 0;
        while i < edges.len() {
            let mut j = i + 1;
            while j < edges.len() && edges[j] == edges[i] {
                j += 1;
            }
            if j - i == 1 {
                let (a, b) = edges[i];
                triangles.push(Triangle::new([a, b, p], &points));
            }
            i = j;
        }
    }

    let mut mesh = BTreeSet::new();
    for t in triangles.iter().filter(|t| t.v.iter().all(|&v| v < n)) {
        for (a, b) in t.edges() {
            mesh.insert(ordered(ids[a], ids[b]));
        }
    }
    mesh.into_iter().collect()
}
