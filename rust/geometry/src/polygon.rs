// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simple-polygon algebra: area, winding, containment, simplification.

use crate::intersect::point_segment_distance;
use crate::point::Point2D;
use crate::segment::Segment;

/// Signed shoelace area. Positive = counter-clockwise, negative = clockwise.
pub fn signed_area(poly: &[Point2D]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let n = poly.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += poly[i].x * poly[j].y;
        area -= poly[j].x * poly[i].y;
    }
    area * 0.5
}

pub fn is_clockwise(poly: &[Point2D]) -> bool {
    signed_area(poly) < 0.0
}

/// Winding-number point-in-polygon test.
///
/// Boundary membership is an explicit separate case tested against every
/// edge with `point_segment_distance`, never inferred from the winding
/// count; `include_boundary` decides what it reports.
pub fn point_in_polygon(p: &Point2D, poly: &[Point2D], include_boundary: bool, tol: f64) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let n = poly.len();

    for i in 0..n {
        let edge = Segment::new(poly[i], poly[(i + 1) % n]);
        if point_segment_distance(p, &edge) <= tol {
            return include_boundary;
        }
    }

    let mut winding = 0i32;
    for i in 0..n {
        let a = &poly[i];
        let b = &poly[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && side(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Twice the signed area of triangle (a, b, p).
fn side(a: &Point2D, b: &Point2D, p: &Point2D) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

/// Removes vertices collinear with their neighbors.
///
/// Returns the input unchanged when simplification would drop below a
/// triangle.
pub fn simplify_collinear(poly: &[Point2D], tol: f64) -> Vec<Point2D> {
    if poly.len() <= 3 {
        return poly.to_vec();
    }
    let n = poly.len();
    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        let prev = &poly[(i + n - 1) % n];
        let curr = &poly[i];
        let next = &poly[(i + 1) % n];
        let cross = (curr.x - prev.x) * (next.y - prev.y) - (curr.y - prev.y) * (next.x - prev.x);
        if cross.abs() > tol {
            result.push(*curr);
        }
    }
    if result.len() < 3 {
        return poly.to_vec();
    }
    result
}

/// Axis-aligned bounds as `(min, max)` corners. `None` for an empty loop.
pub fn bounds(poly: &[Point2D]) -> Option<(Point2D, Point2D)> {
    let first = poly.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in poly.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Area centroid; falls back to the vertex average for degenerate loops.
pub fn centroid(poly: &[Point2D]) -> Point2D {
    let n = poly.len();
    if n == 0 {
        return Point2D::new(0.0, 0.0);
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let w = poly[i].x * poly[j].y - poly[j].x * poly[i].y;
        area += w;
        cx += (poly[i].x + poly[j].x) * w;
        cy += (poly[i].y + poly[j].y) * w;
    }
    area *= 0.5;
    if area.abs() < 1e-12 {
        let inv = 1.0 / n as f64;
        return Point2D::new(
            poly.iter().map(|p| p.x).sum::<f64>() * inv,
            poly.iter().map(|p| p.y).sum::<f64>() * inv,
        );
    }
    Point2D::new(cx / (6.0 * area), cy / (6.0 * area))
}

/// Reverses the loop if needed so it winds counter-clockwise.
pub fn ensure_ccw(poly: &[Point2D]) -> Vec<Point2D> {
    if signed_area(poly) < 0.0 {
        poly.iter().rev().cloned().collect()
    } else {
        poly.to_vec()
    }
}

/// Reverses the loop if needed so it winds clockwise.
pub fn ensure_cw(poly: &[Point2D]) -> Vec<Point2D> {
    if signed_area(poly) > 0.0 {
        poly.iter().rev().cloned().collect()
    } else {
        poly.to_vec()
    }
}
