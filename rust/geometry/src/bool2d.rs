// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D polygon boolean operations.
//!
//! Union / intersection / difference over shapes-with-holes, delegated to
//! the i_overlay crate, which scales the float coordinates onto a
//! fixed-point integer grid internally. Callers must not pass contours
//! with fewer than 3 vertices; they are filtered defensively here.

use crate::error::{Error, Result};
use crate::point::Point2D;
use crate::polygon::{ensure_ccw, ensure_cw, signed_area};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

/// Contours smaller than this are considered degenerate and dropped.
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// A simple polygon with optional holes. Outer winds counter-clockwise,
/// holes wind clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Vec<Point2D>,
    pub holes: Vec<Vec<Point2D>>,
}

impl Shape {
    pub fn new(outer: Vec<Point2D>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Vec<Point2D>, holes: Vec<Vec<Point2D>>) -> Self {
        Self { outer, holes }
    }

    /// Outer area minus hole areas.
    pub fn area(&self) -> f64 {
        let outer = signed_area(&self.outer).abs();
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        outer - holes
    }
}

/// Boolean difference: `subject - clip`.
pub fn difference(subject: &Shape, clip: &[Vec<Point2D>]) -> Result<Vec<Shape>> {
    overlay(subject, clip, OverlayRule::Difference)
}

/// Boolean intersection: `subject ∩ clip`.
pub fn intersection(subject: &Shape, clip: &[Vec<Point2D>]) -> Result<Vec<Shape>> {
    overlay(subject, clip, OverlayRule::Intersect)
}

/// Boolean union: `subject ∪ clip`.
pub fn union(subject: &Shape, clip: &[Vec<Point2D>]) -> Result<Vec<Shape>> {
    overlay(subject, clip, OverlayRule::Union)
}

fn overlay(subject: &Shape, clip: &[Vec<Point2D>], rule: OverlayRule) -> Result<Vec<Shape>> {
    if subject.outer.len() < 3 {
        return Err(Error::DegeneratePolygon(
            "Boolean subject must have at least 3 vertices".to_string(),
        ));
    }

    let subject_paths = shape_to_paths(subject);
    let clip_paths: Vec<Vec<[f64; 2]>> = clip
        .iter()
        .filter(|c| c.len() >= 3)
        .map(|c| contour_to_path(c))
        .collect();

    if clip_paths.is_empty() {
        return Ok(vec![subject.clone()]);
    }

    // Result is Vec<shape>, each shape is Vec<contour> with the outer first.
    let result = subject_paths.overlay(&clip_paths, rule, FillRule::EvenOdd);
    Ok(shapes_from_overlay(&result))
}

// ============================================================================
// Internal conversion helpers
// ============================================================================

fn shape_to_paths(shape: &Shape) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::with_capacity(1 + shape.holes.len());
    paths.push(contour_to_path(&ensure_ccw(&shape.outer)));
    for hole in &shape.holes {
        if hole.len() >= 3 {
            paths.push(contour_to_path(&ensure_cw(hole)));
        }
    }
    paths
}

fn contour_to_path(contour: &[Point2D]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2D> {
    path.iter().map(|p| Point2D::new(p[0], p[1])).collect()
}

fn shapes_from_overlay(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Shape> {
    let mut out = Vec::new();
    for shape in shapes {
        if shape.is_empty() {
            continue;
        }
        let outer = ensure_ccw(&path_to_contour(&shape[0]));
        if outer.len() < 3 || signed_area(&outer).abs() < MIN_AREA_THRESHOLD {
            continue;
        }
        let holes: Vec<Vec<Point2D>> = shape
            .iter()
            .skip(1)
            .map(|c| ensure_cw(&path_to_contour(c)))
            .filter(|c| c.len() >= 3 && signed_area(c).abs() > MIN_AREA_THRESHOLD)
            .collect();
        out.push(Shape::with_holes(outer, holes));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ]
    }

    #[test]
    fn difference_punches_a_hole() {
        let subject = Shape::new(square(0.0, 0.0, 10.0, 10.0));
        let clip = vec![square(4.0, 4.0, 6.0, 6.0)];
        let result = difference(&subject, &clip).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        assert_relative_eq!(result[0].area(), 96.0, epsilon = 1e-6);
    }

    #[test]
    fn difference_cutting_through_splits_shape() {
        let subject = Shape::new(square(0.0, 0.0, 10.0, 10.0));
        // Vertical band cutting all the way through.
        let clip = vec![square(4.0, -1.0, 6.0, 11.0)];
        let result = difference(&subject, &clip).unwrap();
        assert_eq!(result.len(), 2);
        let total: f64 = result.iter().map(Shape::area).sum();
        assert_relative_eq!(total, 80.0, epsilon = 1e-6);
    }

    #[test]
    fn union_of_overlapping_squares() {
        let subject = Shape::new(square(0.0, 0.0, 2.0, 2.0));
        let clip = vec![square(1.0, 1.0, 3.0, 3.0)];
        let result = union(&subject, &clip).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result[0].area(), 7.0, epsilon = 1e-6);
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        let subject = Shape::new(square(0.0, 0.0, 2.0, 2.0));
        let clip = vec![square(1.0, 1.0, 3.0, 3.0)];
        let result = intersection(&subject, &clip).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result[0].area(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_clip_returns_subject() {
        let subject = Shape::new(square(0.0, 0.0, 2.0, 2.0));
        let result = difference(&subject, &[]).unwrap();
        assert_eq!(result, vec![subject]);
    }

    #[test]
    fn degenerate_subject_is_rejected() {
        let subject = Shape::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        assert!(difference(&subject, &[square(0.0, 0.0, 1.0, 1.0)]).is_err());
    }

    #[test]
    fn difference_with_existing_hole() {
        let subject = Shape::with_holes(
            square(0.0, 0.0, 10.0, 10.0),
            vec![square(1.0, 1.0, 2.0, 2.0)],
        );
        let clip = vec![square(7.0, 7.0, 9.0, 9.0)];
        let result = difference(&subject, &clip).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 2);
        assert_relative_eq!(result[0].area(), 95.0, epsilon = 1e-6);
    }
}
