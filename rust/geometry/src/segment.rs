// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Oriented line segment.

use crate::point::Point2D;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// An oriented 2D segment between two points.
///
/// Immutable in ordinary use; `replace_endpoint` is the one sanctioned
/// mutation and exists for the lattice-alignment phase. Zero-length
/// segments are valid but degenerate; callers filter them with
/// `is_degenerate` before running arrangement algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
}

impl Segment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Unit direction from start to end. Zero vector for degenerate segments.
    pub fn direction(&self) -> Vector2<f64> {
        let v = self.start.vector_to(&self.end);
        let len = v.norm();
        if len < f64::EPSILON {
            Vector2::zeros()
        } else {
            v / len
        }
    }

    /// Point at parameter `t` along the segment (`t = 0` at start, `1` at end).
    pub fn at(&self, t: f64) -> Point2D {
        self.start.lerp(&self.end, t)
    }

    pub fn midpoint(&self) -> Point2D {
        self.at(0.5)
    }

    pub fn reversed(&self) -> Segment {
        Segment::new(self.end, self.start)
    }

    /// Replaces endpoint `i` (0 = start, 1 = end). Used during alignment
    /// when a vertex is projected onto its anchor axis.
    pub fn replace_endpoint(&mut self, i: usize, p: Point2D) {
        match i {
            0 => self.start = p,
            _ => self.end = p,
        }
    }

    pub fn is_degenerate(&self, tol: f64) -> bool {
        self.length() <= tol
    }

    /// Axis-aligned bounds as `(min, max)` corners.
    pub fn bounds(&self) -> (Point2D, Point2D) {
        (
            Point2D::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            Point2D::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        )
    }

    /// The segment extruded into a quadrilateral of half-width `tol`,
    /// expanded lengthwise as well. Fuzzy clustering intersects these
    /// expanded boxes instead of the raw centerlines.
    pub fn expanded_quad(&self, tol: f64) -> [Point2D; 4] {
        let d = self.direction();
        let (d, n) = if d == Vector2::zeros() {
            // Degenerate segment: expand around the point with an arbitrary frame.
            (Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0))
        } else {
            (d, Vector2::new(-d.y, d.x))
        };
        let a = self.start.translated(&(-d * tol));
        let b = self.end.translated(&(d * tol));
        [
            a.translated(&(-n * tol)),
            b.translated(&(-n * tol)),
            b.translated(&(n * tol)),
            a.translated(&(n * tol)),
        ]
    }
}
