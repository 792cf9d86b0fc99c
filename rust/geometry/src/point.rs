// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D point with carried elevation and snap-to-zero construction.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Components whose magnitude falls below this are snapped to exactly 0.0
/// at construction, so arithmetic residue never leaks into comparisons.
pub const ZERO_SNAP: f64 = 1e-6;

/// A 2D point with an elevation component.
///
/// `z` is generally 0 or the level elevation; all planar algebra ignores it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_z(x, y, 0.0)
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: snap(x),
            y: snap(y),
            z: snap(z),
        }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self::new(p.x, p.y)
    }

    /// Planar distance. Elevation is ignored.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Tolerance-based planar equality.
    pub fn coincident(&self, other: &Point2D, tol: f64) -> bool {
        self.distance_to(other) <= tol
    }

    /// Planar vector from `self` to `other`.
    pub fn vector_to(&self, other: &Point2D) -> Vector2<f64> {
        Vector2::new(other.x - self.x, other.y - self.y)
    }

    /// Point displaced by a planar vector, keeping elevation.
    pub fn translated(&self, v: &Vector2<f64>) -> Point2D {
        Point2D::with_z(self.x + v.x, self.y + v.y, self.z)
    }

    pub fn lerp(&self, other: &Point2D, t: f64) -> Point2D {
        Point2D::with_z(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

fn snap(v: f64) -> f64 {
    if v.abs() < ZERO_SNAP {
        0.0
    } else {
        v
    }
}
