// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roomplan Geometric Kernel
//!
//! 2D segment, polygon, and intersection algebra for wall-centerline room
//! reconstruction. Everything here is pure and tolerance-based: equality,
//! containment, and classification all take an explicit tolerance rather
//! than relying on exact arithmetic.

pub mod bool2d;
pub mod error;
pub mod intersect;
pub mod point;
pub mod polygon;
pub mod segment;
pub mod tolerances;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Rotation2, Vector2};

pub use error::{Error, Result};
pub use intersect::{classify, IntersectKind, Intersection};
pub use point::Point2D;
pub use polygon::{is_clockwise, point_in_polygon, signed_area};
pub use segment::Segment;
pub use tolerances::Tolerances;
