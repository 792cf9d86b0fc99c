// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment-segment intersection classification.
//!
//! `classify` is the single source of truth for pairwise segment
//! relationships. Every consumer (fusion, shattering, clustering) switches
//! on `IntersectKind` rather than re-deriving the geometry ad hoc.
//!
//! Tolerances are applied to the segment *parameters* (`tol / length`), not
//! raw coordinate deltas, so the classification is scale-invariant.

use crate::point::Point2D;
use crate::segment::Segment;
use nalgebra::Vector2;

/// Relationship between two segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectKind {
    /// Parallel lines, not collinear.
    Parallel,
    /// Lines cross; the crossing lies on segment A only.
    OnA,
    /// Lines cross; the crossing lies on segment B only.
    OnB,
    /// Lines cross within both segments.
    OnBoth,
    /// Lines cross, but outside both segments (infinite-line intersection).
    OnLine,
    /// Collinear and sharing both endpoints.
    Coincident,
    /// Collinear with a gap between the two spans.
    ColinearDisjoint,
    /// Collinear with a partial overlap.
    ColinearOverlap,
    /// Collinear, touching at exactly one endpoint.
    ColinearJoint,
    /// Collinear, B's span lies within A's.
    ColinearAContainsB,
    /// Collinear, A's span lies within B's.
    ColinearBContainsA,
}

/// Full classification result: the kind, the crossing point where one
/// exists, and the line parameters of the crossing on A and B.
///
/// For collinear kinds `point` is `None` and `t_a`/`t_b` hold the
/// projections of B's endpoints onto A's parameter space (sorted).
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub kind: IntersectKind,
    pub point: Option<Point2D>,
    pub t_a: f64,
    pub t_b: f64,
}

fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Classifies the relationship between segments `a` and `b`.
///
/// Solves the 2×2 linear system for the two line parameters. A determinant
/// within `tol` of zero (normalized by both lengths) routes into the
/// collinear branch, which re-parameterizes B's endpoints against A's
/// direction and classifies by where those parameters fall against `[0,1]`.
pub fn classify(a: &Segment, b: &Segment, tol: f64) -> Intersection {
    let da = a.start.vector_to(&a.end);
    let db = b.start.vector_to(&b.end);
    let len_a = da.norm();
    let len_b = db.norm();

    // Degenerate operands never cross anything; report as disjoint parallels.
    if len_a < f64::EPSILON || len_b < f64::EPSILON {
        return Intersection {
            kind: IntersectKind::Parallel,
            point: None,
            t_a: 0.0,
            t_b: 0.0,
        };
    }

    let det = cross(&da, &db);
    // sin of the angle between the lines
    let det_norm = det / (len_a * len_b);

    if det_norm.abs() <= tol.min(1e-3).max(1e-9) {
        return classify_parallel(a, b, &da, len_a, tol);
    }

    let w = a.start.vector_to(&b.start);
    let t_a = cross(&w, &db) / det;
    let t_b = cross(&w, &da) / det;
    let point = a.at(t_a);

    // Parameter-space tolerance, scale invariant.
    let tol_a = tol / len_a;
    let tol_b = tol / len_b;
    let on_a = t_a >= -tol_a && t_a <= 1.0 + tol_a;
    let on_b = t_b >= -tol_b && t_b <= 1.0 + tol_b;

    let kind = match (on_a, on_b) {
        (true, true) => IntersectKind::OnBoth,
        (true, false) => IntersectKind::OnA,
        (false, true) => IntersectKind::OnB,
        (false, false) => IntersectKind::OnLine,
    };

    Intersection {
        kind,
        point: Some(point),
        t_a,
        t_b,
    }
}

/// Collinear/parallel branch of `classify`.
fn classify_parallel(
    a: &Segment,
    b: &Segment,
    da: &Vector2<f64>,
    len_a: f64,
    tol: f64,
) -> Intersection {
    let lateral = point_line_distance(&b.start, a);
    if lateral > tol {
        return Intersection {
            kind: IntersectKind::Parallel,
            point: None,
            t_a: 0.0,
            t_b: 0.0,
        };
    }

    // Project B's endpoints into A's parameter space.
    let u0 = a.start.vector_to(&b.start).dot(da) / (len_a * len_a);
    let u1 = a.start.vector_to(&b.end).dot(da) / (len_a * len_a);
    let (lo, hi) = if u0 <= u1 { (u0, u1) } else { (u1, u0) };
    let tp = tol / len_a;

    let lo_at_start = lo.abs() <= tp;
    let hi_at_end = (hi - 1.0).abs() <= tp;

    let kind = if lo_at_start && hi_at_end {
        IntersectKind::Coincident
    } else if hi <= tp || lo >= 1.0 - tp {
        // B's span sits entirely at or beyond one of A's endpoints.
        if (hi.abs() <= tp) || ((lo - 1.0).abs() <= tp) {
            IntersectKind::ColinearJoint
        } else if hi < -tp || lo > 1.0 + tp {
            IntersectKind::ColinearDisjoint
        } else {
            IntersectKind::ColinearOverlap
        }
    } else if lo >= -tp && hi <= 1.0 + tp {
        IntersectKind::ColinearAContainsB
    } else if lo <= tp && hi >= 1.0 - tp {
        IntersectKind::ColinearBContainsA
    } else {
        IntersectKind::ColinearOverlap
    };

    Intersection {
        kind,
        point: None,
        t_a: lo,
        t_b: hi,
    }
}

/// Perpendicular distance from a point to the infinite line through `s`.
/// Falls back to point distance for degenerate segments, never NaN.
pub fn point_line_distance(p: &Point2D, s: &Segment) -> f64 {
    let d = s.start.vector_to(&s.end);
    let len = d.norm();
    if len < f64::EPSILON {
        return p.distance_to(&s.start);
    }
    (cross(&s.start.vector_to(p), &d) / len).abs()
}

/// Distance from a point to a segment (clamped to the segment's span).
/// Falls back to point distance for degenerate segments, never NaN.
pub fn point_segment_distance(p: &Point2D, s: &Segment) -> f64 {
    let d = s.start.vector_to(&s.end);
    let len_sq = d.norm_squared();
    if len_sq < f64::EPSILON {
        return p.distance_to(&s.start);
    }
    let t = (s.start.vector_to(p).dot(&d) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&s.at(t))
}

/// Overlap between two parallel segments: the fraction of A's length that
/// B's projection covers, plus B projected onto A's line as a segment.
///
/// Returns `None` when the segments are not parallel within `tol`.
pub fn parallel_overlap(a: &Segment, b: &Segment, tol: f64) -> Option<(f64, Segment)> {
    let da = a.direction();
    let db = b.direction();
    if da == Vector2::zeros() || db == Vector2::zeros() {
        return None;
    }
    if cross(&da, &db).abs() > tol.min(1e-3).max(1e-9) {
        return None;
    }

    let len_a = a.length();
    let u0 = a.start.vector_to(&b.start).dot(&da) / len_a;
    let u1 = a.start.vector_to(&b.end).dot(&da) / len_a;
    let (lo, hi) = if u0 <= u1 { (u0, u1) } else { (u1, u0) };

    let clamped_lo = lo.max(0.0);
    let clamped_hi = hi.min(1.0);
    let fraction = (clamped_hi - clamped_lo).max(0.0);
    let projected = Segment::new(a.at(lo), a.at(hi));
    Some((fraction, projected))
}
