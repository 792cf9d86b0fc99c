// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lattice alignment: snapping a noisy vertex set onto a small number of
//! representative axes.
//!
//! Runs two passes, one for the primary scan angle θ and one for θ − 90°.
//! Each pass bands the vertices by perpendicular distance to a seed ray,
//! picks the densest already-collinear sub-group of each band as its anchor
//! axis (reusing a previously chosen axis when one lies within the band
//! tolerance, which corrects drift), and projects everything else onto it.
//! Every vertex carries its set of outgoing unit directions ("hands"), which
//! is what lattice reconstruction later uses to rebuild concrete segments.

use nalgebra::{Rotation2, Vector2};
use roomplan_geometry::{Point2D, Segment, Tolerances};
use smallvec::SmallVec;
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

/// Cosine threshold under which two unit vectors count as the same
/// direction (~0.08°).
const DIRECTION_COS_TOL: f64 = 1.0 - 1e-6;

/// A lattice vertex plus the set of unit directions it must still connect
/// along once reconstruction completes.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub point: Point2D,
    pub hands: SmallVec<[Vector2<f64>; 4]>,
}

impl Anchor {
    pub fn new(point: Point2D) -> Self {
        Self {
            point,
            hands: SmallVec::new(),
        }
    }

    /// Adds a hand unless an equal direction is already present.
    pub fn add_hand(&mut self, dir: Vector2<f64>) {
        if !self.hands.iter().any(|h| same_direction(h, &dir)) {
            self.hands.push(dir);
        }
    }

    pub fn has_hand(&self, dir: &Vector2<f64>) -> bool {
        self.hands.iter().any(|h| same_direction(h, dir))
    }

    /// True when the anchor is a redundant mid-span point: exactly two
    /// hands pointing in exactly opposite directions.
    pub fn is_mid_span(&self) -> bool {
        self.hands.len() == 2 && same_direction(&self.hands[0], &(-self.hands[1]))
    }
}

pub fn same_direction(a: &Vector2<f64>, b: &Vector2<f64>) -> bool {
    a.dot(b) >= DIRECTION_COS_TOL
}

/// Aligns one wall cluster's segments: canonicalizes endpoints, then runs
/// the banding/snapping pass at θ and again at θ − 90°.
pub fn align(segments: &[Segment], tol: &Tolerances) -> Vec<Anchor> {
    let mut working: Vec<Segment> = segments
        .iter()
        .filter(|s| !s.is_degenerate(tol.point))
        .copied()
        .collect();
    canonicalize_endpoints(&mut working, tol.point);

    let anchors = extract_anchors(&working, tol.point);
    let anchors = align_pass(anchors, tol.theta, tol);
    let anchors = align_pass(anchors, tol.theta - FRAC_PI_2, tol);
    debug!(anchors = anchors.len(), "alignment complete");
    anchors
}

/// Merges segment endpoints within `tol` onto shared vertices, mutating the
/// segments in place so both halves of a near-coincident joint agree on one
/// coordinate.
pub fn canonicalize_endpoints(segments: &mut [Segment], tol: f64) -> Vec<Point2D> {
    let mut vertices: Vec<Point2D> = Vec::new();
    for s in segments.iter_mut() {
        for i in 0..2 {
            let p = if i == 0 { s.start } else { s.end };
            let v = match vertices.iter().find(|v| v.coincident(&p, tol)) {
                Some(v) => *v,
                None => {
                    vertices.push(p);
                    p
                }
            };
            s.replace_endpoint(i, v);
        }
    }
    vertices
}

/// Builds one anchor per unique vertex, with a hand for each half-segment
/// leaving it.
fn extract_anchors(segments: &[Segment], tol: f64) -> Vec<Anchor> {
    let mut anchors: Vec<Anchor> = Vec::new();
    let mut touch = |p: Point2D, dir: Vector2<f64>| {
        if dir == Vector2::zeros() {
            return;
        }
        match anchors.iter_mut().find(|a| a.point.coincident(&p, tol)) {
            Some(a) => a.add_hand(dir),
            None => {
                let mut a = Anchor::new(p);
                a.add_hand(dir);
                anchors.push(a);
            }
        }
    };
    for s in segments {
        let d = s.direction();
        touch(s.start, d);
        touch(s.end, -d);
    }
    anchors
}

/// A chosen axis: its offset in the rotated frame plus the span it covers
/// along the scan direction.
struct AxisRecord {
    offset: f64,
    span_lo: f64,
    span_hi: f64,
}

/// One banding/snapping pass for scan angle `theta`.
fn align_pass(anchors: Vec<Anchor>, theta: f64, tol: &Tolerances) -> Vec<Anchor> {
    if anchors.is_empty() {
        return anchors;
    }

    let scan = Vector2::new(theta.cos(), theta.sin());
    // Rotate so the scan direction maps onto the X axis; axis membership is
    // then a shared rotated-Y value.
    let rot = Rotation2::new(-theta);
    let rotated: Vec<Vector2<f64>> = anchors
        .iter()
        .map(|a| rot * Vector2::new(a.point.x, a.point.y))
        .collect();

    let mut snapped: Vec<Anchor> = Vec::with_capacity(anchors.len());
    let mut blueprints: Vec<AxisRecord> = Vec::new();
    let mut worklist: Vec<usize> = (0..anchors.len()).collect();

    while let Some(seed) = worklist.pop() {
        // Band: everything within the offset tolerance of the seed's axis.
        let seed_offset = rotated[seed].y;
        let mut band = vec![seed];
        worklist.retain(|&i| {
            if (rotated[i].y - seed_offset).abs() < tol.band {
                band.push(i);
                false
            } else {
                true
            }
        });

        let (axis_offset, span_lo, span_hi) =
            select_axis(&band, &rotated, &mut blueprints, tol);

        for &i in &band {
            let x = rotated[i].x;
            let needs_snap = (rotated[i].y - axis_offset).abs() > tol.point * 0.5;
            let world = rot.inverse() * Vector2::new(x, axis_offset);
            let mut anchor = anchors[i].clone();
            anchor.point = Point2D::with_z(world.x, world.y, anchor.point.z);

            // A projected point strictly inside the axis span that still
            // connects outward in a non-axis direction is a junction: the
            // axis is split there, so it inherits synthetic ±θ hands.
            if needs_snap
                && x > span_lo + tol.point
                && x < span_hi - tol.point
                && has_cross_hand(&anchor, &scan)
            {
                anchor.add_hand(scan);
                anchor.add_hand(-scan);
            }
            snapped.push(anchor);
        }
    }

    merge_anchors(snapped, tol.point)
}

/// Picks the axis offset for a band: the densest sub-group of exactly
/// collinear points wins; a blueprint axis from an earlier band within the
/// band tolerance whose span overlaps is reused instead (drift correction).
fn select_axis(
    band: &[usize],
    rotated: &[Vector2<f64>],
    blueprints: &mut Vec<AxisRecord>,
    tol: &Tolerances,
) -> (f64, f64, f64) {
    // Sub-group by rotated Y: sort, then split where the gap exceeds the
    // point tolerance (those sub-groups are the already-collinear runs).
    let mut offsets: Vec<f64> = band.iter().map(|&i| rotated[i].y).collect();
    offsets.sort_by(|a, b| a.total_cmp(b));

    let mut best_start = 0;
    let mut best_len = 0;
    let mut run_start = 0;
    for i in 0..offsets.len() {
        if i > 0 && offsets[i] - offsets[i - 1] > tol.point {
            run_start = i;
        }
        let run_len = i - run_start + 1;
        if run_len > best_len {
            best_len = run_len;
            best_start = run_start;
        }
    }
    let dense = &offsets[best_start..best_start + best_len];
    let mut axis_offset = dense.iter().sum::<f64>() / dense.len() as f64;

    let span_lo = band
        .iter()
        .map(|&i| rotated[i].x)
        .fold(f64::INFINITY, f64::min);
    let span_hi = band
        .iter()
        .map(|&i| rotated[i].x)
        .fold(f64::NEG_INFINITY, f64::max);

    if let Some(prior) = blueprints.iter_mut().find(|b| {
        (b.offset - axis_offset).abs() < tol.band && b.span_hi >= span_lo && b.span_lo <= span_hi
    }) {
        axis_offset = prior.offset;
        prior.span_lo = prior.span_lo.min(span_lo);
        prior.span_hi = prior.span_hi.max(span_hi);
    } else {
        blueprints.push(AxisRecord {
            offset: axis_offset,
            span_lo,
            span_hi,
        });
    }

    (axis_offset, span_lo, span_hi)
}

/// True when the anchor carries at least one hand not parallel to `dir`.
fn has_cross_hand(anchor: &Anchor, dir: &Vector2<f64>) -> bool {
    anchor
        .hands
        .iter()
        .any(|h| !same_direction(h, dir) && !same_direction(h, &-*dir))
}

/// Merges coincident anchors, unioning their hand sets (equal directions
/// collapse, which is what keeps a merged joint from growing duplicate
/// back-and-forth edges), then drops redundant mid-span anchors.
fn merge_anchors(anchors: Vec<Anchor>, tol: f64) -> Vec<Anchor> {
    let mut merged: Vec<Anchor> = Vec::with_capacity(anchors.len());
    for incoming in anchors {
        match merged
            .iter_mut()
            .find(|a| a.point.coincident(&incoming.point, tol))
        {
            Some(existing) => {
                for hand in incoming.hands {
                    existing.add_hand(hand);
                }
            }
            None => merged.push(incoming),
        }
    }
    let before = merged.len();
    merged.retain(|a| !a.is_mid_span());
    if merged.len() < before {
        debug!(dropped = before - merged.len(), "dropped mid-span anchors");
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point2D::new(x0, y0), Point2D::new(x1, y1))
    }

    fn tolerances() -> Tolerances {
        Tolerances {
            point: 0.01,
            band: 0.2,
            grouping: 0.5,
            perimeter: 1.0,
            theta: 0.0,
        }
    }

    fn find_anchor<'a>(anchors: &'a [Anchor], x: f64, y: f64, tol: f64) -> Option<&'a Anchor> {
        anchors
            .iter()
            .find(|a| a.point.coincident(&Point2D::new(x, y), tol))
    }

    #[test]
    fn canonicalize_merges_near_joints() {
        let mut segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.005, 0.002, 10.0, 10.0)];
        let vertices = canonicalize_endpoints(&mut segments, 0.01);
        assert_eq!(vertices.len(), 3);
        assert_eq!(segments[0].end, segments[1].start);
    }

    #[test]
    fn corner_anchor_has_two_hands() {
        let segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.0, 0.0, 10.0, 10.0)];
        let anchors = align(&segments, &tolerances());
        let corner = find_anchor(&anchors, 10.0, 0.0, 0.05).unwrap();
        assert_eq!(corner.hands.len(), 2);
    }

    #[test]
    fn mid_span_anchor_is_dropped() {
        // Two collinear segments sharing a vertex: the shared vertex is a
        // redundant mid-span point.
        let segments = vec![seg(0.0, 0.0, 5.0, 0.0), seg(5.0, 0.0, 10.0, 0.0)];
        let anchors = align(&segments, &tolerances());
        assert_eq!(anchors.len(), 2);
        assert!(find_anchor(&anchors, 5.0, 0.0, 0.05).is_none());
    }

    #[test]
    fn noisy_horizontal_run_collapses_onto_one_axis() {
        // Three horizontal walls at y ∈ {0.0, 0.05, -0.04}: one axis.
        let segments = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(12.0, 0.05, 20.0, 0.05),
            seg(22.0, -0.04, 30.0, -0.04),
        ];
        let anchors = align(&segments, &tolerances());
        let ys: Vec<f64> = anchors.iter().map(|a| a.point.y).collect();
        let first = ys[0];
        assert!(ys.iter().all(|y| (y - first).abs() < 1e-9));
    }

    #[test]
    fn dense_subgroup_wins_axis_selection() {
        // Two exactly-collinear walls at y = 0 outvote the stray at y = 0.1.
        let segments = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(12.0, 0.0, 20.0, 0.0),
            seg(22.0, 0.1, 30.0, 0.1),
        ];
        let anchors = align(&segments, &tolerances());
        assert!(anchors.iter().all(|a| a.point.y.abs() < 1e-9));
    }

    #[test]
    fn already_aligned_input_is_unchanged() {
        let segments = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 10.0, 10.0),
            seg(10.0, 10.0, 0.0, 10.0),
            seg(0.0, 10.0, 0.0, 0.0),
        ];
        let anchors = align(&segments, &tolerances());
        assert_eq!(anchors.len(), 4);
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            let a = find_anchor(&anchors, x, y, 1e-9).unwrap();
            assert_eq!(a.hands.len(), 2);
        }
    }

    #[test]
    fn interior_junction_inherits_axis_split_hands() {
        // A vertical wall whose top endpoint sits just off a long
        // horizontal wall: after snapping, the junction splits the axis.
        let segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(5.0, 0.08, 5.0, -6.0)];
        let anchors = align(&segments, &tolerances());
        let junction = find_anchor(&anchors, 5.0, 0.0, 0.05).unwrap();
        // Down the vertical wall plus the synthetic ±x axis hands.
        assert!(junction.hands.len() >= 3);
        assert!(junction.has_hand(&Vector2::new(1.0, 0.0)));
        assert!(junction.has_hand(&Vector2::new(-1.0, 0.0)));
    }
}
