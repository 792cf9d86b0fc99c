// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lattice reconstruction: anchors + hands back into concrete segments.
//!
//! Dangling anchors (exactly one hand) are resolved first by ray-matching
//! toward an anchor holding the opposite hand; what remains is emitted by
//! mutual nearest-match agreement, which deduplicates the two traversal
//! directions of every physical edge.

use crate::align::Anchor;
use crate::error::{Error, Result};
use nalgebra::Vector2;
use roomplan_geometry::{Segment, Tolerances};
use tracing::{debug, warn};

/// Hard cap on dangling-resolution sweeps. Hitting it means the input
/// cannot be resolved and must surface as an error, not a truncation.
const MAX_RESOLUTION_SWEEPS: usize = 200;

/// Hands opposing within ~5° count as a match; the lateral ray check does
/// the precise work. (Hand directions can be slightly stale after their
/// endpoints were snapped onto an axis.)
const OPPOSE_COS: f64 = 0.996;

fn opposes(a: &Vector2<f64>, b: &Vector2<f64>) -> bool {
    a.dot(b) <= -OPPOSE_COS
}

/// Reconstruction output plus the drop counters the caller reports.
#[derive(Debug)]
pub struct LatticeOutcome {
    pub segments: Vec<Segment>,
    /// Dangling anchors pruned because no reciprocal match existed.
    pub pruned_anchors: usize,
    /// Hands skipped during emission for lack of mutual agreement.
    pub unmatched_hands: usize,
    /// Collinear gaps closed by consuming back-to-back run ends.
    pub bridged_gaps: usize,
}

/// Consumes pairs of single-hand anchors that sit back to back on one
/// axis within the extension reach: two wall runs separated by a small
/// measurement gap are one physical run, so both inner ends disappear and
/// the outer ends match across the whole span.
fn close_axis_gaps(anchors: &mut Vec<Anchor>, tol: &Tolerances) -> usize {
    let mut consumed = vec![false; anchors.len()];
    let mut bridged = 0usize;
    for i in 0..anchors.len() {
        if consumed[i] || anchors[i].hands.len() != 1 {
            continue;
        }
        let hand_i = anchors[i].hands[0];
        let mut best: Option<(usize, f64)> = None;
        for j in 0..anchors.len() {
            if j == i || consumed[j] || anchors[j].hands.len() != 1 {
                continue;
            }
            let hand_j = anchors[j].hands[0];
            if !opposes(&hand_i, &hand_j) {
                continue;
            }
            let v = anchors[i].point.vector_to(&anchors[j].point);
            let gap = v.norm();
            if gap > tol.extension() {
                continue;
            }
            // Both hands must point away from the gap, into their runs.
            if v.dot(&hand_i) >= 0.0 || (-v).dot(&hand_j) >= 0.0 {
                continue;
            }
            let lateral = (v.x * hand_i.y - v.y * hand_i.x).abs();
            if lateral > tol.axis_absorb() {
                continue;
            }
            if best.map_or(true, |(_, d)| gap < d) {
                best = Some((j, gap));
            }
        }
        if let Some((j, _)) = best {
            consumed[i] = true;
            consumed[j] = true;
            bridged += 1;
        }
    }
    if bridged > 0 {
        debug!(bridged, "closed collinear axis gaps");
        let mut keep = consumed.iter().map(|c| !c);
        anchors.retain(|_| keep.next().unwrap_or(true));
    }
    bridged
}

/// Rebuilds concrete lattice segments from aligned anchors.
pub fn build_lattice(anchors: &[Anchor], tol: &Tolerances) -> Result<LatticeOutcome> {
    let mut anchors: Vec<Anchor> = anchors.to_vec();
    let bridged_gaps = close_axis_gaps(&mut anchors, tol);
    let mut segments: Vec<Segment> = Vec::new();
    let mut pruned_anchors = 0usize;

    // Phase 1: resolve or prune every single-hand anchor.
    let mut sweeps = 0usize;
    loop {
        let Some(i) = anchors.iter().position(|a| a.hands.len() == 1) else {
            break;
        };
        if sweeps >= MAX_RESOLUTION_SWEEPS {
            let unresolved = anchors.iter().filter(|a| a.hands.len() == 1).count();
            return Err(Error::LatticeDidNotConverge {
                iterations: sweeps,
                unresolved,
            });
        }
        sweeps += 1;

        let hand = anchors[i].hands[0];
        match ray_match(&anchors, i, &hand, tol) {
            Some(j) => {
                segments.push(Segment::new(anchors[i].point, anchors[j].point));
                if let Some(opposite) = anchors[j].hands.iter().position(|h| opposes(h, &hand)) {
                    anchors[j].hands.remove(opposite);
                }
                anchors.remove(i);
            }
            None => {
                warn!(
                    x = anchors[i].point.x,
                    y = anchors[i].point.y,
                    "pruning dangling anchor with no reciprocal match"
                );
                pruned_anchors += 1;
                anchors.remove(i);
            }
        }
    }
    anchors.retain(|a| !a.hands.is_empty());

    // Phase 2: emit the remaining lattice by mutual agreement. Each
    // physical edge is seen from both ends; `i < j` keeps one copy.
    let mut unmatched_hands = 0usize;
    for i in 0..anchors.len() {
        for hand in anchors[i].hands.clone() {
            let Some(j) = ray_match(&anchors, i, &hand, tol) else {
                unmatched_hands += 1;
                continue;
            };
            let Some(back) = anchors[j].hands.iter().copied().find(|h| opposes(h, &hand)) else {
                unmatched_hands += 1;
                continue;
            };
            let reciprocal = ray_match(&anchors, j, &back, tol);
            if reciprocal != Some(i) {
                unmatched_hands += 1;
                continue;
            }
            if i < j {
                segments.push(Segment::new(anchors[i].point, anchors[j].point));
            }
        }
    }

    if unmatched_hands > 0 {
        warn!(unmatched_hands, "hands without mutual ray match");
    }
    debug!(
        segments = segments.len(),
        pruned_anchors, "lattice reconstruction complete"
    );

    Ok(LatticeOutcome {
        segments,
        pruned_anchors,
        unmatched_hands,
        bridged_gaps,
    })
}

/// Nearest anchor holding a hand opposite to `hand`, lying on the ray from
/// anchor `from` along `hand`: positive forward parameter, lateral offset
/// within the band tolerance, reach capped at nothing (the lattice spans
/// whole wall runs).
fn ray_match(anchors: &[Anchor], from: usize, hand: &Vector2<f64>, tol: &Tolerances) -> Option<usize> {
    let origin = anchors[from].point;
    let mut best: Option<(usize, f64)> = None;
    for (j, candidate) in anchors.iter().enumerate() {
        if j == from {
            continue;
        }
        if !candidate.hands.iter().any(|h| opposes(h, hand)) {
            continue;
        }
        let v = origin.vector_to(&candidate.point);
        let forward = v.dot(hand);
        if forward <= tol.point {
            continue;
        }
        let lateral = (v.x * hand.y - v.y * hand.x).abs();
        if lateral > tol.band {
            continue;
        }
        if best.map_or(true, |(_, d)| forward < d) {
            best = Some((j, forward));
        }
    }
    best.map(|(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use roomplan_geometry::Point2D;

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

    fn contains_edge(segments: &[Segment], a: (f64, f64), b: (f64, f64), tol: f64) -> bool {
        let pa = Point2D::new(a.0, a.1);
        let pb = Point2D::new(b.0, b.1);
        segments.iter().any(|s| {
            (s.start.coincident(&pa, tol) && s.end.coincident(&pb, tol))
                || (s.start.coincident(&pb, tol) && s.end.coincident(&pa, tol))
        })
    }

    #[test]
    fn rectangle_round_trips() {
        let input = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 10.0, 10.0),
            seg(10.0, 10.0, 0.0, 10.0),
            seg(0.0, 10.0, 0.0, 0.0),
        ];
        let tol = tolerances();
        let anchors = align(&input, &tol);
        let outcome = build_lattice(&anchors, &tol).unwrap();
        assert_eq!(outcome.segments.len(), 4);
        assert_eq!(outcome.pruned_anchors, 0);
        assert!(contains_edge(&outcome.segments, (0.0, 0.0), (10.0, 0.0), 1e-6));
        assert!(contains_edge(&outcome.segments, (10.0, 0.0), (10.0, 10.0), 1e-6));
    }

    #[test]
    fn small_collinear_gap_is_bridged() {
        // Gap of 0.3 on a shared axis, within the 4x band extension reach:
        // the two runs become one.
        let input = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.3, 0.0, 20.0, 0.0)];
        let tol = tolerances();
        let anchors = align(&input, &tol);
        let outcome = build_lattice(&anchors, &tol).unwrap();
        assert_eq!(outcome.bridged_gaps, 1);
        assert_eq!(outcome.segments.len(), 1);
        assert!(contains_edge(&outcome.segments, (0.0, 0.0), (20.0, 0.0), 1e-6));
    }

    #[test]
    fn wide_collinear_gap_stays_open() {
        let input = vec![seg(0.0, 0.0, 10.0, 0.0), seg(15.0, 0.0, 25.0, 0.0)];
        let tol = tolerances();
        let anchors = align(&input, &tol);
        let outcome = build_lattice(&anchors, &tol).unwrap();
        assert_eq!(outcome.bridged_gaps, 0);
        assert_eq!(outcome.segments.len(), 2);
        assert_eq!(outcome.pruned_anchors, 0);
    }

    #[test]
    fn detached_stub_resolves_to_itself() {
        let mut input = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 10.0, 10.0),
            seg(10.0, 10.0, 0.0, 10.0),
            seg(0.0, 10.0, 0.0, 0.0),
        ];
        input.push(seg(50.0, 50.0, 55.0, 50.0));
        let tol = tolerances();
        let anchors = align(&input, &tol);
        let outcome = build_lattice(&anchors, &tol).unwrap();
        // The stub's two ends are each other's reciprocal match.
        assert_eq!(outcome.segments.len(), 5);
        assert_eq!(outcome.pruned_anchors, 0);
        assert!(contains_edge(&outcome.segments, (50.0, 50.0), (55.0, 50.0), 1e-6));
    }

    #[test]
    fn anchor_without_partner_is_pruned() {
        let mut lone = Anchor::new(Point2D::new(3.0, 7.0));
        lone.add_hand(Vector2::new(1.0, 0.0));
        let outcome = build_lattice(&[lone], &tolerances()).unwrap();
        assert!(outcome.segments.is_empty());
        assert_eq!(outcome.pruned_anchors, 1);
    }

    #[test]
    fn alignment_and_reconstruction_are_idempotent() {
        let input = vec![
            seg(0.0, 0.005, 10.0, 0.0),
            seg(10.004, 0.0, 10.0, 10.0),
            seg(10.0, 10.003, 0.0, 10.0),
            seg(0.0, 10.0, 0.0, 0.002),
        ];
        let tol = tolerances();
        let first = build_lattice(&align(&input, &tol), &tol).unwrap().segments;
        let second = build_lattice(&align(&first, &tol), &tol).unwrap().segments;
        assert_eq!(first.len(), second.len());
        for s in &first {
            assert!(contains_edge(
                &second,
                (s.start.x, s.start.y),
                (s.end.x, s.end.y),
                1e-6
            ));
        }
    }
}
