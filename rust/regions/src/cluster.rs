// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fuzzy clustering of wall segments into spatially coherent bundles.
//!
//! Wall centerlines coming out of a host document are never exactly
//! coincident, so grouping is intentionally geometry-fuzzy: two segments
//! belong together when their tolerance-expanded boxes touch, not when
//! they intersect exactly.

use roomplan_geometry::intersect::{classify, IntersectKind};
use roomplan_geometry::polygon::point_in_polygon;
use roomplan_geometry::{Point2D, Segment};

/// Groups segments by expanded-box intersection, growth-style: a group
/// absorbs every remaining segment whose expanded quad touches (or is
/// contained by) the quad of any current member, until a fixed point, then
/// the next unclaimed segment seeds a new group. O(n²) per pass.
///
/// Seeding follows input order, so the grouping is deterministic; the set
/// of groups is independent of input order for well-separated bundles.
pub fn cluster_by_fuzzy_intersection(segments: &[Segment], tol: f64) -> Vec<Vec<Segment>> {
    let quads: Vec<[Point2D; 4]> = segments.iter().map(|s| s.expanded_quad(tol)).collect();
    let mut claimed = vec![false; segments.len()];
    let mut groups = Vec::new();

    for seed in 0..segments.len() {
        if claimed[seed] {
            continue;
        }
        claimed[seed] = true;
        let mut members = vec![seed];
        let mut frontier = vec![seed];

        while let Some(current) = frontier.pop() {
            for other in 0..segments.len() {
                if claimed[other] {
                    continue;
                }
                if quads_touch(&quads[current], &quads[other]) {
                    claimed[other] = true;
                    members.push(other);
                    frontier.push(other);
                }
            }
        }

        groups.push(members.into_iter().map(|i| segments[i]).collect());
    }

    groups
}

/// True when two expanded quads intersect or one contains the other.
fn quads_touch(a: &[Point2D; 4], b: &[Point2D; 4]) -> bool {
    // Any pair of edges crossing.
    for i in 0..4 {
        let ea = Segment::new(a[i], a[(i + 1) % 4]);
        for j in 0..4 {
            let eb = Segment::new(b[j], b[(j + 1) % 4]);
            if classify(&ea, &eb, 1e-9).kind == IntersectKind::OnBoth {
                return true;
            }
        }
    }
    // Full containment either way (no edge crossings, so one corner decides).
    point_in_polygon(&b[0], a, true, 1e-9) || point_in_polygon(&a[0], b, true, 1e-9)
}
