// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-edge face extraction.
//!
//! Lattice segments are shattered at their intersections, stitched into a
//! planar graph, and traced into closed faces with the smallest-clockwise-
//! turn rule. The graph may hold several connected components (an island
//! of walls fully inside another room stays one cluster); each component
//! yields its own face set, whose unique clockwise face is its shell.

use crate::error::{Error, Result};
use crate::types::{EdgeLabel, Region};
use roomplan_geometry::intersect::classify;
use roomplan_geometry::polygon::signed_area;
use roomplan_geometry::{IntersectKind, Point2D, Segment, Tolerances};
use rustc_hash::{FxHashMap, FxHashSet};
use std::f64::consts::TAU;
use tracing::{debug, warn};

/// Faces below this absolute area are slivers left by near-coincident
/// lattice edges.
const SLIVER_AREA: f64 = 1e-9;

/// Faces traced from one connected component of a cluster's lattice.
#[derive(Debug)]
pub struct FaceSet {
    /// Interior regions first, shell last. Ids are list indices.
    pub regions: Vec<Region>,
    /// Index of the shell region within `regions`.
    pub shell: usize,
    /// Dead-end and sliver faces that produced no region.
    pub orphan_faces: usize,
}

/// Splits every segment at its crossings, T-junctions, and collinear
/// overlaps with the others. Exact duplicates are dropped first; partial
/// collinear overlaps are split at each other's projected endpoints so the
/// shared stretch dedups to a single edge.
fn shatter(segments: &[Segment], tol: &Tolerances) -> Vec<Segment> {
    let mut kept: Vec<Segment> = Vec::with_capacity(segments.len());
    for s in segments {
        let duplicate = kept
            .iter()
            .any(|k| classify(k, s, tol.point).kind == IntersectKind::Coincident);
        if !duplicate {
            kept.push(*s);
        }
    }

    let mut out = Vec::with_capacity(kept.len());
    for (i, a) in kept.iter().enumerate() {
        let len = a.length();
        if len <= tol.point {
            continue;
        }
        let eps = tol.point / len;
        let dir = a.direction();
        let mut cuts: Vec<f64> = Vec::new();
        for (j, b) in kept.iter().enumerate() {
            if i == j {
                continue;
            }
            let hit = classify(a, b, tol.point);
            match hit.kind {
                IntersectKind::OnBoth => {
                    if hit.t_a > eps && hit.t_a < 1.0 - eps {
                        cuts.push(hit.t_a);
                    }
                }
                IntersectKind::ColinearOverlap
                | IntersectKind::ColinearAContainsB
                | IntersectKind::ColinearBContainsA => {
                    for p in [b.start, b.end] {
                        let t = dir.dot(&a.start.vector_to(&p)) / len;
                        if t > eps && t < 1.0 - eps {
                            cuts.push(t);
                        }
                    }
                }
                _ => {}
            }
        }
        cuts.sort_by(|x, y| x.total_cmp(y));
        cuts.dedup_by(|x, y| (*x - *y).abs() < eps);
        let mut prev = 0.0;
        for t in cuts.into_iter().chain(std::iter::once(1.0)) {
            let piece = Segment::new(a.at(prev), a.at(t));
            if !piece.is_degenerate(tol.point) {
                out.push(piece);
            }
            prev = t;
        }
    }
    out
}

/// Index of `p` in `vertices`, inserting it when no existing vertex is
/// coincident within `tol`.
fn vertex_id(vertices: &mut Vec<Point2D>, p: Point2D, tol: f64) -> usize {
    if let Some(i) = vertices.iter().position(|v| v.coincident(&p, tol)) {
        return i;
    }
    vertices.push(p);
    vertices.len() - 1
}

/// Picks among `candidates` the outgoing half-edge making the smallest
/// clockwise turn from the reversed incoming direction.
fn smallest_clockwise_turn(
    rev: &nalgebra::Vector2<f64>,
    candidates: &[(usize, nalgebra::Vector2<f64>)],
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (he, dir) in candidates {
        let ccw = (rev.x * dir.y - rev.y * dir.x).atan2(rev.dot(dir));
        let cw = if -ccw > 0.0 { -ccw } else { TAU - ccw };
        if best.map_or(true, |(_, a)| cw < a) {
            best = Some((*he, cw));
        }
    }
    best.map(|(he, _)| he)
}

/// Traces the planar faces of `segments` and packages them as one face
/// set per connected component.
///
/// Components are numbered densely in discovery order; component `k`
/// records `first_group + k` as the group on its regions.
pub fn extract_regions(
    segments: &[Segment],
    first_group: usize,
    tol: &Tolerances,
) -> Result<Vec<FaceSet>> {
    if segments.is_empty() {
        return Err(Error::EmptyInput("no lattice segments to trace".into()));
    }
    let pieces = shatter(segments, tol);

    // Planar graph: merged vertices, deduplicated undirected edges.
    let mut vertices: Vec<Point2D> = Vec::new();
    let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for piece in &pieces {
        let a = vertex_id(&mut vertices, piece.start, tol.point);
        let b = vertex_id(&mut vertices, piece.end, tol.point);
        if a == b {
            continue;
        }
        if seen.insert((a.min(b) as u32, a.max(b) as u32)) {
            edges.push((a, b));
        }
    }

    // Iterative filament prune: an edge whose endpoint has degree one can
    // never bound a face.
    let mut alive = vec![true; edges.len()];
    let mut degree = vec![0usize; vertices.len()];
    for &(a, b) in &edges {
        degree[a] += 1;
        degree[b] += 1;
    }
    loop {
        let mut changed = false;
        for (e, &(a, b)) in edges.iter().enumerate() {
            if alive[e] && (degree[a] == 1 || degree[b] == 1) {
                alive[e] = false;
                degree[a] -= 1;
                degree[b] -= 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Two half-edges per surviving edge; twin is the index xor 1.
    let mut half_from: Vec<usize> = Vec::new();
    let mut half_to: Vec<usize> = Vec::new();
    for (e, &(a, b)) in edges.iter().enumerate() {
        if !alive[e] {
            continue;
        }
        half_from.push(a);
        half_to.push(b);
        half_from.push(b);
        half_to.push(a);
    }
    let half_count = half_from.len();
    if half_count == 0 {
        return Err(Error::NoShellFound { faces: 0 });
    }
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
    for he in 0..half_count {
        outgoing[half_from[he]].push(he);
    }

    // Connected components over the surviving edges.
    let mut component = vec![usize::MAX; vertices.len()];
    let mut components = 0usize;
    for v in 0..vertices.len() {
        if component[v] != usize::MAX || outgoing[v].is_empty() {
            continue;
        }
        component[v] = components;
        let mut stack = vec![v];
        while let Some(u) = stack.pop() {
            for &he in &outgoing[u] {
                let w = half_to[he];
                if component[w] == usize::MAX {
                    component[w] = components;
                    stack.push(w);
                }
            }
        }
        components += 1;
    }

    // Face tracing. `face_of[he]` stays None for orphan walks.
    let mut face_of: Vec<Option<usize>> = vec![None; half_count];
    let mut visited = vec![false; half_count];
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut face_component: Vec<usize> = Vec::new();
    let mut orphans = vec![0usize; components];
    for start in 0..half_count {
        if visited[start] {
            continue;
        }
        let mut walk: Vec<usize> = Vec::new();
        let mut current = start;
        let mut closed = false;
        for _ in 0..=half_count {
            visited[current] = true;
            walk.push(current);
            let v = half_to[current];
            let rev = (vertices[half_from[current]].vector_to(&vertices[v]) * -1.0).normalize();
            let candidates: Vec<(usize, nalgebra::Vector2<f64>)> = outgoing[v]
                .iter()
                .filter(|&&he| he != (current ^ 1))
                .map(|&he| {
                    (
                        he,
                        vertices[half_from[he]]
                            .vector_to(&vertices[half_to[he]])
                            .normalize(),
                    )
                })
                .collect();
            let Some(next) = smallest_clockwise_turn(&rev, &candidates) else {
                break;
            };
            if next == start {
                closed = true;
                break;
            }
            if visited[next] {
                // Re-entered an already claimed half-edge without closing.
                break;
            }
            current = next;
        }
        let comp = component[half_from[start]];
        if !closed {
            if walk.len() > half_count {
                return Err(Error::TraversalDidNotConverge(format!(
                    "face walk exceeded {half_count} half-edges"
                )));
            }
            orphans[comp] += 1;
            continue;
        }
        let loop_pts: Vec<Point2D> = walk.iter().map(|&he| vertices[half_from[he]]).collect();
        if signed_area(&loop_pts).abs() < SLIVER_AREA {
            orphans[comp] += 1;
            continue;
        }
        let face = faces.len();
        for &he in &walk {
            face_of[he] = Some(face);
        }
        faces.push(walk);
        face_component.push(comp);
    }

    // Per component: the unique CW loop (negative signed area) is the
    // shell, everything else is interior. Interiors keep trace order,
    // shell goes last.
    let mut shell_face = vec![usize::MAX; components];
    for (f, walk) in faces.iter().enumerate() {
        let pts: Vec<Point2D> = walk.iter().map(|&he| vertices[half_from[he]]).collect();
        if signed_area(&pts) < 0.0 {
            let comp = face_component[f];
            if shell_face[comp] != usize::MAX {
                return Err(Error::NoShellFound { faces: faces.len() });
            }
            shell_face[comp] = f;
        }
    }
    if shell_face.iter().any(|&f| f == usize::MAX) {
        return Err(Error::NoShellFound { faces: faces.len() });
    }

    // Local region ids per component, interiors first.
    let mut local_id = vec![usize::MAX; faces.len()];
    let mut ordered: Vec<Vec<usize>> = vec![Vec::new(); components];
    for f in 0..faces.len() {
        let comp = face_component[f];
        if f != shell_face[comp] {
            local_id[f] = ordered[comp].len();
            ordered[comp].push(f);
        }
    }
    for comp in 0..components {
        local_id[shell_face[comp]] = ordered[comp].len();
        ordered[comp].push(shell_face[comp]);
    }

    let mut position: FxHashMap<usize, usize> = FxHashMap::default();
    for walk in &faces {
        for (p, &he) in walk.iter().enumerate() {
            position.insert(he, p);
        }
    }

    let mut sets: Vec<FaceSet> = Vec::with_capacity(components);
    for comp in 0..components {
        let mut regions: Vec<Region> = Vec::with_capacity(ordered[comp].len());
        for &f in &ordered[comp] {
            let walk = &faces[f];
            let pts: Vec<Point2D> = walk.iter().map(|&he| vertices[half_from[he]]).collect();
            let mut region = Region::new(local_id[f], first_group + comp, pts, f == shell_face[comp]);
            for (p, &he) in walk.iter().enumerate() {
                let twin = he ^ 1;
                region.edge_labels[p] = match face_of[twin] {
                    Some(tf) if tf != shell_face[comp] => EdgeLabel::Neighbor {
                        region: local_id[tf],
                        edge: position[&twin],
                    },
                    _ => EdgeLabel::Outside,
                };
            }
            regions.push(region);
        }
        if orphans[comp] > 0 {
            warn!(
                orphans = orphans[comp],
                group = first_group + comp,
                "orphan faces dropped during tracing"
            );
        }
        sets.push(FaceSet {
            shell: regions.len() - 1,
            regions,
            orphan_faces: orphans[comp],
        });
    }

    debug!(
        components,
        faces = faces.len(),
        "face extraction complete"
    );
    Ok(sets)
}
