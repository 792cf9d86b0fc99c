// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Greedy rectangle tessellation of multiply-connected regions.
//!
//! Each step planes a rectangle off the shortest outer edge whose two
//! corners are both convex, clipped back by any hole it would overrun,
//! then subtracts it. The loop ends when the remainder is itself a
//! simple quad, which is emitted as the final tile.

use crate::error::{Error, Result};
use crate::types::{Region, Tile};
use roomplan_geometry::bool2d::{self, Shape};
use roomplan_geometry::polygon::{ensure_ccw, ensure_cw, signed_area, simplify_collinear};
use roomplan_geometry::{Point2D, Tolerances};
use tracing::debug;

/// Hard cap on planing steps for one region.
const MAX_TILES: usize = 50;

/// Cross-product tolerance for collinear-vertex removal.
const COLLINEAR_EPS: f64 = 1e-9;

/// True when the remainder needs no further planing: a simple loop of at
/// most four corners with no holes left.
fn is_terminal(shape: &Shape) -> bool {
    shape.holes.is_empty() && shape.outer.len() <= 4
}

/// Convexity flag per vertex of a CCW loop.
fn convex_flags(outer: &[Point2D]) -> Vec<bool> {
    let n = outer.len();
    (0..n)
        .map(|i| {
            let prev = &outer[(i + n - 1) % n];
            let curr = &outer[i];
            let next = &outer[(i + 1) % n];
            let ax = curr.x - prev.x;
            let ay = curr.y - prev.y;
            let bx = next.x - curr.x;
            let by = next.y - curr.y;
            ax * by - ay * bx > 0.0
        })
        .collect()
}

/// One planing step: the rectangle taken off `shape` and the remainder
/// pieces, or `None` when `shape` is terminal.
pub fn tessellate_step(shape: &Shape, tol: &Tolerances) -> Result<Option<(Tile, Vec<Shape>)>> {
    if is_terminal(shape) {
        return Ok(None);
    }
    let outer = &shape.outer;
    let n = outer.len();
    let convex = convex_flags(outer);

    // Candidate edges sorted by length, shortest first. Ties keep input
    // order so the choice is deterministic.
    let mut candidates: Vec<(usize, f64)> = (0..n)
        .filter(|&i| convex[i] && convex[(i + 1) % n])
        .map(|i| (i, outer[i].distance_to(&outer[(i + 1) % n])))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (i, edge_len) in candidates {
        let a = outer[i];
        let b = outer[(i + 1) % n];
        let dir = a.vector_to(&b) / edge_len;
        // Inward normal of a CCW loop is the left normal.
        let normal = nalgebra::Vector2::new(-dir.y, dir.x);

        let prev_len = outer[(i + n - 1) % n].distance_to(&a);
        let next_len = b.distance_to(&outer[(i + 2) % n]);
        let mut depth = prev_len.min(next_len);

        // Shrink to the first hole vertex the rectangle would swallow.
        for hole in &shape.holes {
            for h in hole {
                let v = a.vector_to(h);
                let s = v.dot(&dir);
                if s < -tol.point || s > edge_len + tol.point {
                    continue;
                }
                let d = v.dot(&normal);
                if d > tol.point && d < depth {
                    depth = d;
                }
            }
        }
        if depth <= tol.point {
            continue;
        }

        let corners = vec![
            a,
            b,
            b.translated(&(normal * depth)),
            a.translated(&(normal * depth)),
        ];
        let remainder = bool2d::difference(shape, &[corners.clone()])?;
        let remainder: Vec<Shape> = remainder
            .into_iter()
            .map(|s| Shape::with_holes(
                simplify_collinear(&s.outer, COLLINEAR_EPS),
                s.holes
                    .iter()
                    .map(|h| simplify_collinear(h, COLLINEAR_EPS))
                    .collect(),
            ))
            .collect();
        return Ok(Some((Tile::new(corners), remainder)));
    }

    // Every safe edge was blocked by a hole hugging it.
    Err(Error::TessellationDidNotConverge { iterations: 0 })
}

/// Full decomposition of one region into rectangles (plus one final
/// remainder quad per connected piece).
pub fn rectangle_tiles(region: &Region, tol: &Tolerances) -> Result<Vec<Tile>> {
    let outer = simplify_collinear(&ensure_ccw(&region.outer), COLLINEAR_EPS);
    let holes: Vec<Vec<Point2D>> = region
        .inner_loops
        .iter()
        .map(|h| simplify_collinear(&ensure_cw(h), COLLINEAR_EPS))
        .collect();
    let mut worklist = vec![Shape::with_holes(outer, holes)];
    let mut tiles: Vec<Tile> = Vec::new();

    let mut steps = 0usize;
    while let Some(shape) = worklist.pop() {
        if signed_area(&shape.outer).abs() < COLLINEAR_EPS {
            continue;
        }
        if steps >= MAX_TILES {
            return Err(Error::TessellationDidNotConverge { iterations: steps });
        }
        steps += 1;
        match tessellate_step(&shape, tol)? {
            None => tiles.push(Tile::new(shape.outer)),
            Some((tile, remainder)) => {
                tiles.push(tile);
                worklist.extend(remainder);
            }
        }
    }

    debug!(region = region.id, tiles = tiles.len(), "tessellation complete");
    Ok(tiles)
}
