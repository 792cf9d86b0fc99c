// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output data model for reconstructed regions and tiles.

use roomplan_geometry::polygon::signed_area;
use roomplan_geometry::Point2D;
use serde::{Deserialize, Serialize};

/// Adjacency label of one region edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EdgeLabel {
    /// The far side of this wall is the shell or unresolved space.
    Outside,
    /// The far side is edge `edge` of region `region` (index within the
    /// same level's region list).
    Neighbor { region: usize, edge: usize },
}

/// A closed polygonal region (candidate room) traced from one wall cluster.
///
/// Winding contract: the shell region winds **clockwise**, interior regions
/// wind **counter-clockwise**. `outer` is a simple closed loop with one
/// entry per vertex (not repeated at the end); edge `i` runs from vertex
/// `i` to vertex `i + 1` (mod len).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: usize,
    /// Index of the wall cluster this region was traced from.
    pub group: usize,
    pub outer: Vec<Point2D>,
    /// One label per edge of `outer`.
    pub edge_labels: Vec<EdgeLabel>,
    pub is_shell: bool,
    /// Hole loops folded in from nested shells (multiply-connected region).
    pub inner_loops: Vec<Vec<Point2D>>,
    /// One label list per inner loop.
    pub inner_labels: Vec<Vec<EdgeLabel>>,
    /// Rectangle decomposition, computed on demand.
    pub tiles: Option<Vec<Tile>>,
}

impl Region {
    pub fn new(id: usize, group: usize, outer: Vec<Point2D>, is_shell: bool) -> Self {
        let edge_count = outer.len();
        Self {
            id,
            group,
            outer,
            edge_labels: vec![EdgeLabel::Outside; edge_count],
            is_shell,
            inner_loops: Vec::new(),
            inner_labels: Vec::new(),
            tiles: None,
        }
    }

    /// Outer area minus hole areas.
    pub fn area(&self) -> f64 {
        let outer = signed_area(&self.outer).abs();
        let holes: f64 = self.inner_loops.iter().map(|h| signed_area(h).abs()).sum();
        outer - holes
    }

    pub fn perimeter(&self) -> f64 {
        let n = self.outer.len();
        (0..n)
            .map(|i| self.outer[i].distance_to(&self.outer[(i + 1) % n]))
            .sum()
    }

    pub fn is_multiply_connected(&self) -> bool {
        !self.inner_loops.is_empty()
    }
}

/// One rectangle of an MCR decomposition, corners in loop order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub corners: Vec<Point2D>,
}

impl Tile {
    pub fn new(corners: Vec<Point2D>) -> Self {
        Self { corners }
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.corners).abs()
    }
}

/// Renders the external adjacency-label contract for edge `edge` of the
/// region `zone` on level `level`, group `group`:
/// `<level>::<group>::Z<zone>::Wall_<edge>` for walls shared with another
/// region, `<level>::<group>::Z<zone>::Outside_<edge>` for the rest.
pub fn format_label(level: &str, group: usize, zone: usize, edge: usize, label: &EdgeLabel) -> String {
    match label {
        EdgeLabel::Outside => format!("{level}::{group}::Z{zone}::Outside_{edge}"),
        EdgeLabel::Neighbor { .. } => format!("{level}::{group}::Z{zone}::Wall_{edge}"),
    }
}
