// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Containment across face sets.
//!
//! Each face set (one connected wall component, whether its own cluster
//! or an island inside another cluster) contributes one shell. When a
//! shell sits inside another set's interior region, that shell becomes a
//! hole loop of the enclosing region and both sides are relabeled to
//! reference each other.

use crate::error::{Error, Result};
use crate::extract::FaceSet;
use crate::types::{EdgeLabel, Region};
use roomplan_geometry::polygon::{point_in_polygon, signed_area};
use roomplan_geometry::{Point2D, Tolerances};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Deeper nesting than this is treated as corrupt input.
const MAX_NESTING_DEPTH: usize = 10;

/// Shells smaller than this area are measurement noise, not rooms.
const NOISE_SHELL_AREA: f64 = 2.0;

/// Level-wide merge result.
#[derive(Debug)]
pub struct MergeOutcome {
    pub regions: Vec<Region>,
    /// Nested shells discarded for being below the noise area.
    pub dropped_shells: usize,
}

/// Key for matching edges between loops that share traced vertices.
/// Vertices flowing out of one trace are bit-identical, so exact bits
/// are a stable identity.
fn edge_key(a: &Point2D, b: &Point2D) -> (u64, u64, u64, u64) {
    let ka = (a.x.to_bits(), a.y.to_bits());
    let kb = (b.x.to_bits(), b.y.to_bits());
    if ka <= kb {
        (ka.0, ka.1, kb.0, kb.1)
    } else {
        (kb.0, kb.1, ka.0, ka.1)
    }
}

fn loop_edge_keys(pts: &[Point2D]) -> Vec<(u64, u64, u64, u64)> {
    let n = pts.len();
    (0..n).map(|i| edge_key(&pts[i], &pts[(i + 1) % n])).collect()
}

/// Merges face sets from every cluster into one region list.
///
/// Region ids are rewritten to level-wide indices; `Neighbor` labels are
/// shifted accordingly. Shell containment is established by testing one
/// shell vertex against the candidate enclosing shell with the boundary
/// excluded, so shells sharing a wall are not nested.
pub fn merge_clusters(face_sets: Vec<FaceSet>, tol: &Tolerances) -> Result<MergeOutcome> {
    // Flatten with id offsets.
    let mut regions: Vec<Region> = Vec::new();
    let mut shell_of_set: Vec<usize> = Vec::new();
    for set in face_sets {
        let offset = regions.len();
        shell_of_set.push(offset + set.shell);
        for mut region in set.regions {
            region.id += offset;
            for label in &mut region.edge_labels {
                if let EdgeLabel::Neighbor { region: r, .. } = label {
                    *r += offset;
                }
            }
            regions.push(region);
        }
    }

    // Immediate parent per face set: the smallest enclosing shell.
    let sets = shell_of_set.len();
    let mut parent: Vec<Option<usize>> = vec![None; sets];
    for i in 0..sets {
        let sample = regions[shell_of_set[i]].outer[0];
        let mut best: Option<(usize, f64)> = None;
        for j in 0..sets {
            if i == j {
                continue;
            }
            let shell = &regions[shell_of_set[j]].outer;
            if point_in_polygon(&sample, shell, false, tol.point) {
                let area = signed_area(shell).abs();
                if best.map_or(true, |(_, a)| area < a) {
                    best = Some((j, area));
                }
            }
        }
        parent[i] = best.map(|(j, _)| j);
    }

    // Depth check along parent chains.
    for i in 0..sets {
        let mut depth = 0usize;
        let mut cursor = parent[i];
        while let Some(p) = cursor {
            depth += 1;
            if depth > MAX_NESTING_DEPTH {
                return Err(Error::ContainmentTooDeep {
                    max_depth: MAX_NESTING_DEPTH,
                });
            }
            cursor = parent[p];
        }
    }

    // Fold each nested shell into the parent region that encloses it.
    let mut dropped_shells = 0usize;
    for i in 0..sets {
        let Some(p) = parent[i] else { continue };
        let shell_id = shell_of_set[i];
        let shell_loop = regions[shell_id].outer.clone();
        if signed_area(&shell_loop).abs() < NOISE_SHELL_AREA {
            warn!(set = i, "dropping noise shell below area threshold");
            dropped_shells += 1;
            continue;
        }
        let sample = shell_loop[0];

        // The enclosing interior region of the parent set.
        let parent_group = regions[shell_of_set[p]].group;
        let host = regions
            .iter()
            .position(|r| {
                r.group == parent_group
                    && !r.is_shell
                    && point_in_polygon(&sample, &r.outer, false, tol.point)
            });
        let Some(host) = host else {
            warn!(set = i, "nested shell has no enclosing interior region");
            continue;
        };

        // Hole edges face the nested set's interior regions; match
        // them through shared vertex identity.
        let hole_keys = loop_edge_keys(&shell_loop);
        let mut facing: FxHashMap<(u64, u64, u64, u64), (usize, usize)> = FxHashMap::default();
        let nested_group = regions[shell_id].group;
        for r in &regions {
            if r.group != nested_group || r.is_shell {
                continue;
            }
            for (e, key) in loop_edge_keys(&r.outer).into_iter().enumerate() {
                facing.insert(key, (r.id, e));
            }
        }
        let hole_labels: Vec<EdgeLabel> = hole_keys
            .iter()
            .map(|k| match facing.get(k) {
                Some(&(r, e)) => EdgeLabel::Neighbor { region: r, edge: e },
                None => EdgeLabel::Outside,
            })
            .collect();

        let hole_key_set: FxHashMap<(u64, u64, u64, u64), usize> = hole_keys
            .iter()
            .enumerate()
            .map(|(e, k)| (*k, e))
            .collect();

        let host_id = regions[host].id;
        regions[host].inner_loops.push(shell_loop);
        regions[host].inner_labels.push(hole_labels);

        // Nested interior walls that used to face open space now face the
        // host region across the folded hole boundary.
        for r in 0..regions.len() {
            if regions[r].group != nested_group || regions[r].is_shell {
                continue;
            }
            let keys = loop_edge_keys(&regions[r].outer);
            for (e, key) in keys.into_iter().enumerate() {
                if regions[r].edge_labels[e] == EdgeLabel::Outside {
                    if let Some(&hole_edge) = hole_key_set.get(&key) {
                        regions[r].edge_labels[e] = EdgeLabel::Neighbor {
                            region: host_id,
                            edge: hole_edge,
                        };
                    }
                }
            }
        }
    }

    Ok(MergeOutcome {
        regions,
        dropped_shells,
    })
}
