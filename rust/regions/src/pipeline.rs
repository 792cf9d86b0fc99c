// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction of one level.
//!
//! Noisy wall centerlines go through clustering, lattice alignment and
//! reconstruction, face extraction, cross-cluster containment, and
//! on-demand rectangle tessellation of multiply-connected regions.

use crate::align::align;
use crate::cluster::cluster_by_fuzzy_intersection;
use crate::containment::merge_clusters;
use crate::error::{Error, Result};
use crate::extract::{extract_regions, FaceSet};
use crate::lattice::build_lattice;
use crate::tessellate::rectangle_tiles;
use crate::types::{format_label, Region};
use roomplan_geometry::{Segment, Tolerances};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Counters describing what the pipeline discarded or repaired.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReconstructionStats {
    pub clusters: usize,
    /// Clusters whose lattice or face extraction failed outright.
    pub failed_clusters: usize,
    /// Clusters discarded because their shell perimeter fell below the
    /// configured minimum.
    pub dropped_clusters: usize,
    pub pruned_anchors: usize,
    pub unmatched_hands: usize,
    pub bridged_gaps: usize,
    pub orphan_faces: usize,
    pub dropped_shells: usize,
}

/// Reconstructed level: regions with adjacency labels and, for
/// multiply-connected regions, their rectangle decomposition.
#[derive(Debug)]
pub struct Reconstruction {
    pub level: String,
    pub regions: Vec<Region>,
    pub stats: ReconstructionStats,
}

/// Runs the whole reconstruction for one level.
///
/// A cluster that fails lattice resolution or face extraction is skipped
/// and counted; the rest of the level still reconstructs. The call fails
/// only when no cluster survives.
pub fn reconstruct_level(
    segments: &[Segment],
    tol: &Tolerances,
    level: &str,
) -> Result<Reconstruction> {
    tol.validate()?;
    let usable: Vec<Segment> = segments
        .iter()
        .copied()
        .filter(|s| !s.is_degenerate(tol.point))
        .collect();
    if usable.is_empty() {
        return Err(Error::EmptyInput(
            "no non-degenerate segments in level input".into(),
        ));
    }

    let clusters = cluster_by_fuzzy_intersection(&usable, tol.grouping);
    let mut stats = ReconstructionStats {
        clusters: clusters.len(),
        ..ReconstructionStats::default()
    };

    // Groups number face sets level-wide: one cluster yields one set per
    // connected wall component.
    let mut face_sets: Vec<FaceSet> = Vec::new();
    let mut last_error: Option<Error> = None;
    let mut next_group = 0usize;
    for (cluster_idx, cluster) in clusters.iter().enumerate() {
        let anchors = align(cluster, tol);
        let lattice = match build_lattice(&anchors, tol) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(cluster = cluster_idx, %err, "cluster lattice failed");
                stats.failed_clusters += 1;
                last_error = Some(err);
                continue;
            }
        };
        stats.pruned_anchors += lattice.pruned_anchors;
        stats.unmatched_hands += lattice.unmatched_hands;
        stats.bridged_gaps += lattice.bridged_gaps;

        let sets = match extract_regions(&lattice.segments, next_group, tol) {
            Ok(sets) => sets,
            Err(err) => {
                warn!(cluster = cluster_idx, %err, "cluster face extraction failed");
                stats.failed_clusters += 1;
                last_error = Some(err);
                continue;
            }
        };
        next_group += sets.len();
        for faces in sets {
            stats.orphan_faces += faces.orphan_faces;
            if faces.regions[faces.shell].perimeter() < tol.perimeter {
                warn!(cluster = cluster_idx, "dropping component below perimeter threshold");
                stats.dropped_clusters += 1;
                continue;
            }
            face_sets.push(faces);
        }
    }

    if face_sets.is_empty() {
        return Err(last_error.unwrap_or_else(|| Error::EmptyInput("no cluster survived".into())));
    }

    let merged = merge_clusters(face_sets, tol)?;
    stats.dropped_shells = merged.dropped_shells;
    let mut regions = merged.regions;

    // Rectangle decomposition for multiply-connected regions. A cap hit
    // here degrades that one region, not the level.
    for region in &mut regions {
        if region.is_multiply_connected() && !region.is_shell {
            match rectangle_tiles(region, tol) {
                Ok(tiles) => region.tiles = Some(tiles),
                Err(err) => warn!(region = region.id, %err, "tessellation failed"),
            }
        }
    }

    info!(
        level,
        regions = regions.len(),
        clusters = stats.clusters,
        "level reconstruction complete"
    );
    Ok(Reconstruction {
        level: level.to_string(),
        regions,
        stats,
    })
}

/// External adjacency labels for every outer edge of `region`.
pub fn edge_label_strings(region: &Region, level: &str) -> Vec<String> {
    region
        .edge_labels
        .iter()
        .enumerate()
        .map(|(e, label)| format_label(level, region.group, region.id, e, label))
        .collect()
}
