// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Roomplan Regions
//!
//! Region reconstruction from noisy 2D wall centerlines.
//!
//! The pipeline clusters segments by fuzzy intersection, aligns each
//! cluster onto a two-axis lattice, reconstructs concrete wall runs by
//! mutual ray-matching, traces closed faces with a half-edge traversal,
//! folds nested shells into hole loops of their enclosing regions, and
//! decomposes multiply-connected regions into rectangles.
//!
//! [`pipeline::reconstruct_level`] runs the whole chain; the stage
//! modules are public for callers that need intermediate results.

pub mod align;
pub mod cluster;
pub mod containment;
pub mod error;
pub mod extract;
pub mod lattice;
pub mod pipeline;
pub mod tessellate;
pub mod types;

pub use align::{align, Anchor};
pub use cluster::cluster_by_fuzzy_intersection;
pub use containment::merge_clusters;
pub use error::{Error, Result};
pub use extract::{extract_regions, FaceSet};
pub use lattice::{build_lattice, LatticeOutcome};
pub use pipeline::{edge_label_strings, reconstruct_level, Reconstruction, ReconstructionStats};
pub use tessellate::{rectangle_tiles, tessellate_step};
pub use types::{format_label, EdgeLabel, Region, Tile};
