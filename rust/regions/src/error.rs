// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for region reconstruction
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during region reconstruction.
///
/// Ordinary messy input recovers locally (dropped elements are warned and
/// counted); these variants are reserved for inputs the engine cannot
/// resolve and for structural invariant violations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Lattice reconstruction did not converge after {iterations} iterations ({unresolved} unresolved anchors)")]
    LatticeDidNotConverge { iterations: usize, unresolved: usize },

    #[error("Face tracing did not converge: {0}")]
    TraversalDidNotConverge(String),

    #[error("No shell face found among {faces} traced faces")]
    NoShellFound { faces: usize },

    #[error("Containment chaining exceeded {max_depth} nesting levels")]
    ContainmentTooDeep { max_depth: usize },

    #[error("Tessellation did not converge after {iterations} iterations")]
    TessellationDidNotConverge { iterations: usize },

    #[error("Region loop is not simple: {0}")]
    NotSimple(String),

    #[error("Kernel error: {0}")]
    Kernel(#[from] roomplan_geometry::Error),
}
